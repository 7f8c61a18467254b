//! Mock layout engine for tests.
//!
//! Serves scripted cell lists and layer tables, records every call, and
//! writes small placeholder files where the real engine would write renders
//! and conversions, so downstream steps (uploads, path checks) stay honest.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::{LayerInfo, LayoutEngine, RenderOptions};
use crate::error::{Result, ShuttleError};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CellNames { layout: PathBuf },
    ExtractCell { layout: PathBuf, cell: String, dest: PathBuf },
    LayerTable { layout: PathBuf, style_sheet: Option<PathBuf> },
    Render { layout: PathBuf, dest: PathBuf, width_px: u32, height_px: u32 },
    Convert { source: PathBuf, dest: PathBuf },
    ToGltf { layout: PathBuf, dest: PathBuf, technology: String },
}

/// Scripted engine double.
#[derive(Default)]
pub struct MockEngine {
    cells: Vec<String>,
    layers: Vec<LayerInfo>,
    /// Any call whose layout path contains this marker fails.
    fail_marker: Option<String>,
    calls: Mutex<Vec<EngineCall>>,
    last_render: Mutex<Option<RenderOptions>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(mut self, cells: &[&str]) -> Self {
        self.cells = cells.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_layers(mut self, layers: Vec<LayerInfo>) -> Self {
        self.layers = layers;
        self
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Options passed to the most recent render call.
    pub fn last_render_options(&self) -> Option<RenderOptions> {
        self.last_render.lock().unwrap().clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, path: &Path) -> Result<()> {
        if let Some(marker) = &self.fail_marker {
            if path.display().to_string().contains(marker.as_str()) {
                return Err(ShuttleError::Engine {
                    reason: format!("scripted failure for {}", path.display()),
                });
            }
        }
        Ok(())
    }

    fn write_placeholder(dest: &Path, tag: &str) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, tag.as_bytes())?;
        Ok(())
    }
}

impl LayoutEngine for MockEngine {
    fn cell_names(&self, layout: &Path) -> Result<Vec<String>> {
        self.check_failure(layout)?;
        self.record(EngineCall::CellNames {
            layout: layout.to_path_buf(),
        });
        Ok(self.cells.clone())
    }

    fn extract_cell(&self, layout: &Path, cell: &str, dest: &Path) -> Result<()> {
        self.check_failure(layout)?;
        self.record(EngineCall::ExtractCell {
            layout: layout.to_path_buf(),
            cell: cell.to_string(),
            dest: dest.to_path_buf(),
        });
        Self::write_placeholder(dest, &format!("cell:{cell}"))
    }

    fn layer_table(&self, layout: &Path, style_sheet: Option<&Path>) -> Result<Vec<LayerInfo>> {
        self.check_failure(layout)?;
        self.record(EngineCall::LayerTable {
            layout: layout.to_path_buf(),
            style_sheet: style_sheet.map(|p| p.to_path_buf()),
        });
        Ok(self.layers.clone())
    }

    fn render(&self, layout: &Path, options: &RenderOptions, dest: &Path) -> Result<()> {
        self.check_failure(layout)?;
        self.record(EngineCall::Render {
            layout: layout.to_path_buf(),
            dest: dest.to_path_buf(),
            width_px: options.width_px,
            height_px: options.height_px,
        });
        *self.last_render.lock().unwrap() = Some(options.clone());
        Self::write_placeholder(
            dest,
            &format!("png:{}x{}", options.width_px, options.height_px),
        )
    }

    fn convert(&self, source: &Path, dest: &Path) -> Result<()> {
        self.check_failure(source)?;
        self.record(EngineCall::Convert {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
        });
        let body = std::fs::read(source).unwrap_or_default();
        Self::write_placeholder(dest, &format!("oas:{}", body.len()))
    }

    fn to_gltf(&self, layout: &Path, dest: &Path, technology_id: &str) -> Result<()> {
        self.check_failure(layout)?;
        self.record(EngineCall::ToGltf {
            layout: layout.to_path_buf(),
            dest: dest.to_path_buf(),
            technology: technology_id.to_string(),
        });
        Self::write_placeholder(dest, &format!("gltf:{technology_id}"))
    }
}

//! Local filesystem layout for caches and generated artifacts.
//!
//! All paths are derived from a single workspace root so tests can point the
//! whole pipeline at a scratch directory.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Deterministic on-disk layout:
///
/// - `gds/{shuttle}/{macro}.gds` — download cache (append-only)
/// - `shuttles/{shuttle}/{macro}/render.png` — rendered previews
/// - `gltf/{shuttle}/{macro}.gds.gltf` — mesh conversions
/// - `lyp/{technology}.lyp` — per-technology layer style sheets
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace rooted at the current directory.
    pub fn current() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cached layout file for one project.
    pub fn gds_file(&self, shuttle_id: &str, macro_name: &str) -> PathBuf {
        self.root
            .join("gds")
            .join(shuttle_id)
            .join(format!("{macro_name}.gds"))
    }

    /// Cached raw full-chip artifact, kept separate from the per-project
    /// cache so the derived ROM layout never shadows the raw bytes.
    pub fn full_chip_file(&self, shuttle_id: &str) -> PathBuf {
        self.root.join("gds").join(shuttle_id).join("_chip.gds")
    }

    /// OASIS transcode target, next to the cached GDS.
    pub fn oas_file(&self, shuttle_id: &str, macro_name: &str) -> PathBuf {
        self.gds_file(shuttle_id, macro_name).with_extension("oas")
    }

    /// Rendered preview image for one project.
    pub fn render_file(&self, shuttle_id: &str, macro_name: &str) -> PathBuf {
        self.root
            .join("shuttles")
            .join(shuttle_id)
            .join(macro_name)
            .join("render.png")
    }

    /// Mesh conversion target for one project.
    pub fn gltf_file(&self, shuttle_id: &str, macro_name: &str) -> PathBuf {
        self.root
            .join("gltf")
            .join(shuttle_id)
            .join(format!("{macro_name}.gds.gltf"))
    }

    /// Layer style sheet for a technology.
    pub fn style_sheet(&self, technology_id: &str) -> PathBuf {
        self.root.join("lyp").join(format!("{technology_id}.lyp"))
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

//! Layout asset fetching and caching.
//!
//! Downloads are cached by `(shuttle, macro)` under `gds/` and treated as
//! immutable afterward: a present file short-circuits all network I/O. No
//! checksum verification is performed on cache hits.
//!
//! The ROM sentinel macro is special: its layout is derived from the
//! full-chip artifact by extracting one cell. Raw full-chip bytes and the
//! derived single-cell layout are cached under distinct keys.

use std::path::PathBuf;

use log::info;

use crate::engine::LayoutEngine;
use crate::error::{Result, ShuttleError};
use crate::manifest::{AssetKind, AssetSource, DownloadSpec};
use crate::workspace::{ensure_parent_dir, Workspace};
use crate::ROM_MACRO;

/// Downloads layout assets into the workspace cache.
pub struct Fetcher<'a> {
    source: &'a dyn AssetSource,
    engine: &'a dyn LayoutEngine,
    workspace: &'a Workspace,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        source: &'a dyn AssetSource,
        engine: &'a dyn LayoutEngine,
        workspace: &'a Workspace,
    ) -> Self {
        Self {
            source,
            engine,
            workspace,
        }
    }

    /// Fetch one project's layout, returning its cache path.
    ///
    /// Idempotent: an existing cache file is returned as-is with zero
    /// network requests.
    pub fn fetch(
        &self,
        shuttle_id: &str,
        macro_name: &str,
        spec: &DownloadSpec,
    ) -> Result<PathBuf> {
        let target = self.workspace.gds_file(shuttle_id, macro_name);
        if target.exists() {
            info!(
                "Found existing GDS file at {}, skipping download",
                target.display()
            );
            return Ok(target);
        }
        ensure_parent_dir(&target)?;

        match spec.kind {
            AssetKind::Project => {
                info!("Downloading GDS file from {}", spec.url);
                self.download_to(&spec.url, &target)?;
            }
            AssetKind::FullChip => {
                let raw = self.workspace.full_chip_file(shuttle_id);
                if raw.exists() {
                    info!(
                        "Found existing full-chip file at {}, skipping download",
                        raw.display()
                    );
                } else {
                    info!("Downloading full-chip file from {}", spec.url);
                    self.download_to(&spec.url, &raw)?;
                }
                self.extract_rom(&raw, &target)?;
            }
        }
        Ok(target)
    }

    /// Download into a `.part` sibling and rename into place on success.
    ///
    /// Cache entries are trusted by existence alone, so a failed download
    /// must never leave bytes at the final path.
    fn download_to(&self, url: &str, dest: &std::path::Path) -> Result<()> {
        let mut part = dest.as_os_str().to_os_string();
        part.push(".part");
        let part = PathBuf::from(part);
        match self.source.download(url, &part) {
            Ok(()) => {
                std::fs::rename(&part, dest)?;
                Ok(())
            }
            Err(err) => {
                let _ = std::fs::remove_file(&part);
                Err(err)
            }
        }
    }

    /// Extract the ROM cell from the full-chip layout into `target`.
    ///
    /// The cell is matched by exact name or by a `_{sentinel}` suffix (the
    /// top-level hierarchy prefixes instance names on some shuttles). The
    /// matching cell is expected to be unique; the last match wins otherwise.
    fn extract_rom(&self, raw: &std::path::Path, target: &std::path::Path) -> Result<()> {
        let cells = self.engine.cell_names(raw)?;
        let suffix = format!("_{ROM_MACRO}");
        let cell = cells
            .iter()
            .rev()
            .find(|name| name.as_str() == ROM_MACRO || name.ends_with(&suffix))
            .ok_or_else(|| ShuttleError::RomCellNotFound {
                layout: raw.display().to_string(),
            })?;
        info!("Extracting cell {} from {}", cell, raw.display());
        self.engine.extract_cell(raw, cell, target)
    }
}

//! Error handling for the shuttle asset pipeline.
//!
//! One error type covers the whole crate. Drivers decide which errors are
//! fatal for the run (manifest problems) and which only fail the current
//! project (missing ROM cell, missing boundary layer, upload failures).

use thiserror::Error;

/// Result type alias for shuttle asset operations
pub type Result<T> = std::result::Result<T, ShuttleError>;

/// Main error type for the shuttle asset pipeline
#[derive(Error, Debug)]
pub enum ShuttleError {
    /// The requested shuttle id does not exist in the global index.
    #[error("Shuttle '{shuttle_id}' not found in the index")]
    ManifestNotFound { shuttle_id: String },

    /// The full-chip artifact contains no cell matching the ROM sentinel.
    #[error("ROM cell not found in {layout}")]
    RomCellNotFound { layout: String },

    /// No layer in the layout matched the technology's boundary layer name.
    #[error("No bounding box found for '{layer}' layer in {layout}")]
    BoundaryLayerMissing { layer: String, layout: String },

    /// The layout-engine bridge reported a failure or returned garbage.
    #[error("Layout engine error: {reason}")]
    Engine { reason: String },

    /// An object-storage upload failed.
    #[error("Upload of '{key}' failed: {reason}")]
    Upload { key: String, reason: String },

    /// Bad or incomplete storage configuration.
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShuttleError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ShuttleError::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
            ShuttleError::RomCellNotFound { .. } => "ROM_CELL_NOT_FOUND",
            ShuttleError::BoundaryLayerMissing { .. } => "BOUNDARY_LAYER_MISSING",
            ShuttleError::Engine { .. } => "ENGINE_ERROR",
            ShuttleError::Upload { .. } => "UPLOAD_ERROR",
            ShuttleError::Config { .. } => "CONFIG_ERROR",
            ShuttleError::Http(_) => "HTTP_ERROR",
            ShuttleError::Io(_) => "IO_ERROR",
            ShuttleError::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether this error should terminate the whole run instead of only
    /// failing the current project.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, ShuttleError::ManifestNotFound { .. })
    }
}

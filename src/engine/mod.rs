//! Layout engine adapter.
//!
//! Geometry parsing, rasterization, mesh extrusion, and format transcoding
//! are owned by an external layout engine; this crate only decides what to
//! ask of it. [`LayoutEngine`] is the seam: the production implementation
//! talks to a local engine sidecar ([`bridge::BridgeEngine`]), tests use
//! [`mock::MockEngine`].

pub mod bridge;
pub mod mock;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use bridge::BridgeEngine;

/// Axis-aligned bounding box in layout database units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// One entry of a layout view's layer table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Display name from the loaded style sheet; may be empty.
    pub name: String,
    pub source_layer: u32,
    pub source_datatype: u32,
    /// Bounding box of the layer's geometry across the fully expanded
    /// hierarchy.
    pub bbox: BBox,
}

/// Everything the engine needs to rasterize one preview image.
///
/// The engine loads the layout at maximal hierarchy depth; visibility is
/// given explicitly as indices into the layer table returned by
/// [`LayoutEngine::layer_table`] for the same layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Layer style sheet to load before rendering, if any.
    pub style_sheet: Option<String>,
    /// Background color, e.g. `#ffffff`.
    pub background: String,
    pub grid_visible: bool,
    pub text_visible: bool,
    /// Indices of the layers to show; all others are hidden.
    pub visible_layers: Vec<usize>,
    /// Crop rectangle, in database units.
    pub viewport: BBox,
    /// Output raster size in pixels.
    pub width_px: u32,
    pub height_px: u32,
}

/// External layout-engine capability.
pub trait LayoutEngine {
    /// Names of all cells in the layout.
    fn cell_names(&self, layout: &Path) -> Result<Vec<String>>;

    /// Re-save `layout` to `dest` keeping only `cell` and its transitive
    /// children.
    fn extract_cell(&self, layout: &Path, cell: &str, dest: &Path) -> Result<()>;

    /// Layer table of the layout as seen through the technology's style
    /// sheet, hierarchy fully expanded.
    fn layer_table(&self, layout: &Path, style_sheet: Option<&Path>) -> Result<Vec<LayerInfo>>;

    /// Rasterize the layout to a PNG at `dest`.
    fn render(&self, layout: &Path, options: &RenderOptions, dest: &Path) -> Result<()>;

    /// Transcode between layout formats; the target format follows from the
    /// `dest` extension.
    fn convert(&self, source: &Path, dest: &Path) -> Result<()>;

    /// Convert the layout to a glTF scene using the technology's layer stack.
    fn to_gltf(&self, layout: &Path, dest: &Path, technology_id: &str) -> Result<()>;
}

//! Preview rendering logic.
//!
//! The engine rasterizes; this module decides what it rasterizes: which
//! layers are visible, what rectangle is cropped, and how many pixels the
//! output gets. The technology's boundary layer supplies the crop rectangle
//! and is always shown, layers in the technology's hidden set are
//! suppressed, and fill-pattern layers (no derived name) are suppressed.

use std::path::{Path, PathBuf};

use log::debug;

use crate::engine::{LayoutEngine, RenderOptions};
use crate::error::{Result, ShuttleError};
use crate::tech::TechnologyProfile;
use crate::workspace::ensure_parent_dir;

/// Default zoom multiplier for preview renders.
pub const DEFAULT_SCALE: f64 = 5.0;

const BACKGROUND: &str = "#ffffff";

/// A produced preview image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

/// Render one project's layout to a cropped, zoomed PNG at `dest`.
///
/// Output dimensions are the boundary bbox scaled by `scale` and rounded.
/// Fails with `BoundaryLayerMissing` when no layer derives to the
/// technology's boundary layer name.
pub fn render_project(
    engine: &dyn LayoutEngine,
    layout: &Path,
    tech: &TechnologyProfile,
    style_sheet: Option<&Path>,
    scale: f64,
    dest: &Path,
) -> Result<RenderedImage> {
    let layers = engine.layer_table(layout, style_sheet)?;

    let mut boundary_bbox = None;
    let mut visible_layers = Vec::new();
    for (index, layer) in layers.iter().enumerate() {
        let derived = tech.normalize_layer_name(&layer.name);
        // Unnamed layers are matched by their source layer/datatype pair.
        let name = if derived.is_empty() {
            format!("{}/{}", layer.source_layer, layer.source_datatype)
        } else {
            derived.clone()
        };

        if name == tech.boundary_layer {
            boundary_bbox = Some(layer.bbox);
            visible_layers.push(index);
        } else if !derived.is_empty() && !tech.hidden_layers.contains(&name.as_str()) {
            visible_layers.push(index);
        } else {
            debug!("Hiding layer '{}'", name);
        }
    }

    let bbox = boundary_bbox.ok_or_else(|| ShuttleError::BoundaryLayerMissing {
        layer: tech.boundary_layer.to_string(),
        layout: layout.display().to_string(),
    })?;

    let width_px = (bbox.width() * scale).round() as u32;
    let height_px = (bbox.height() * scale).round() as u32;

    ensure_parent_dir(dest)?;
    let options = RenderOptions {
        style_sheet: style_sheet.map(|p| p.display().to_string()),
        background: BACKGROUND.to_string(),
        grid_visible: false,
        text_visible: false,
        visible_layers,
        viewport: bbox,
        width_px,
        height_px,
    };
    engine.render(layout, &options, dest)?;

    Ok(RenderedImage {
        path: dest.to_path_buf(),
        width_px,
        height_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use crate::engine::{BBox, LayerInfo};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn layer(name: &str, source_layer: u32, source_datatype: u32, bbox: BBox) -> LayerInfo {
        LayerInfo {
            name: name.to_string(),
            source_layer,
            source_datatype,
            bbox,
        }
    }

    fn unit_bbox() -> BBox {
        BBox::new(0.0, 0.0, 10.0, 10.0)
    }

    fn sky130() -> &'static TechnologyProfile {
        TechnologyProfile::by_id("sky130A").unwrap()
    }

    fn sg13g2() -> &'static TechnologyProfile {
        TechnologyProfile::by_id("sg13g2").unwrap()
    }

    #[test]
    fn dimensions_are_bbox_times_scale_rounded() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new().with_layers(vec![layer(
            "prBoundary.boundary - 235/4",
            235,
            4,
            BBox::new(0.0, 0.0, 160.5, 99.9),
        )]);
        let dest = dir.path().join("render.png");

        let image = render_project(
            &engine,
            Path::new("gds/tt03/tt_um_example.gds"),
            sky130(),
            None,
            5.0,
            &dest,
        )
        .unwrap();

        assert_eq!(image.width_px, 803); // round(160.5 * 5.0)
        assert_eq!(image.height_px, 500); // round(99.9 * 5.0)
        assert!(dest.exists());
    }

    #[test]
    fn missing_boundary_layer_fails() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new().with_layers(vec![layer(
            "met1.drawing - 68/20",
            68,
            20,
            unit_bbox(),
        )]);

        let err = render_project(
            &engine,
            Path::new("gds/tt03/tt_um_example.gds"),
            sky130(),
            None,
            5.0,
            &dir.path().join("render.png"),
        )
        .unwrap_err();
        assert!(matches!(err, ShuttleError::BoundaryLayerMissing { .. }));
    }

    #[test]
    fn hidden_and_fill_layers_are_suppressed() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new().with_layers(vec![
            layer("prBoundary.boundary - 235/4", 235, 4, unit_bbox()),
            layer("met1.drawing - 68/20", 68, 20, unit_bbox()),
            layer("areaid.standardc - 81/4", 81, 4, unit_bbox()),
            layer("", 36, 28, unit_bbox()), // fill pattern, no name
        ]);

        render_project(
            &engine,
            Path::new("gds/tt03/tt_um_example.gds"),
            sky130(),
            None,
            1.0,
            &dir.path().join("render.png"),
        )
        .unwrap();

        let options = engine.last_render_options().unwrap();
        assert_eq!(options.visible_layers, vec![0, 1]);
        assert_eq!(options.background, "#ffffff");
        assert!(!options.grid_visible);
        assert!(!options.text_visible);
    }

    #[test]
    fn sg13g2_boundary_is_matched_by_source_pair_and_stays_visible() {
        let dir = TempDir::new().unwrap();
        // The sg13g2 boundary layer is unnamed and sits in the technology's
        // own hidden set; it must still be shown and supply the viewport.
        let engine = MockEngine::new().with_layers(vec![
            layer("", 235, 4, BBox::new(0.0, 0.0, 40.0, 20.0)),
            layer("Metal1", 8, 0, unit_bbox()),
        ]);

        let image = render_project(
            &engine,
            Path::new("gds/ttihp0/tt_um_example.gds"),
            sg13g2(),
            None,
            2.0,
            &dir.path().join("render.png"),
        )
        .unwrap();

        assert_eq!(image.width_px, 80);
        assert_eq!(image.height_px, 40);
        let options = engine.last_render_options().unwrap();
        assert_eq!(options.visible_layers, vec![0, 1]);
        assert_eq!(options.viewport, BBox::new(0.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn style_sheet_is_passed_through_to_the_engine() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new().with_layers(vec![layer(
            "prBoundary.boundary - 235/4",
            235,
            4,
            unit_bbox(),
        )]);

        render_project(
            &engine,
            Path::new("gds/tt03/tt_um_example.gds"),
            sky130(),
            Some(Path::new("lyp/sky130A.lyp")),
            1.0,
            &dir.path().join("render.png"),
        )
        .unwrap();

        let options = engine.last_render_options().unwrap();
        assert_eq!(options.style_sheet.as_deref(), Some("lyp/sky130A.lyp"));
    }
}

//! End-to-end pipeline tests.
//!
//! The network, layout engine, and object store are all replaced by fakes at
//! their trait seams, so these tests exercise the full driver flows: manifest
//! resolution, caching, ROM extraction, render geometry, and publishing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use shuttle_assets::engine::mock::MockEngine;
use shuttle_assets::engine::{BBox, LayerInfo};
use shuttle_assets::manifest::{AssetSource, ProjectManifest, ShuttleIndex};
use shuttle_assets::pipeline::{self, PipelineContext};
use shuttle_assets::publish::{MemoryStore, ObjectStore};
use shuttle_assets::workspace::Workspace;
use shuttle_assets::{Result, ShuttleError, ROM_MACRO};

/// Asset source backed by in-memory JSON documents, counting downloads.
struct FakeSource {
    index: ShuttleIndex,
    projects: HashMap<String, ProjectManifest>,
    downloads: AtomicUsize,
}

impl FakeSource {
    fn new(index_json: &str, project_lists: &[(&str, &str)]) -> Self {
        let index = serde_json::from_str(index_json).unwrap();
        let projects = project_lists
            .iter()
            .map(|(id, json)| (id.to_string(), serde_json::from_str(json).unwrap()))
            .collect();
        Self {
            index,
            projects,
            downloads: AtomicUsize::new(0),
        }
    }

    fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl AssetSource for FakeSource {
    fn fetch_index(&self) -> Result<ShuttleIndex> {
        Ok(self.index.clone())
    }

    fn fetch_projects(&self, shuttle_id: &str) -> Result<ProjectManifest> {
        Ok(self
            .projects
            .get(shuttle_id)
            .unwrap_or_else(|| panic!("project list fetched for unexpected shuttle {shuttle_id}"))
            .clone())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, format!("layout-from:{url}"))?;
        Ok(())
    }
}

fn tt03_source() -> FakeSource {
    FakeSource::new(
        r#"{"shuttles": [
            {"id": "tt03",
             "project_gds_url_template": "https://example.com/tt03/{macro}/gds.gds",
             "gds_url": "https://example.com/tt03/chip.gds.gz"},
            {"id": "ttihp0",
             "project_gds_url_template": "https://example.com/ttihp0/{macro}/gds.gds",
             "gds_url": "https://example.com/ttihp0/chip.gds.gz"}
        ]}"#,
        &[
            ("tt03", r#"{"projects": [{"macro": "tt_um_example"}]}"#),
            ("ttihp0", r#"{"projects": [{"macro": "tt_um_example"}]}"#),
        ],
    )
}

fn boundary_layer(width: f64, height: f64) -> LayerInfo {
    LayerInfo {
        name: "prBoundary.boundary - 235/4".into(),
        source_layer: 235,
        source_datatype: 4,
        bbox: BBox::new(0.0, 0.0, width, height),
    }
}

#[test]
fn render_pipeline_caches_fetches_and_sizes_output() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new().with_layers(vec![boundary_layer(100.0, 80.0)]);
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    let report = pipeline::render::run(&ctx, "tt03", 5.0).unwrap();
    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 1);

    // Fetch landed in the cache, render at the canonical output path.
    assert!(workspace.gds_file("tt03", "tt_um_example").exists());
    let png = workspace.render_file("tt03", "tt_um_example");
    assert_eq!(std::fs::read_to_string(&png).unwrap(), "png:500x400");

    // A second run serves the layout from cache: no new downloads.
    assert_eq!(source.download_count(), 1);
    pipeline::render::run(&ctx, "tt03", 5.0).unwrap();
    assert_eq!(source.download_count(), 1);
}

#[test]
fn render_passes_the_technology_style_sheet() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new().with_layers(vec![boundary_layer(10.0, 10.0)]);
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    pipeline::render::run(&ctx, "tt03", 1.0).unwrap();
    let options = engine.last_render_options().unwrap();
    assert_eq!(
        options.style_sheet.as_deref(),
        Some(workspace.style_sheet("sky130A").display().to_string().as_str())
    );
}

#[test]
fn unknown_shuttle_aborts_before_any_download() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    let err = pipeline::render::run(&ctx, "tt99", 5.0).unwrap_err();
    assert!(matches!(err, ShuttleError::ManifestNotFound { .. }));
    assert_eq!(source.download_count(), 0);
}

#[test]
fn upload_pipeline_publishes_gds_and_oas_pairs() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new().with_layers(vec![boundary_layer(10.0, 10.0)]);
    let store = MemoryStore::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: Some(&store as &dyn ObjectStore),
    };

    let report = pipeline::oas::run(&ctx, "ttihp0").unwrap();
    assert!(report.is_success());

    let objects = store.objects();
    let keys: Vec<&str> = objects.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "ttihp0/tt_um_example/tt_um_example.gds",
            "ttihp0/tt_um_example/tt_um_example.oas",
        ]
    );

    // Uploaded bytes match the local files exactly.
    let local_gds = std::fs::read(workspace.gds_file("ttihp0", "tt_um_example")).unwrap();
    let local_oas = std::fs::read(workspace.oas_file("ttihp0", "tt_um_example")).unwrap();
    assert_eq!(
        objects["ttihp0/tt_um_example/tt_um_example.gds"],
        local_gds
    );
    assert_eq!(
        objects["ttihp0/tt_um_example/tt_um_example.oas"],
        local_oas
    );
}

#[test]
fn oas_pipeline_skips_uploads_without_a_store() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    let report = pipeline::oas::run(&ctx, "tt03").unwrap();
    assert!(report.is_success());
    // The local pair still gets produced.
    assert!(workspace.gds_file("tt03", "tt_um_example").exists());
    assert!(workspace.oas_file("tt03", "tt_um_example").exists());
}

#[test]
fn gltf_pipeline_converts_and_uploads_per_technology() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = tt03_source();
    let engine = MockEngine::new();
    let store = MemoryStore::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: Some(&store as &dyn ObjectStore),
    };

    let report = pipeline::gltf::run(&ctx, "ttihp0").unwrap();
    assert!(report.is_success());

    let gltf = workspace.gltf_file("ttihp0", "tt_um_example");
    // The mock records which technology the engine was asked to use.
    assert_eq!(std::fs::read_to_string(&gltf).unwrap(), "gltf:sg13g2");
    assert_eq!(
        store.get("ttihp0/tt_um_example/tt_um_example.gds.gltf").unwrap(),
        std::fs::read(&gltf).unwrap()
    );
}

#[test]
fn one_failing_project_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = FakeSource::new(
        r#"{"shuttles": [
            {"id": "tt03",
             "project_gds_url_template": "https://example.com/tt03/{macro}/gds.gds",
             "gds_url": "https://example.com/tt03/chip.gds.gz"}
        ]}"#,
        &[(
            "tt03",
            r#"{"projects": [{"macro": "tt_um_bad"}, {"macro": "tt_um_good"}]}"#,
        )],
    );
    let engine = MockEngine::new().failing_on("tt_um_bad");
    let store = MemoryStore::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: Some(&store as &dyn ObjectStore),
    };

    let report = pipeline::gltf::run(&ctx, "tt03").unwrap();

    assert!(!report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].macro_name, "tt_um_bad");

    // The good project still made it all the way to storage.
    assert!(store.get("tt03/tt_um_good/tt_um_good.gds.gltf").is_some());
    assert!(store.get("tt03/tt_um_bad/tt_um_bad.gds.gltf").is_none());
}

#[test]
fn rom_macro_flows_through_full_chip_extraction() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = FakeSource::new(
        r#"{"shuttles": [
            {"id": "tt03",
             "project_gds_url_template": "https://example.com/tt03/{macro}/gds.gds",
             "gds_url": "https://example.com/tt03/chip.gds.gz"}
        ]}"#,
        &[("tt03", r#"{"projects": [{"macro": "tt_um_chip_rom"}]}"#)],
    );
    let engine = MockEngine::new().with_cells(&["decap_4", "chip_top_tt_um_chip_rom"]);
    let store = MemoryStore::new();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: Some(&store as &dyn ObjectStore),
    };

    let report = pipeline::oas::run(&ctx, "tt03").unwrap();
    assert!(report.is_success());

    // The raw full-chip artifact was downloaded (not the template URL) and
    // the pruned single-cell layout derived from it.
    assert!(workspace.full_chip_file("tt03").exists());
    let pruned = workspace.gds_file("tt03", ROM_MACRO);
    assert_eq!(
        std::fs::read_to_string(&pruned).unwrap(),
        "cell:chip_top_tt_um_chip_rom"
    );
    assert!(store
        .get("tt03/tt_um_chip_rom/tt_um_chip_rom.oas")
        .is_some());
}

#[test]
fn missing_rom_cell_fails_only_that_project() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let source = FakeSource::new(
        r#"{"shuttles": [
            {"id": "tt03",
             "project_gds_url_template": "https://example.com/tt03/{macro}/gds.gds",
             "gds_url": "https://example.com/tt03/chip.gds.gz"}
        ]}"#,
        &[(
            "tt03",
            r#"{"projects": [{"macro": "tt_um_chip_rom"}, {"macro": "tt_um_example"}]}"#,
        )],
    );
    let engine = MockEngine::new().with_cells(&["decap_4", "tt_um_unrelated"]);
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    let report = pipeline::oas::run(&ctx, "tt03").unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].macro_name, "tt_um_chip_rom");
    match &report.failures()[0].result {
        Err(ShuttleError::RomCellNotFound { .. }) => {}
        other => panic!("expected RomCellNotFound, got {other:?}"),
    }
    // The sibling project completed.
    assert!(workspace.oas_file("tt03", "tt_um_example").exists());
}

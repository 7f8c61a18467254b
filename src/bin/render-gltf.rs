//! Convert every project on a shuttle to glTF, optionally uploading the
//! results to object storage.

use clap::Parser;

use shuttle_assets::cli::{self, StorageArgs};
use shuttle_assets::engine::BridgeEngine;
use shuttle_assets::manifest::HttpSource;
use shuttle_assets::pipeline::{self, PipelineContext};
use shuttle_assets::publish::ObjectStore;
use shuttle_assets::workspace::Workspace;
use shuttle_assets::Result;

#[derive(Parser, Debug)]
#[command(name = "render-gltf")]
#[command(version, about = "Convert shuttle GDS files to glTF, optionally uploading to S3")]
struct Cli {
    /// Shuttle ID
    shuttle_id: String,

    #[command(flatten)]
    storage: StorageArgs,
}

fn main() -> Result<()> {
    cli::init_logging();
    let args = Cli::parse();

    let source = HttpSource::new()?;
    let engine = BridgeEngine::new()?;
    let workspace = Workspace::current();
    let store = args.storage.open_store()?;
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: store.as_ref().map(|s| s as &dyn ObjectStore),
    };

    let report = pipeline::gltf::run(&ctx, &args.shuttle_id)?;
    report.log_summary();
    std::process::exit(cli::exit_code(&report));
}

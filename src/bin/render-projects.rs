//! Render preview images for every project on a shuttle.

use clap::Parser;

use shuttle_assets::cli;
use shuttle_assets::engine::BridgeEngine;
use shuttle_assets::manifest::HttpSource;
use shuttle_assets::pipeline::{self, PipelineContext};
use shuttle_assets::render::DEFAULT_SCALE;
use shuttle_assets::workspace::Workspace;
use shuttle_assets::Result;

#[derive(Parser, Debug)]
#[command(name = "render-projects")]
#[command(version, about = "Render preview images for every project on a shuttle")]
struct Cli {
    /// Shuttle ID
    shuttle_id: String,

    /// Scale factor for the output image
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f64,
}

fn main() -> Result<()> {
    cli::init_logging();
    let args = Cli::parse();

    let source = HttpSource::new()?;
    let engine = BridgeEngine::new()?;
    let workspace = Workspace::current();
    let ctx = PipelineContext {
        source: &source,
        engine: &engine,
        workspace: &workspace,
        store: None,
    };

    let report = pipeline::render::run(&ctx, &args.shuttle_id, args.scale)?;
    report.log_summary();
    std::process::exit(cli::exit_code(&report));
}

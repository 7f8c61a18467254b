//! Format pipeline: transcode each project's GDS to OASIS and optionally
//! publish both files.

use log::info;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::pipeline::{run_over_projects, PipelineContext, RunReport};
use crate::publish::publish_file;

/// Transcode every project of `shuttle_id` to OASIS; upload the GDS/OAS pair
/// when the context carries a store.
pub fn run(ctx: &PipelineContext<'_>, shuttle_id: &str) -> Result<RunReport> {
    let fetcher = Fetcher::new(ctx.source, ctx.engine, ctx.workspace);

    run_over_projects(ctx, shuttle_id, |resolver, project| {
        let macro_name = &project.macro_name;

        let spec = resolver.resolve(shuttle_id, macro_name)?;
        let gds_file = fetcher.fetch(shuttle_id, macro_name, &spec)?;

        let oas_file = ctx.workspace.oas_file(shuttle_id, macro_name);
        info!("Converting {} to {}", gds_file.display(), oas_file.display());
        ctx.engine.convert(&gds_file, &oas_file)?;

        if let Some(store) = ctx.store {
            info!("Uploading to object storage...");
            publish_file(store, shuttle_id, macro_name, "gds", &gds_file)?;
            publish_file(store, shuttle_id, macro_name, "oas", &oas_file)?;
        }
        Ok(())
    })
}

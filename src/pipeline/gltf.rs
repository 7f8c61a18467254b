//! Mesh pipeline: convert each project's layout to a glTF scene and
//! optionally publish it.

use log::info;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::pipeline::{run_over_projects, PipelineContext, RunReport};
use crate::publish::publish_file;
use crate::tech::TechnologyProfile;
use crate::workspace::ensure_parent_dir;

/// Convert every project of `shuttle_id` to glTF; upload when the context
/// carries a store.
pub fn run(ctx: &PipelineContext<'_>, shuttle_id: &str) -> Result<RunReport> {
    let tech = TechnologyProfile::for_shuttle(shuttle_id);
    let fetcher = Fetcher::new(ctx.source, ctx.engine, ctx.workspace);

    run_over_projects(ctx, shuttle_id, |resolver, project| {
        let macro_name = &project.macro_name;
        info!("Converting {}", macro_name);

        let spec = resolver.resolve(shuttle_id, macro_name)?;
        let gds_file = fetcher.fetch(shuttle_id, macro_name, &spec)?;

        let gltf_file = ctx.workspace.gltf_file(shuttle_id, macro_name);
        ensure_parent_dir(&gltf_file)?;
        info!("Writing {}", gltf_file.display());
        ctx.engine.to_gltf(&gds_file, &gltf_file, tech.id)?;

        if let Some(store) = ctx.store {
            info!("Uploading to object storage...");
            publish_file(store, shuttle_id, macro_name, "gds.gltf", &gltf_file)?;
        }
        Ok(())
    })
}

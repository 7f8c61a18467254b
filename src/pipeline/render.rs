//! PNG preview pipeline: fetch each project's layout and render a cropped,
//! zoomed preview image under `shuttles/{shuttle}/{macro}/render.png`.

use log::info;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::pipeline::{run_over_projects, PipelineContext, RunReport};
use crate::render::render_project;
use crate::tech::TechnologyProfile;

/// Render every project of `shuttle_id` at the given zoom multiplier.
pub fn run(ctx: &PipelineContext<'_>, shuttle_id: &str, scale: f64) -> Result<RunReport> {
    let tech = TechnologyProfile::for_shuttle(shuttle_id);
    let style_sheet = ctx.workspace.style_sheet(tech.id);
    let fetcher = Fetcher::new(ctx.source, ctx.engine, ctx.workspace);

    run_over_projects(ctx, shuttle_id, |resolver, project| {
        let macro_name = &project.macro_name;
        info!("Rendering {}", macro_name);

        let spec = resolver.resolve(shuttle_id, macro_name)?;
        let gds_file = fetcher.fetch(shuttle_id, macro_name, &spec)?;

        let dest = ctx.workspace.render_file(shuttle_id, macro_name);
        info!("Rendering {}", dest.display());
        let image = render_project(
            ctx.engine,
            &gds_file,
            tech,
            Some(&style_sheet),
            scale,
            &dest,
        )?;
        info!(
            "Wrote {} ({}x{})",
            image.path.display(),
            image.width_px,
            image.height_px
        );
        Ok(())
    })
}

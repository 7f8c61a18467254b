//! Batch pipeline drivers.
//!
//! Three flows share the same shape: fetch the shuttle's project list, walk
//! it sequentially, and process each project through the engine. A project
//! failure is logged and recorded but does not stop the batch; the run's
//! exit status reflects the aggregated outcome. Only manifest-level failures
//! abort before iteration.

pub mod gltf;
pub mod oas;
pub mod render;

use log::{error, info};

use crate::engine::LayoutEngine;
use crate::error::Result;
use crate::manifest::{AssetSource, Project, Resolver};
use crate::publish::ObjectStore;
use crate::workspace::Workspace;

/// Shared collaborators for one pipeline run, built once at startup.
pub struct PipelineContext<'a> {
    pub source: &'a dyn AssetSource,
    pub engine: &'a dyn LayoutEngine,
    pub workspace: &'a Workspace,
    /// Upload destination; `None` disables the publish step.
    pub store: Option<&'a dyn ObjectStore>,
}

/// Result of processing one project.
#[derive(Debug)]
pub struct ProjectOutcome {
    pub macro_name: String,
    pub result: Result<()>,
}

/// Aggregated per-project outcomes for one run.
#[derive(Debug)]
pub struct RunReport {
    pub shuttle_id: String,
    pub outcomes: Vec<ProjectOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> Vec<&ProjectOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .collect()
    }

    /// Log a one-line-per-failure summary of the run.
    pub fn log_summary(&self) {
        let failures = self.failures();
        info!(
            "Shuttle {}: {}/{} projects succeeded",
            self.shuttle_id,
            self.outcomes.len() - failures.len(),
            self.outcomes.len()
        );
        for outcome in failures {
            if let Err(err) = &outcome.result {
                error!("{}: [{}] {}", outcome.macro_name, err.error_code(), err);
            }
        }
    }
}

/// Fetch the index and project list for `shuttle_id`, then run `process` for
/// each project, isolating per-project failures.
///
/// Index fetch, unknown shuttle ids, and project-list fetch errors are fatal
/// and returned as `Err`; everything raised inside `process` is captured in
/// the report.
pub(crate) fn run_over_projects<F>(
    ctx: &PipelineContext<'_>,
    shuttle_id: &str,
    mut process: F,
) -> Result<RunReport>
where
    F: FnMut(&Resolver, &Project) -> Result<()>,
{
    let resolver = Resolver::from_source(ctx.source)?;
    // Unknown shuttle ids terminate the run before any per-project work.
    resolver.require_shuttle(shuttle_id)?;

    let manifest = ctx.source.fetch_projects(shuttle_id)?;
    info!(
        "Found {} projects in shuttle {}",
        manifest.projects.len(),
        shuttle_id
    );

    let mut outcomes = Vec::with_capacity(manifest.projects.len());
    for project in &manifest.projects {
        let result = process(&resolver, project);
        if let Err(err) = &result {
            error!(
                "Project {} failed: [{}] {}",
                project.macro_name,
                err.error_code(),
                err
            );
        }
        outcomes.push(ProjectOutcome {
            macro_name: project.macro_name.clone(),
            result,
        });
    }

    Ok(RunReport {
        shuttle_id: shuttle_id.to_string(),
        outcomes,
    })
}

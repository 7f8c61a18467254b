//! Shuttle asset pipeline.
//!
//! Batch tooling for a hardware shuttle program: download per-project layout
//! files (GDS/OASIS), render preview images, convert layouts to glTF meshes,
//! transcode GDS to OASIS, and optionally publish the results to S3-compatible
//! object storage.
//!
//! # Architecture
//!
//! All substantive geometry work (parsing, rasterization, tessellation) is
//! delegated to an external layout engine behind the [`engine::LayoutEngine`]
//! trait; this crate is orchestration:
//!
//! - [`manifest`] resolves a shuttle's project list to download URLs
//! - [`fetch`] downloads and caches layout files
//! - [`render`] decides layer visibility and raster geometry for previews
//! - [`publish`] uploads artifacts under a deterministic key scheme
//! - [`pipeline`] drives the three batch flows (PNG, glTF, OASIS)

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod tech;
pub mod workspace;

pub use error::{Result, ShuttleError};

/// The one macro name that is not an independently submitted project: it is
/// extracted from the full-chip artifact instead of fetched per-project.
pub const ROM_MACRO: &str = "tt_um_chip_rom";

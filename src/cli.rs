//! Shared CLI plumbing for the three pipeline binaries.

use std::path::Path;

use clap::Args;
use env_logger::Env;

use crate::config::{Settings, StorageConfig};
use crate::error::Result;
use crate::pipeline::RunReport;
use crate::publish::S3Store;

/// Local settings file read next to the working directory, same keys as the
/// environment variables.
pub const SETTINGS_FILE: &str = "settings.json";

/// Storage-related flags shared by the uploading binaries.
///
/// Credentials are never accepted on the command line; they come from the
/// environment (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`) or the
/// settings file.
#[derive(Args, Debug)]
pub struct StorageArgs {
    /// Upload generated artifacts to S3/R2
    #[arg(short = 'u', long = "upload")]
    pub upload: bool,

    /// S3 endpoint
    #[arg(long = "s3-endpoint")]
    pub s3_endpoint: Option<String>,

    /// S3 bucket
    #[arg(long = "s3-bucket")]
    pub s3_bucket: Option<String>,
}

impl StorageArgs {
    /// Open the configured bucket when uploads are enabled.
    pub fn open_store(&self) -> Result<Option<S3Store>> {
        if !self.upload {
            return Ok(None);
        }
        let settings = Settings::load(Path::new(SETTINGS_FILE))?;
        let config = StorageConfig::resolve(
            self.s3_endpoint.clone(),
            self.s3_bucket.clone(),
            &settings,
        );
        Ok(Some(S3Store::open(&config)?))
    }
}

/// Initialize logging for a binary; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Process exit code for a finished run: non-zero when any project failed.
pub fn exit_code(report: &RunReport) -> i32 {
    if report.is_success() {
        0
    } else {
        1
    }
}

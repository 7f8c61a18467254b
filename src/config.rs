//! Storage configuration.
//!
//! Populated once at startup and threaded through the pipeline explicitly;
//! nothing in the crate re-reads the environment after this point.
//!
//! Precedence per field: CLI flag, then process environment, then the
//! optional local `settings.json`, then the built-in default. Credentials
//! come from the environment or the settings file only, never from flags.

use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ShuttleError};

pub const DEFAULT_ENDPOINT: &str = "s3.amazonaws.com";
pub const DEFAULT_BUCKET: &str = "tt-shuttle-assets";

/// Optional local settings file, JSON with the same keys as the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub s3_endpoint_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
}

impl Settings {
    /// Load `settings.json` from `path` if it exists; absent file is not an
    /// error, malformed JSON is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Resolved object-storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Resolve the configuration from CLI overrides, the environment, and
    /// `settings`.
    pub fn resolve(
        endpoint_flag: Option<String>,
        bucket_flag: Option<String>,
        settings: &Settings,
    ) -> Self {
        let endpoint = endpoint_flag
            .or_else(|| env::var("S3_ENDPOINT_URL").ok())
            .or_else(|| settings.s3_endpoint_url.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let bucket = bucket_flag
            .or_else(|| env::var("S3_BUCKET").ok())
            .or_else(|| settings.s3_bucket.clone())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let access_key_id = env::var("AWS_ACCESS_KEY_ID")
            .ok()
            .or_else(|| settings.aws_access_key_id.clone());
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .or_else(|| settings.aws_secret_access_key.clone());

        Self {
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
        }
    }

    /// Credentials as a pair, or a `Config` error when uploads were requested
    /// without any credential source.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(ShuttleError::Config {
                reason: "AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY not set".into(),
            }),
        }
    }
}

//! Artifact publishing to object storage.
//!
//! Artifacts land under the deterministic key scheme
//! `{shuttle_id}/{macro}/{macro}.{ext}`. Uploads are not retried and not
//! verified after the fact; a failed upload fails the current project.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use log::info;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::config::StorageConfig;
use crate::error::{Result, ShuttleError};

/// Minimal object-storage surface used by the pipelines.
pub trait ObjectStore {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<()>;
}

/// Storage key for one published artifact.
pub fn artifact_key(shuttle_id: &str, macro_name: &str, ext: &str) -> String {
    format!("{shuttle_id}/{macro_name}/{macro_name}.{ext}")
}

/// Read a local artifact and upload it under the canonical key.
pub fn publish_file(
    store: &dyn ObjectStore,
    shuttle_id: &str,
    macro_name: &str,
    ext: &str,
    local: &Path,
) -> Result<String> {
    let key = artifact_key(shuttle_id, macro_name, ext);
    let body = std::fs::read(local)?;
    info!("Uploading {} ({} bytes)", key, body.len());
    store.put_object(&key, &body)?;
    Ok(key)
}

/// S3-compatible store over the configured bucket.
pub struct S3Store {
    bucket: Bucket,
}

impl S3Store {
    /// Open the configured bucket. Fails when credentials are absent.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let (access_key, secret_key) = config.credentials()?;
        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None).map_err(
                |e| ShuttleError::Config {
                    reason: format!("bad credentials: {e}"),
                },
            )?;
        let endpoint = if config.endpoint.contains("://") {
            config.endpoint.clone()
        } else {
            format!("https://{}", config.endpoint)
        };
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint,
        };
        let bucket = Bucket::new(&config.bucket, region, credentials).map_err(|e| {
            ShuttleError::Config {
                reason: format!("cannot open bucket '{}': {e}", config.bucket),
            }
        })?;
        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<()> {
        let response = self
            .bucket
            .put_object(key, body)
            .map_err(|e| ShuttleError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(ShuttleError::Upload {
                key: key.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> BTreeMap<String, Vec<u8>> {
        self.objects.lock().unwrap().clone()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }
}

//! Shuttle index and project manifests.
//!
//! The global index maps shuttle ids to download URL templates; each shuttle
//! additionally has a live project list. Both are fetched per run and never
//! persisted. [`AssetSource`] is the network seam so resolution logic stays
//! testable without a server.

use std::io;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::error::{Result, ShuttleError};
use crate::workspace::ensure_parent_dir;
use crate::ROM_MACRO;

/// Base URL of the shuttle index service.
pub const INDEX_BASE_URL: &str = "https://index.tinytapeout.com";

/// The index service rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0";

const HTTP_TIMEOUT_SECS: u64 = 120;

/// Global shuttle index, `GET {base}/index.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShuttleIndex {
    #[serde(default)]
    pub shuttles: Vec<ShuttleEntry>,
}

/// One shuttle's metadata in the global index.
#[derive(Debug, Clone, Deserialize)]
pub struct ShuttleEntry {
    pub id: String,
    /// Per-project download URL with a `{macro}` placeholder.
    pub project_gds_url_template: String,
    /// Full-chip artifact URL, used only for the ROM sentinel macro.
    pub gds_url: String,
}

/// Per-shuttle project list, `GET {base}/{shuttle_id}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// One project record.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(rename = "macro")]
    pub macro_name: String,
}

/// How a resolved URL relates to the requested macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The URL points directly at the project's own layout.
    Project,
    /// The URL points at the full-chip artifact; the macro's cell must be
    /// extracted from it.
    FullChip,
}

/// Resolved download location for one `(shuttle, macro)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub url: String,
    pub kind: AssetKind,
}

/// Network access to the index service and layout artifacts.
pub trait AssetSource {
    fn fetch_index(&self) -> Result<ShuttleIndex>;
    fn fetch_projects(&self, shuttle_id: &str) -> Result<ProjectManifest>;
    /// Download `url` to `dest`, transparently gunzipping `.gz` payloads.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Production [`AssetSource`] over HTTP.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(INDEX_BASE_URL.to_string())
    }

    /// Point the source at a different index service, e.g. a staging mirror.
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { base_url, client })
    }
}

impl AssetSource for HttpSource {
    fn fetch_index(&self) -> Result<ShuttleIndex> {
        let url = format!("{}/index.json", self.base_url);
        let index = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json::<ShuttleIndex>()?;
        Ok(index)
    }

    fn fetch_projects(&self, shuttle_id: &str) -> Result<ProjectManifest> {
        let url = format!("{}/{}.json", self.base_url, shuttle_id);
        let manifest = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json::<ProjectManifest>()?;
        Ok(manifest)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        ensure_parent_dir(dest)?;
        let response = self.client.get(url).send()?.error_for_status()?;
        write_body(response, dest, url.ends_with(".gz"))
    }
}

/// Stream a response body to `dest`, gunzipping when `gzipped`.
fn write_body<R: io::Read>(mut body: R, dest: &Path, gzipped: bool) -> Result<()> {
    let mut file = std::fs::File::create(dest)?;
    if gzipped {
        let mut decoder = GzDecoder::new(body);
        io::copy(&mut decoder, &mut file)?;
    } else {
        io::copy(&mut body, &mut file)?;
    }
    Ok(())
}

/// Resolves `(shuttle_id, macro)` pairs against a fetched [`ShuttleIndex`].
pub struct Resolver {
    index: ShuttleIndex,
}

impl Resolver {
    pub fn new(index: ShuttleIndex) -> Self {
        Self { index }
    }

    /// Fetch the global index once and build a resolver over it.
    pub fn from_source(source: &dyn AssetSource) -> Result<Self> {
        Ok(Self::new(source.fetch_index()?))
    }

    /// Look up a shuttle's index entry, failing with `ManifestNotFound` for
    /// unknown ids.
    pub fn require_shuttle(&self, shuttle_id: &str) -> Result<&ShuttleEntry> {
        self.index
            .shuttles
            .iter()
            .find(|s| s.id == shuttle_id)
            .ok_or_else(|| ShuttleError::ManifestNotFound {
                shuttle_id: shuttle_id.to_string(),
            })
    }

    /// Resolve a macro to its download location.
    ///
    /// The ROM sentinel macro always resolves to the shuttle's full-chip
    /// URL; every other macro is substituted into the per-project template.
    pub fn resolve(&self, shuttle_id: &str, macro_name: &str) -> Result<DownloadSpec> {
        let shuttle = self.require_shuttle(shuttle_id)?;

        if macro_name == ROM_MACRO {
            return Ok(DownloadSpec {
                url: shuttle.gds_url.clone(),
                kind: AssetKind::FullChip,
            });
        }
        Ok(DownloadSpec {
            url: shuttle
                .project_gds_url_template
                .replace("{macro}", macro_name),
            kind: AssetKind::Project,
        })
    }
}

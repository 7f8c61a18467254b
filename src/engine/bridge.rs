//! Layout-engine bridge client.
//!
//! The engine runs as a local sidecar process and accepts one JSON request
//! per operation over HTTP. Paths are exchanged as strings; the sidecar and
//! this process share a filesystem.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{LayerInfo, LayoutEngine, RenderOptions};
use crate::error::{Result, ShuttleError};

const DEFAULT_BRIDGE_URL: &str = "http://localhost:8465";
const DEFAULT_TIMEOUT_MS: u64 = 300_000; // renders of full chips are slow

#[derive(Debug, Serialize)]
struct LayoutRequest<'a> {
    layout: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_sheet: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    layout: &'a str,
    cell: &'a str,
    dest: &'a str,
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    layout: &'a str,
    dest: &'a str,
    #[serde(flatten)]
    options: &'a RenderOptions,
}

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    source: &'a str,
    dest: &'a str,
}

#[derive(Debug, Serialize)]
struct GltfRequest<'a> {
    layout: &'a str,
    dest: &'a str,
    technology: &'a str,
}

/// Response envelope shared by all bridge endpoints.
#[derive(Debug, Deserialize)]
struct BridgeResponse<T> {
    success: bool,
    error_message: Option<String>,
    #[serde(flatten)]
    payload: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CellsPayload {
    cells: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LayersPayload {
    layers: Vec<LayerInfo>,
}

#[derive(Debug, Deserialize)]
struct EmptyPayload {}

/// HTTP client for the layout-engine sidecar.
pub struct BridgeEngine {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BridgeEngine {
    /// Create a client configured from the environment
    /// (`LAYOUT_BRIDGE_URL`, `LAYOUT_BRIDGE_TIMEOUT_MS`).
    pub fn new() -> Result<Self> {
        let base_url =
            env::var("LAYOUT_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.into());
        let timeout_ms = env::var("LAYOUT_BRIDGE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Self::with_config(base_url, timeout_ms)
    }

    /// Create a client with an explicit bridge URL and timeout.
    pub fn with_config(base_url: String, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { base_url, client })
    }

    fn call<Req: Serialize, Payload: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        request: &Req,
    ) -> Result<Payload> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let response: BridgeResponse<Payload> =
            self.client.post(&url).json(request).send()?.json()?;
        if !response.success {
            return Err(ShuttleError::Engine {
                reason: response
                    .error_message
                    .unwrap_or_else(|| format!("bridge call '{endpoint}' failed")),
            });
        }
        response.payload.ok_or_else(|| ShuttleError::Engine {
            reason: format!("bridge call '{endpoint}' returned no payload"),
        })
    }

    fn path_str(path: &Path) -> String {
        path.display().to_string()
    }
}

impl LayoutEngine for BridgeEngine {
    fn cell_names(&self, layout: &Path) -> Result<Vec<String>> {
        let payload: CellsPayload = self.call(
            "layout/cells",
            &LayoutRequest {
                layout: &Self::path_str(layout),
                style_sheet: None,
            },
        )?;
        Ok(payload.cells)
    }

    fn extract_cell(&self, layout: &Path, cell: &str, dest: &Path) -> Result<()> {
        let _: EmptyPayload = self.call(
            "layout/extract",
            &ExtractRequest {
                layout: &Self::path_str(layout),
                cell,
                dest: &Self::path_str(dest),
            },
        )?;
        Ok(())
    }

    fn layer_table(&self, layout: &Path, style_sheet: Option<&Path>) -> Result<Vec<LayerInfo>> {
        let style = style_sheet.map(Self::path_str);
        let payload: LayersPayload = self.call(
            "layout/layers",
            &LayoutRequest {
                layout: &Self::path_str(layout),
                style_sheet: style.as_deref(),
            },
        )?;
        Ok(payload.layers)
    }

    fn render(&self, layout: &Path, options: &RenderOptions, dest: &Path) -> Result<()> {
        let _: EmptyPayload = self.call(
            "layout/render",
            &RenderRequest {
                layout: &Self::path_str(layout),
                dest: &Self::path_str(dest),
                options,
            },
        )?;
        Ok(())
    }

    fn convert(&self, source: &Path, dest: &Path) -> Result<()> {
        let _: EmptyPayload = self.call(
            "layout/convert",
            &ConvertRequest {
                source: &Self::path_str(source),
                dest: &Self::path_str(dest),
            },
        )?;
        Ok(())
    }

    fn to_gltf(&self, layout: &Path, dest: &Path, technology_id: &str) -> Result<()> {
        let _: EmptyPayload = self.call(
            "layout/gltf",
            &GltfRequest {
                layout: &Self::path_str(layout),
                dest: &Self::path_str(dest),
                technology: technology_id,
            },
        )?;
        Ok(())
    }
}

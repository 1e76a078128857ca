//! Input acquisition: a URL to fetch or a base64 payload to decode, both
//! normalized to the same byte buffer before parsing.

use crate::error::{ExportError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::time::Duration;

/// Timeout for fetching input bytes over HTTP.
const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Where the scene bytes come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Url(String),
    Base64(String),
}

/// Validate the request's optional fields down to exactly one source.
pub fn resolve(url: Option<&str>, data: Option<&str>) -> Result<InputSource> {
    match (url, data) {
        (Some(url), None) => Ok(InputSource::Url(url.to_string())),
        (None, Some(data)) => Ok(InputSource::Base64(data.to_string())),
        (Some(_), Some(_)) => Err(ExportError::Validation(
            "provide either url or data, not both".to_string(),
        )),
        (None, None) => Err(ExportError::Validation(
            "either url or data is required".to_string(),
        )),
    }
}

/// Normalize the source into raw scene bytes.
pub fn acquire(source: &InputSource) -> Result<Vec<u8>> {
    match source {
        InputSource::Url(url) => fetch_bytes(url),
        InputSource::Base64(data) => decode_base64(data),
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    // Tolerate a data-URL wrapper around the payload.
    let payload = match data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| ExportError::Validation(format!("invalid base64 payload: {e}")))
}

fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    // One single-threaded runtime per fetch; the pipeline itself is
    // synchronous CPU-bound work.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExportError::Fetch(format!("failed to create runtime: {e}")))?;

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ExportError::Fetch(format!("failed to create HTTP client: {e}")))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::Fetch(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ExportError::Fetch(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExportError::Fetch(format!("failed to read response body: {e}")))?;
        tracing::debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    })
}

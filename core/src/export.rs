//! Request-level export entry points.

use crate::config::{ExportConfig, OutputFormat};
use crate::error::{ExportError, Result};
use crate::input::{self, InputSource};
use crate::mesh::Bounds;
use crate::{pipeline, scene, stl};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::path::Path;

/// The service-facing request shape: exactly one of `url` / `data` plus the
/// flattened configuration fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportRequest {
    /// Location to download the GLB from.
    pub url: Option<String>,
    /// Base64-encoded GLB payload (optionally a data URL).
    pub data: Option<String>,
    #[serde(flatten)]
    pub config: ExportConfig,
}

/// A finished export. Callers only ever see this after every stage
/// succeeded; there is no partial output.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub triangle_count: usize,
    pub bounds: Option<Bounds>,
}

impl ExportOutput {
    /// The output as a base64 payload for embedding in a response.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Write the output to a file. The caller owns cleanup policy for the
    /// path on failure.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Resolve and acquire the request's input, then export it.
pub fn export(request: &ExportRequest) -> Result<ExportOutput> {
    let source = input::resolve(request.url.as_deref(), request.data.as_deref())?;
    if let InputSource::Url(url) = &source {
        tracing::info!("fetching scene from {url}");
    }
    let bytes = input::acquire(&source)?;
    export_bytes(&bytes, &request.config)
}

/// Run the full pipeline over in-memory GLB bytes.
pub fn export_bytes(bytes: &[u8], config: &ExportConfig) -> Result<ExportOutput> {
    config.validate()?;
    let parsed = scene::parse_glb(bytes)?;

    // GLB passthrough re-emits the validated input unchanged.
    if config.output_format == OutputFormat::Glb {
        return Ok(ExportOutput {
            bytes: bytes.to_vec(),
            format: OutputFormat::Glb,
            triangle_count: parsed.triangle_count(),
            bounds: None,
        });
    }

    let buffer = pipeline::run(&parsed, config)?;
    let triangle_count = buffer.triangle_count();
    let bounds = buffer.bounds();

    let mut out = Vec::new();
    match config.output_format {
        OutputFormat::StlAscii => stl::write_ascii(&mut out, &config.solid_name, &buffer)?,
        OutputFormat::StlBinary => stl::write_binary(&mut out, &buffer)?,
        OutputFormat::Glb => unreachable!("handled above"),
    }

    tracing::info!(
        "export complete: {} triangles, {} bytes",
        triangle_count,
        out.len()
    );
    Ok(ExportOutput {
        bytes: out,
        format: config.output_format,
        triangle_count,
        bounds,
    })
}

//! Export configuration.
//!
//! Field names deserialize from the camelCase keys used by the hosted
//! service's request payloads.

use crate::error::{ExportError, Result};
use serde::Deserialize;

/// Output encoding for a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Binary STL (80-byte header, little-endian triangle records).
    #[serde(alias = "stl")]
    StlBinary,
    /// ASCII STL (`solid <name>` / `endsolid <name>`).
    StlAscii,
    /// Re-emit the input GLB unchanged after validating it parses.
    Glb,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::StlBinary | OutputFormat::StlAscii => "stl",
            OutputFormat::Glb => "glb",
        }
    }
}

/// Tuning knobs for one export invocation.
///
/// `weld` and `orient` are independent toggles; when enabled the stage
/// order is fixed: weld, orient, foundation, serialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Foundation radius margin as a ratio of the largest bbox dimension.
    pub margin_ratio: f32,
    /// Foundation thickness as a ratio of the largest bbox dimension.
    pub thickness_ratio: f32,
    /// Append a cylindrical foundation under the model.
    pub add_foundation: bool,
    /// Weld coincident vertices and smooth normals before later stages.
    pub weld: bool,
    /// Search candidate rotations for a stable standing pose.
    pub orient: bool,
    /// Weld grid resolution.
    pub weld_tolerance: f32,
    pub output_format: OutputFormat,
    /// Solid name written by the ASCII serializer.
    pub solid_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            margin_ratio: 0.1,
            thickness_ratio: 0.05,
            add_foundation: true,
            weld: false,
            orient: false,
            weld_tolerance: 1e-4,
            output_format: OutputFormat::StlBinary,
            solid_name: "exported".to_string(),
        }
    }
}

impl ExportConfig {
    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if !self.margin_ratio.is_finite() || self.margin_ratio < 0.0 {
            return Err(ExportError::Validation(format!(
                "marginRatio must be a non-negative number, got {}",
                self.margin_ratio
            )));
        }
        if !self.thickness_ratio.is_finite() || self.thickness_ratio < 0.0 {
            return Err(ExportError::Validation(format!(
                "thicknessRatio must be a non-negative number, got {}",
                self.thickness_ratio
            )));
        }
        if self.weld && (!self.weld_tolerance.is_finite() || self.weld_tolerance <= 0.0) {
            return Err(ExportError::Validation(format!(
                "weldTolerance must be a positive number, got {}",
                self.weld_tolerance
            )));
        }
        if self.solid_name.is_empty() || self.solid_name.contains(char::is_whitespace) {
            return Err(ExportError::Validation(format!(
                "solid name must be a single non-empty token, got {:?}",
                self.solid_name
            )));
        }
        Ok(())
    }
}

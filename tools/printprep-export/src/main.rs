//! printprep-export - turns generated GLB scenes into printable STL files
//!
//! Wraps the printprep-core pipeline: fetch or read a GLB, bake transforms,
//! optionally weld and orient, append a foundation cylinder, write STL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use printprep_core::{export_bytes, parse_glb, ExportConfig, OutputFormat};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "printprep-export")]
#[command(about = "GLB to printable STL export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a GLB scene to STL
    Export {
        /// Input GLB file
        input: Option<PathBuf>,

        /// Fetch the input GLB from a URL instead of a file
        #[arg(long, conflicts_with = "input")]
        url: Option<String>,

        /// Output file (default: input name with .stl extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: stl, stl-ascii, or glb
        #[arg(short, long, default_value = "stl")]
        format: String,

        /// Skip the foundation cylinder
        #[arg(long)]
        no_foundation: bool,

        /// Foundation radius margin ratio
        #[arg(long, default_value_t = 0.1)]
        margin_ratio: f32,

        /// Foundation thickness ratio
        #[arg(long, default_value_t = 0.05)]
        thickness_ratio: f32,

        /// Weld coincident vertices and smooth normals
        #[arg(long)]
        weld: bool,

        /// Weld grid tolerance
        #[arg(long, default_value_t = 1e-4)]
        weld_tolerance: f32,

        /// Rotate the model into its most stable standing pose
        #[arg(long)]
        orient: bool,

        /// Solid name for ASCII STL output
        #[arg(long, default_value = "exported")]
        name: String,

        /// Keep a partially written output file when the export fails
        #[arg(long)]
        keep_on_failure: bool,
    },

    /// Print scene statistics without exporting
    Info {
        /// Input GLB file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            url,
            output,
            format,
            no_foundation,
            margin_ratio,
            thickness_ratio,
            weld,
            weld_tolerance,
            orient,
            name,
            keep_on_failure,
        } => {
            let config = ExportConfig {
                margin_ratio,
                thickness_ratio,
                add_foundation: !no_foundation,
                weld,
                orient,
                weld_tolerance,
                output_format: parse_format(&format)?,
                solid_name: name,
            };

            let result = match (&input, &url) {
                (Some(path), None) => {
                    let bytes = std::fs::read(path)
                        .with_context(|| format!("failed to read input: {path:?}"))?;
                    export_bytes(&bytes, &config)?
                }
                (None, Some(url)) => {
                    let request = printprep_core::ExportRequest {
                        url: Some(url.clone()),
                        data: None,
                        config,
                    };
                    printprep_core::export(&request)?
                }
                _ => anyhow::bail!("provide an input file or --url"),
            };

            let output = output.unwrap_or_else(|| default_output(input.as_deref(), result.format));
            tracing::info!(
                "writing {} triangles ({} bytes) to {:?}",
                result.triangle_count,
                result.bytes.len(),
                output
            );
            if let Err(err) = result.write_to_file(&output) {
                // Never leave a partial file behind looking like a success
                if !keep_on_failure {
                    let _ = std::fs::remove_file(&output);
                }
                return Err(err).with_context(|| format!("failed to write output: {output:?}"));
            }
            tracing::info!("Done!");
        }

        Commands::Info { input } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("failed to read input: {input:?}"))?;
            let scene = parse_glb(&bytes)?;
            tracing::info!("Scene {:?}:", input);
            tracing::info!("  nodes: {}", scene.nodes.len());
            tracing::info!("  primitives: {}", scene.primitive_count());
            tracing::info!("  triangles: {}", scene.triangle_count());
            let baked = printprep_core::pipeline::normalize::bake_scene(&scene)?;
            if let Some(bounds) = baked.bounds() {
                let size = bounds.size();
                tracing::info!(
                    "  world bounds: [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}] (size {:.4} x {:.4} x {:.4})",
                    bounds.min.x, bounds.min.y, bounds.min.z,
                    bounds.max.x, bounds.max.y, bounds.max.z,
                    size.x, size.y, size.z
                );
            }
        }
    }

    Ok(())
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.to_lowercase().as_str() {
        "stl" | "stl-binary" => Ok(OutputFormat::StlBinary),
        "stl-ascii" | "ascii" => Ok(OutputFormat::StlAscii),
        "glb" => Ok(OutputFormat::Glb),
        other => anyhow::bail!("unsupported format: {other} (use stl, stl-ascii, or glb)"),
    }
}

/// Output path next to the input, or a unique per-invocation name for URL
/// inputs so concurrent runs never collide.
fn default_output(input: Option<&Path>, format: OutputFormat) -> PathBuf {
    match input {
        Some(path) => {
            let out = path.with_extension(format.extension());
            if out == path {
                // glb passthrough of a .glb input must not clobber it
                path.with_extension(format!("out.{}", format.extension()))
            } else {
                out
            }
        }
        None => {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            PathBuf::from(format!("export-{stamp}.{}", format.extension()))
        }
    }
}

//! printprep-core
//!
//! Post-processing pipeline that turns a generated GLB scene into a
//! printable triangle mesh: parse, bake transforms, optionally weld and
//! orient, append a foundation cylinder, serialize to STL.
//!
//! Each export invocation owns its buffers end to end; concurrent exports
//! never share mutable geometry state.

pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod stl;

pub use config::{ExportConfig, OutputFormat};
pub use error::ExportError;
pub use export::{export, export_bytes, ExportOutput, ExportRequest};
pub use input::InputSource;
pub use mesh::{Bounds, TriangleBuffer};
pub use pipeline::foundation::{FoundationSpec, RADIAL_SEGMENTS};
pub use scene::{parse_glb, Geometry, Scene};

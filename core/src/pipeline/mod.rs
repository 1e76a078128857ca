//! The mesh post-processing pipeline: normalize, then the optional weld /
//! orient / foundation stages in that fixed order.

pub mod foundation;
pub mod normalize;
pub mod orient;
pub mod weld;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::mesh::TriangleBuffer;
use crate::scene::Scene;

use foundation::FoundationSpec;

/// Run every configured stage over a parsed scene and return the final
/// triangle buffer. The buffer is private to this invocation.
pub fn run(scene: &Scene, config: &ExportConfig) -> Result<TriangleBuffer> {
    let mut buffer = normalize::bake_scene(scene)?;
    tracing::info!(
        "baked {} primitives into {} triangles",
        scene.primitive_count(),
        buffer.triangle_count()
    );

    if config.weld {
        buffer = weld::weld_and_smooth(&buffer, config.weld_tolerance)?;
    }

    if config.orient {
        orient::orient_upright(&mut buffer)?;
    }

    if config.add_foundation {
        let bounds = buffer.bounds().ok_or_else(|| {
            ExportError::Processing("empty mesh, cannot size foundation".to_string())
        })?;
        let spec =
            FoundationSpec::from_bounds(&bounds, config.margin_ratio, config.thickness_ratio)?;
        foundation::append_foundation(&mut buffer, &spec);
    }

    Ok(buffer)
}

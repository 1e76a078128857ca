//! Orientation selector: greedy search over six candidate rotations for the
//! tallest, narrowest stable pose, then re-seat on the ground plane.

use crate::error::{ExportError, Result};
use crate::mesh::{Bounds, TriangleBuffer};
use glam::{Mat3, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Identity, the 180-degree flip, and quarter turns about both horizontal
/// axes. A fixed, small candidate set; no iterative optimization.
fn candidate_rotations() -> [Mat3; 6] {
    [
        Mat3::IDENTITY,
        Mat3::from_rotation_x(PI),
        Mat3::from_rotation_x(FRAC_PI_2),
        Mat3::from_rotation_x(-FRAC_PI_2),
        Mat3::from_rotation_z(FRAC_PI_2),
        Mat3::from_rotation_z(-FRAC_PI_2),
    ]
}

/// Prefer tall poses with a small footprint.
fn pose_score(bounds: &Bounds) -> f32 {
    let size = bounds.size();
    let footprint = (size.x * size.z).max(1e-12);
    size.y / footprint
}

/// Bounding box of the rotated geometry without materializing the copy.
fn rotated_bounds(buffer: &TriangleBuffer, rotation: Mat3) -> Option<Bounds> {
    let mut points = buffer.positions().iter().map(|&p| rotation * p);
    let first = points.next()?;
    let mut bounds = Bounds {
        min: first,
        max: first,
    };
    for p in points {
        bounds.min = bounds.min.min(p);
        bounds.max = bounds.max.max(p);
    }
    Some(bounds)
}

/// Rotate the mesh into its best standing pose and seat it on the ground
/// plane: XZ centroid at the origin, minimum Y at zero.
pub fn orient_upright(buffer: &mut TriangleBuffer) -> Result<()> {
    if buffer.is_empty() {
        return Err(ExportError::Processing(
            "cannot orient an empty mesh".to_string(),
        ));
    }

    // Ties break toward the first candidate (strict improvement only), so
    // an already-upright mesh keeps its orientation.
    let mut best = Mat3::IDENTITY;
    let mut best_score = f32::NEG_INFINITY;
    for rotation in candidate_rotations() {
        let Some(bounds) = rotated_bounds(buffer, rotation) else {
            continue;
        };
        let score = pose_score(&bounds);
        if score > best_score {
            best_score = score;
            best = rotation;
        }
    }

    for p in buffer.positions_mut() {
        *p = best * *p;
    }
    // Candidate rotations are orthonormal, so normals rotate the same way.
    for n in buffer.normals_mut() {
        *n = best * *n;
    }

    if let Some(bounds) = buffer.bounds() {
        let center = bounds.center();
        let offset = Vec3::new(-center.x, -bounds.min.y, -center.z);
        for p in buffer.positions_mut() {
            *p += offset;
        }
    }

    tracing::debug!("selected pose with score {best_score:.4}");
    Ok(())
}

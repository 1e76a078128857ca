//! Foundation generator: a closed cylinder sized from the model's bounding
//! box, appended so its top face touches the model's lowest point.
//!
//! The cylinder is concatenated, not CSG-unioned; contact is visual/print
//! contact only, watertightness between the two solids is not guaranteed.

use crate::error::{ExportError, Result};
use crate::mesh::{Bounds, TriangleBuffer};
use glam::Vec3;
use std::f32::consts::TAU;

/// Sides of the foundation cylinder.
pub const RADIAL_SEGMENTS: u32 = 64;

/// Fully derived description of the foundation solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundationSpec {
    pub radius: f32,
    pub thickness: f32,
    pub center_x: f32,
    pub center_z: f32,
    /// Y of the cylinder's bottom face; the top face sits at
    /// `bottom_y + thickness`, flush with the model's minimum Y.
    pub bottom_y: f32,
}

impl FoundationSpec {
    /// Derive the foundation from a bounding box and the two ratios.
    ///
    /// A degenerate box (all dimensions zero) is rejected rather than
    /// producing a zero-radius cylinder.
    pub fn from_bounds(bounds: &Bounds, margin_ratio: f32, thickness_ratio: f32) -> Result<Self> {
        let max_dim = bounds.max_dim();
        if !(max_dim > 0.0) {
            return Err(ExportError::Processing(format!(
                "degenerate bounding box (max dimension {max_dim}), cannot size foundation"
            )));
        }
        let center = bounds.center();
        let thickness = max_dim * thickness_ratio;
        Ok(Self {
            radius: (max_dim / 2.0) * (1.0 + margin_ratio),
            thickness,
            center_x: center.x,
            center_z: center.z,
            bottom_y: bounds.min.y - thickness,
        })
    }

    /// Triangles the cylinder contributes: two per side quad plus one per
    /// cap fan segment.
    pub fn triangle_count() -> usize {
        (RADIAL_SEGMENTS as usize) * 4
    }
}

/// Append the foundation cylinder to the buffer.
pub fn append_foundation(buffer: &mut TriangleBuffer, spec: &FoundationSpec) {
    let top_y = spec.bottom_y + spec.thickness;
    let center = |y: f32| Vec3::new(spec.center_x, y, spec.center_z);
    let rim = |i: u32, y: f32| {
        let theta = (i % RADIAL_SEGMENTS) as f32 / RADIAL_SEGMENTS as f32 * TAU;
        Vec3::new(
            spec.center_x + spec.radius * theta.cos(),
            y,
            spec.center_z + spec.radius * theta.sin(),
        )
    };
    let radial = |i: u32| {
        let theta = (i % RADIAL_SEGMENTS) as f32 / RADIAL_SEGMENTS as f32 * TAU;
        Vec3::new(theta.cos(), 0.0, theta.sin())
    };

    for i in 0..RADIAL_SEGMENTS {
        let bottom_a = rim(i, spec.bottom_y);
        let bottom_b = rim(i + 1, spec.bottom_y);
        let top_a = rim(i, top_y);
        let top_b = rim(i + 1, top_y);
        let normal_a = radial(i);
        let normal_b = radial(i + 1);

        // Side quad, wound outward (+theta runs x -> z, so outward is
        // bottom -> top -> next-top).
        buffer.push_triangle([bottom_a, top_a, top_b], [normal_a, normal_a, normal_b]);
        buffer.push_triangle([bottom_a, top_b, bottom_b], [normal_a, normal_b, normal_b]);

        // Top cap fan (+Y), bottom cap fan (-Y).
        buffer.push_triangle([center(top_y), top_b, top_a], [Vec3::Y; 3]);
        buffer.push_triangle(
            [center(spec.bottom_y), bottom_a, bottom_b],
            [Vec3::NEG_Y; 3],
        );
    }

    tracing::debug!(
        "appended foundation: radius {:.4}, thickness {:.4}, {} triangles",
        spec.radius,
        spec.thickness,
        FoundationSpec::triangle_count()
    );
}

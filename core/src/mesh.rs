//! Flat triangle storage shared by every pipeline stage.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn max_dim(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// The canonical intermediate form: a non-indexed triangle list, three
/// vertices per triangle, position and normal per vertex.
///
/// Owned exclusively by one export invocation; never shared.
#[derive(Debug, Clone, Default)]
pub struct TriangleBuffer {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl TriangleBuffer {
    /// Allocate for a known triangle count (stages compute their totals
    /// up front and write once rather than growing repeatedly).
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            normals: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn push_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]) {
        self.positions.extend_from_slice(&positions);
        self.normals.extend_from_slice(&normals);
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Vertices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        [
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        ]
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub(crate) fn normals_mut(&mut self) -> &mut [Vec3] {
        &mut self.normals
    }

    /// Bounding box over every vertex, or `None` for an empty buffer.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for &p in &self.positions[1..] {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }
}

/// Geometric normal of a triangle from its winding order.
///
/// Falls back to +Y when the triangle is degenerate, so downstream
/// serialization never sees NaN from a zero-length cross product.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = (b - a).cross(c - a);
    if n.length_squared() > f32::EPSILON {
        n.normalize()
    } else {
        Vec3::Y
    }
}

//! Vertex welder: merges coincident vertices so normals can be shared and
//! smoothed across triangle boundaries.
//!
//! Positions are quantized to a grid of resolution `tolerance`; the first
//! vertex seen in a cell becomes the canonical one and later hits are
//! redirected to it. First-seen-wins means two vertices up to
//! `tolerance * sqrt(3)` apart can merge and positions are never averaged;
//! an accepted approximation, not a defect.

use crate::error::{ExportError, Result};
use crate::mesh::TriangleBuffer;
use glam::Vec3;
use std::collections::HashMap;

/// An indexed mesh produced by welding, with smooth per-vertex normals.
#[derive(Debug, Clone)]
pub struct WeldedMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl WeldedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Re-expand into the flat triangle form the rest of the pipeline
    /// operates on.
    pub fn to_triangle_buffer(&self) -> TriangleBuffer {
        let mut buffer = TriangleBuffer::with_capacity(self.triangle_count());
        for triangle in self.indices.chunks_exact(3) {
            buffer.push_triangle(
                [
                    self.positions[triangle[0] as usize],
                    self.positions[triangle[1] as usize],
                    self.positions[triangle[2] as usize],
                ],
                [
                    self.normals[triangle[0] as usize],
                    self.normals[triangle[1] as usize],
                    self.normals[triangle[2] as usize],
                ],
            );
        }
        buffer
    }
}

/// Weld `buffer` at `tolerance` and recompute smooth normals.
pub fn weld(buffer: &TriangleBuffer, tolerance: f32) -> Result<WeldedMesh> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(ExportError::Processing(format!(
            "weld tolerance must be positive, got {tolerance}"
        )));
    }

    let source = buffer.positions();
    let mut cells: HashMap<(i64, i64, i64), u32> = HashMap::with_capacity(source.len());
    let mut positions: Vec<Vec3> = Vec::new();
    let mut remap: Vec<u32> = Vec::with_capacity(source.len());

    for &p in source {
        let key = quantize(p, tolerance);
        let index = *cells.entry(key).or_insert_with(|| {
            positions.push(p);
            (positions.len() - 1) as u32
        });
        remap.push(index);
    }

    // Rebuild triangles against canonical vertices; triangles collapsed by
    // the weld are dropped.
    let mut indices: Vec<u32> = Vec::with_capacity(source.len());
    let mut collapsed = 0usize;
    for triangle in remap.chunks_exact(3) {
        let (i0, i1, i2) = (triangle[0], triangle[1], triangle[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            collapsed += 1;
            continue;
        }
        indices.extend_from_slice(&[i0, i1, i2]);
    }
    if collapsed > 0 {
        tracing::debug!("weld collapsed {collapsed} degenerate triangles");
    }

    // Smooth normals: accumulate the un-normalized cross product per shared
    // vertex (area-weighted), then normalize once.
    let mut accumulated = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let a = positions[triangle[0] as usize];
        let b = positions[triangle[1] as usize];
        let c = positions[triangle[2] as usize];
        let cross = (b - a).cross(c - a);
        for &i in triangle {
            accumulated[i as usize] += cross;
        }
    }
    let normals = accumulated
        .into_iter()
        .map(|n| {
            if n.length_squared() > f32::EPSILON {
                n.normalize()
            } else {
                Vec3::Y
            }
        })
        .collect();

    Ok(WeldedMesh {
        positions,
        normals,
        indices,
    })
}

/// Weld and immediately re-expand, for pipeline use.
pub fn weld_and_smooth(buffer: &TriangleBuffer, tolerance: f32) -> Result<TriangleBuffer> {
    let welded = weld(buffer, tolerance)?;
    tracing::info!(
        "welded {} vertices down to {} ({} triangles)",
        buffer.positions().len(),
        welded.vertex_count(),
        welded.triangle_count()
    );
    if welded.indices.is_empty() {
        return Err(ExportError::Processing(
            "all triangles collapsed during welding".to_string(),
        ));
    }
    Ok(welded.to_triangle_buffer())
}

fn quantize(p: Vec3, tolerance: f32) -> (i64, i64, i64) {
    (
        (p.x / tolerance).round() as i64,
        (p.y / tolerance).round() as i64,
        (p.z / tolerance).round() as i64,
    )
}

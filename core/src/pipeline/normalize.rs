//! Geometry normalizer: bakes node world transforms into vertex data and
//! flattens every primitive into one triangle buffer.

use crate::error::{ExportError, Result};
use crate::mesh::{face_normal, TriangleBuffer};
use crate::scene::{Geometry, Scene};
use glam::{Mat3, Mat4, Vec3};

/// Bake the scene into a single world-space [`TriangleBuffer`].
///
/// Primitives with fewer than three vertices are skipped with a warning;
/// if nothing survives the whole export fails.
pub fn bake_scene(scene: &Scene) -> Result<TriangleBuffer> {
    // Explicit worklist traversal, accumulating parent * local. Deeply
    // nested scenes must not recurse.
    let mut instances: Vec<(usize, Mat4)> = Vec::new();
    let mut stack: Vec<(usize, Mat4)> = scene
        .roots
        .iter()
        .rev()
        .map(|&root| (root, Mat4::IDENTITY))
        .collect();
    while let Some((index, parent)) = stack.pop() {
        let node = &scene.nodes[index];
        let world = parent * node.local;
        for &primitive in &node.primitives {
            instances.push((primitive, world));
        }
        for &child in node.children.iter().rev() {
            stack.push((child, world));
        }
    }

    // Size the output once; stages write by push into reserved storage.
    let total: usize = instances
        .iter()
        .map(|&(p, _)| scene.primitives[p].geometry.triangle_count())
        .sum();
    let mut buffer = TriangleBuffer::with_capacity(total);

    let mut degenerate = 0usize;
    for &(primitive, world) in &instances {
        bake_primitive(
            &scene.primitives[primitive].geometry,
            world,
            &mut buffer,
            &mut degenerate,
        );
    }
    if degenerate > 0 {
        tracing::debug!("{degenerate} degenerate triangles kept fallback normals");
    }

    if buffer.is_empty() {
        return Err(ExportError::Processing(
            "no usable geometry after baking transforms".to_string(),
        ));
    }
    Ok(buffer)
}

fn bake_primitive(
    geometry: &Geometry,
    world: Mat4,
    out: &mut TriangleBuffer,
    degenerate: &mut usize,
) {
    if geometry.vertex_count() < 3 {
        tracing::warn!(
            "skipping primitive with {} vertices (need at least 3)",
            geometry.vertex_count()
        );
        return;
    }

    // Normals transform by the inverse-transpose; a non-invertible world
    // matrix (zero scale on some axis) falls back to winding normals.
    let linear = Mat3::from_mat4(world);
    let normal_matrix = if linear.determinant().abs() > 1e-12 {
        Some(linear.inverse().transpose())
    } else {
        tracing::warn!("node transform is not invertible, recomputing normals from winding");
        None
    };

    match geometry {
        Geometry::Indexed {
            positions,
            normals,
            indices,
        } => match indices {
            // Safe de-indexing: only tightly packed arrays ever reach here.
            Some(indices) => {
                for triangle in indices.chunks_exact(3) {
                    push_baked(
                        out,
                        world,
                        normal_matrix,
                        [
                            positions[triangle[0] as usize],
                            positions[triangle[1] as usize],
                            positions[triangle[2] as usize],
                        ],
                        normals.as_ref().map(|n| {
                            [
                                n[triangle[0] as usize],
                                n[triangle[1] as usize],
                                n[triangle[2] as usize],
                            ]
                        }),
                        degenerate,
                    );
                }
            }
            None => push_sequential(
                out,
                world,
                normal_matrix,
                positions,
                normals.as_deref(),
                degenerate,
            ),
        },
        Geometry::Expanded { positions, normals } => push_sequential(
            out,
            world,
            normal_matrix,
            positions,
            normals.as_deref(),
            degenerate,
        ),
    }
}

fn push_sequential(
    out: &mut TriangleBuffer,
    world: Mat4,
    normal_matrix: Option<Mat3>,
    positions: &[Vec3],
    normals: Option<&[Vec3]>,
    degenerate: &mut usize,
) {
    let remainder = positions.len() % 3;
    if remainder != 0 {
        tracing::warn!(
            "primitive vertex count {} is not a multiple of 3, dropping {} trailing vertices",
            positions.len(),
            remainder
        );
    }
    for (i, triangle) in positions.chunks_exact(3).enumerate() {
        push_baked(
            out,
            world,
            normal_matrix,
            [triangle[0], triangle[1], triangle[2]],
            normals.map(|n| [n[i * 3], n[i * 3 + 1], n[i * 3 + 2]]),
            degenerate,
        );
    }
}

fn push_baked(
    out: &mut TriangleBuffer,
    world: Mat4,
    normal_matrix: Option<Mat3>,
    positions: [Vec3; 3],
    normals: Option<[Vec3; 3]>,
    degenerate: &mut usize,
) {
    let baked = positions.map(|p| world.transform_point3(p));
    if (baked[1] - baked[0])
        .cross(baked[2] - baked[0])
        .length_squared()
        <= f32::EPSILON
    {
        *degenerate += 1;
    }
    let baked_normals = match (normals, normal_matrix) {
        (Some(normals), Some(matrix)) => normals.map(|n| {
            let n = matrix * n;
            if n.length_squared() > f32::EPSILON {
                n.normalize()
            } else {
                face_normal(baked[0], baked[1], baked[2])
            }
        }),
        // Flat-shading fallback: one winding normal for all three vertices.
        _ => [face_normal(baked[0], baked[1], baked[2]); 3],
    };
    out.push_triangle(baked, baked_normals);
}

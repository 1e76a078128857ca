//! Binary scene (GLB) reader.
//!
//! Parses the container into a node hierarchy plus mesh primitives. Each
//! primitive's geometry is tagged at the type level by attribute layout:
//! tightly packed arrays stay [`Geometry::Indexed`] and are de-indexed later
//! by the normalizer, while interleaved/strided primitives are expanded here
//! through the glTF accessor reader (which understands strides) and become
//! [`Geometry::Expanded`]. De-indexing is therefore only ever expressible on
//! a layout where it is safe; raw strided bytes are never reinterpreted as
//! flat positions.

use crate::error::{ExportError, Result};
use glam::{Mat4, Vec3};

/// Mesh primitive geometry by attribute layout.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Separate tightly packed attribute arrays, optionally indexed.
    Indexed {
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Option<Vec<u32>>,
    },
    /// Attributes shared a strided buffer view; triangles were already
    /// expanded through the accessor reader at parse time.
    Expanded {
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
    },
}

impl Geometry {
    /// Number of triangles this primitive will contribute.
    pub fn triangle_count(&self) -> usize {
        match self {
            Geometry::Indexed {
                indices: Some(indices),
                ..
            } => indices.len() / 3,
            Geometry::Indexed { positions, .. } | Geometry::Expanded { positions, .. } => {
                positions.len() / 3
            }
        }
    }

    /// Number of vertex positions actually stored.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Indexed { positions, .. } | Geometry::Expanded { positions, .. } => {
                positions.len()
            }
        }
    }
}

/// One mesh primitive reachable from the node hierarchy.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub geometry: Geometry,
}

/// A scene node: local transform, primitives it instances, child nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub local: Mat4,
    pub primitives: Vec<usize>,
    pub children: Vec<usize>,
}

/// Parsed scene: node hierarchy plus the primitive pool it references.
#[derive(Debug, Clone)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Triangles across all primitives, not counting node instancing.
    pub fn triangle_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|p| p.geometry.triangle_count())
            .sum()
    }
}

/// Parse GLB bytes into a [`Scene`].
///
/// Fails with [`ExportError::Parse`] when the container is malformed or no
/// triangle primitive survives. Non-triangle primitive modes are skipped
/// with a warning.
pub fn parse_glb(bytes: &[u8]) -> Result<Scene> {
    let (document, buffers, _images) = gltf::import_slice(bytes)
        .map_err(|e| ExportError::Parse(format!("failed to read GLB container: {e}")))?;

    let mut primitives = Vec::new();
    let mut mesh_primitives: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mut ids = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    "skipping primitive with mode {:?} in mesh {} (only triangles are exported)",
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }
            let geometry = read_primitive(&primitive, &buffers)?;
            ids.push(primitives.len());
            primitives.push(Primitive { geometry });
        }
        mesh_primitives.push(ids);
    }

    if primitives.is_empty() {
        return Err(ExportError::Parse(
            "scene contains no triangle mesh primitives".to_string(),
        ));
    }

    let nodes: Vec<Node> = document
        .nodes()
        .map(|node| Node {
            local: Mat4::from_cols_array_2d(&node.transform().matrix()),
            primitives: node
                .mesh()
                .map(|m| mesh_primitives[m.index()].clone())
                .unwrap_or_default(),
            children: node.children().map(|c| c.index()).collect(),
        })
        .collect();

    let roots = scene_roots(&document, &nodes);
    check_hierarchy(&nodes, &roots)?;

    Ok(Scene {
        nodes,
        roots,
        primitives,
    })
}

/// glTF requires the node hierarchy to be disjoint strict trees. A node
/// reachable twice (its own ancestor, or shared between parents) would
/// loop the transform bake forever, so it is a parse error.
fn check_hierarchy(nodes: &[Node], roots: &[usize]) -> Result<()> {
    let mut seen = vec![false; nodes.len()];
    let mut stack: Vec<usize> = roots.to_vec();
    while let Some(index) = stack.pop() {
        if seen[index] {
            return Err(ExportError::Parse(format!(
                "node {index} is reachable more than once (cyclic or shared hierarchy)"
            )));
        }
        seen[index] = true;
        stack.extend(nodes[index].children.iter().copied());
    }
    Ok(())
}

/// Root node set: the default scene's nodes, or any node that is not a
/// child of another node when the document declares no scenes.
fn scene_roots(document: &gltf::Document, nodes: &[Node]) -> Vec<usize> {
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }
    let mut is_child = vec![false; nodes.len()];
    for node in nodes {
        for &c in &node.children {
            is_child[c] = true;
        }
    }
    (0..nodes.len()).filter(|&i| !is_child[i]).collect()
}

/// True when position or normal attributes live in a strided buffer view
/// whose stride differs from the tightly packed element size.
fn is_interleaved(primitive: &gltf::Primitive) -> bool {
    primitive.attributes().any(|(semantic, accessor)| {
        matches!(
            semantic,
            gltf::Semantic::Positions | gltf::Semantic::Normals
        ) && accessor
            .view()
            .and_then(|view| view.stride())
            .is_some_and(|stride| stride != accessor.size())
    })
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Result<Geometry> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| ExportError::Parse("primitive has no POSITION attribute".to_string()))?
        .map(Vec3::from)
        .collect();

    let normals: Option<Vec<Vec3>> = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect());
    let normals = match normals {
        Some(n) if n.len() != positions.len() => {
            tracing::warn!(
                "primitive has {} normals for {} positions, ignoring normals",
                n.len(),
                positions.len()
            );
            None
        }
        other => other,
    };

    let indices: Option<Vec<u32>> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect());
    if let Some(ref idx) = indices {
        if let Some(&bad) = idx.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ExportError::Parse(format!(
                "index {bad} out of range for {} vertices",
                positions.len()
            )));
        }
    }

    if is_interleaved(primitive) {
        // Expand now, through the accessor reader; the strided view itself
        // is never touched again.
        Ok(expand_strided(positions, normals, indices))
    } else {
        Ok(Geometry::Indexed {
            positions,
            normals,
            indices,
        })
    }
}

fn expand_strided(
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    indices: Option<Vec<u32>>,
) -> Geometry {
    match indices {
        Some(indices) => {
            let expanded_positions = indices
                .iter()
                .map(|&i| positions[i as usize])
                .collect();
            let expanded_normals = normals
                .map(|n| indices.iter().map(|&i| n[i as usize]).collect());
            Geometry::Expanded {
                positions: expanded_positions,
                normals: expanded_normals,
            }
        }
        None => Geometry::Expanded { positions, normals },
    }
}

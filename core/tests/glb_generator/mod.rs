//! Programmatic GLB generation for integration tests.
//!
//! Builds small but complete GLB files: an indexed or flat unit cube,
//! an interleaved-attribute cube, and nested node hierarchies.

use gltf_json as json;
use json::validation::Checked::Valid;

/// Unit cube corner positions, bit-indexed (bit0 = x, bit1 = y, bit2 = z),
/// spanning [-0.5, 0.5] on every axis.
fn cube_corners() -> Vec<[f32; 3]> {
    (0..8)
        .map(|i: u32| {
            [
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            ]
        })
        .collect()
}

/// Quad corner indices per face, expanded to outward-wound triangles.
const FACES: [[u16; 4]; 6] = [
    [1, 5, 7, 3], // +X
    [4, 0, 2, 6], // -X
    [2, 3, 7, 6], // +Y
    [0, 4, 5, 1], // -Y
    [5, 4, 6, 7], // +Z
    [0, 1, 3, 2], // -Z
];

fn cube_indices() -> Vec<u16> {
    let mut indices = Vec::with_capacity(36);
    for [a, b, c, d] in FACES {
        indices.extend_from_slice(&[a, c, b, a, d, c]);
    }
    indices
}

/// Face normal for each entry of `FACES`.
const FACE_NORMALS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// A 12-triangle unit cube. `indexed` controls whether the primitive uses
/// an index buffer (8 shared vertices) or 36 flat positions.
pub fn unit_cube_glb(indexed: bool) -> Vec<u8> {
    let corners = cube_corners();
    if indexed {
        build_glb(&corners, None, Some(&cube_indices()), &[simple_node(0)])
    } else {
        let flat: Vec<[f32; 3]> = cube_indices()
            .iter()
            .map(|&i| corners[i as usize])
            .collect();
        build_glb(&flat, None, None, &[simple_node(0)])
    }
}

/// A unit cube under a node with the given translation and uniform scale.
pub fn transformed_cube_glb(translation: [f32; 3], scale: f32) -> Vec<u8> {
    let node = json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(0)),
        name: Some("Transformed".to_string()),
        rotation: None,
        scale: Some([scale, scale, scale]),
        translation: Some(translation),
        skin: None,
        weights: None,
    };
    build_glb(&cube_corners(), None, Some(&cube_indices()), &[node])
}

/// A unit cube under parent translation * child scale, exercising
/// parent-to-child transform accumulation.
pub fn nested_cube_glb(parent_translation: [f32; 3], child_scale: f32) -> Vec<u8> {
    let parent = json::Node {
        camera: None,
        children: Some(vec![json::Index::new(1)]),
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some("Parent".to_string()),
        rotation: None,
        scale: None,
        translation: Some(parent_translation),
        skin: None,
        weights: None,
    };
    let child = json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(0)),
        name: Some("Child".to_string()),
        rotation: None,
        scale: Some([child_scale, child_scale, child_scale]),
        translation: None,
        skin: None,
        weights: None,
    };
    build_glb_with_roots(
        &cube_corners(),
        None,
        Some(&cube_indices()),
        &[parent, child],
        &[0],
    )
}

/// A unit cube whose positions and normals share one interleaved buffer
/// view (stride 24): 24 vertices, 36 indices.
pub fn interleaved_cube_glb() -> Vec<u8> {
    let corners = cube_corners();

    // 4 unique vertices per face, each with the face normal
    let mut vertex_data: Vec<u8> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();
    let mut positions: Vec<[f32; 3]> = Vec::new();
    for (face, quad) in FACES.iter().enumerate() {
        let base = (face * 4) as u16;
        for &corner in quad {
            let p = corners[corner as usize];
            positions.push(p);
            for value in p {
                vertex_data.extend_from_slice(&value.to_le_bytes());
            }
            for value in FACE_NORMALS[face] {
                vertex_data.extend_from_slice(&value.to_le_bytes());
            }
        }
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    let mut buffer_data = vertex_data;
    let index_offset = buffer_data.len();
    for i in &indices {
        buffer_data.extend_from_slice(&i.to_le_bytes());
    }

    let views = vec![
        // Interleaved vertex view: position at offset 0, normal at 12
        json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: index_offset.into(),
            byte_offset: Some(0u64.into()),
            byte_stride: Some(json::buffer::Stride(24)),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ArrayBuffer)),
        },
        json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (indices.len() * 2).into(),
            byte_offset: Some(index_offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ElementArrayBuffer)),
        },
    ];

    let (min, max) = position_bounds(&positions);
    let accessors = vec![
        float_accessor(0, 0, positions.len(), json::accessor::Type::Vec3, Some((min, max))),
        float_accessor(0, 12, positions.len(), json::accessor::Type::Vec3, None),
        json::Accessor {
            buffer_view: Some(json::Index::new(1)),
            byte_offset: Some(0u64.into()),
            count: indices.len().into(),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::U16,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Scalar),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
        },
    ];

    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(0u32),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(1u32),
    );
    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(2)),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let root = scaffold_root(
        vec![primitive],
        views,
        accessors,
        vec![simple_node(0)],
        &[0],
    );
    assemble_glb(&root, &buffer_data)
}

/// A unit cube under a node that lists itself as a child; the reader must
/// reject the malformed hierarchy instead of traversing it.
pub fn cyclic_node_glb() -> Vec<u8> {
    let node = json::Node {
        camera: None,
        children: Some(vec![json::Index::new(0)]),
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(0)),
        name: Some("Ouroboros".to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    };
    build_glb_with_roots(&cube_corners(), None, Some(&cube_indices()), &[node], &[0])
}

/// A GLB whose only primitive is a line strip; the reader must reject the
/// document for lack of triangle geometry.
pub fn lines_only_glb() -> Vec<u8> {
    let positions: Vec<[f32; 3]> = vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
    let buffer_data: Vec<u8> = bytemuck::cast_slice(&positions).to_vec();
    let views = vec![tight_view(0, buffer_data.len())];
    let (min, max) = position_bounds(&positions);
    let accessors = vec![float_accessor(
        0,
        0,
        positions.len(),
        json::accessor::Type::Vec3,
        Some((min, max)),
    )];

    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(0u32),
    );
    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: None,
        material: None,
        mode: Valid(json::mesh::Mode::LineStrip),
        targets: None,
    };
    let root = scaffold_root(vec![primitive], views, accessors, vec![simple_node(0)], &[0]);
    assemble_glb(&root, &buffer_data)
}

fn simple_node(mesh: u32) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(mesh)),
        name: Some("Mesh".to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

fn tight_view(offset: usize, length: usize) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: length.into(),
        byte_offset: Some(offset.into()),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(json::buffer::Target::ArrayBuffer)),
    }
}

fn float_accessor(
    view: u32,
    byte_offset: u64,
    count: usize,
    type_: json::accessor::Type,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    let (min, max) = match bounds {
        Some((min, max)) => (
            Some(json::Value::Array(
                min.into_iter().map(json::Value::from).collect(),
            )),
            Some(json::Value::Array(
                max.into_iter().map(json::Value::from).collect(),
            )),
        ),
        None => (None, None),
    };
    json::Accessor {
        buffer_view: Some(json::Index::new(view)),
        byte_offset: Some(byte_offset.into()),
        count: count.into(),
        component_type: Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::F32,
        )),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min,
        max,
        name: None,
        normalized: false,
        sparse: None,
    }
}

fn position_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (min, max)
}

/// Tightly packed positions (+ optional u16 indices) under the given nodes,
/// with every node a scene root.
fn build_glb(
    positions: &[[f32; 3]],
    normals: Option<&[[f32; 3]]>,
    indices: Option<&[u16]>,
    nodes: &[json::Node],
) -> Vec<u8> {
    let roots: Vec<u32> = (0..nodes.len() as u32).collect();
    build_glb_with_roots(positions, normals, indices, nodes, &roots)
}

fn build_glb_with_roots(
    positions: &[[f32; 3]],
    normals: Option<&[[f32; 3]]>,
    indices: Option<&[u16]>,
    nodes: &[json::Node],
    roots: &[u32],
) -> Vec<u8> {
    let mut buffer_data: Vec<u8> = Vec::new();
    let mut views = Vec::new();
    let mut accessors = Vec::new();

    buffer_data.extend_from_slice(bytemuck::cast_slice(positions));
    views.push(tight_view(0, buffer_data.len()));
    let (min, max) = position_bounds(positions);
    accessors.push(float_accessor(
        0,
        0,
        positions.len(),
        json::accessor::Type::Vec3,
        Some((min, max)),
    ));
    let position_accessor = 0u32;

    let normal_accessor = normals.map(|normals| {
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(bytemuck::cast_slice(normals));
        views.push(tight_view(offset, buffer_data.len() - offset));
        accessors.push(float_accessor(
            views.len() as u32 - 1,
            0,
            normals.len(),
            json::accessor::Type::Vec3,
            None,
        ));
        accessors.len() as u32 - 1
    });

    let index_accessor = indices.map(|indices| {
        let offset = buffer_data.len();
        for i in indices {
            buffer_data.extend_from_slice(&i.to_le_bytes());
        }
        views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (indices.len() * 2).into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ElementArrayBuffer)),
        });
        accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: indices.len().into(),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::U16,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Scalar),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
        });
        accessors.len() as u32 - 1
    });

    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(position_accessor),
    );
    if let Some(accessor) = normal_accessor {
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            json::Index::new(accessor),
        );
    }
    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: index_accessor.map(json::Index::new),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let root = scaffold_root(vec![primitive], views, accessors, nodes.to_vec(), roots);
    assemble_glb(&root, &buffer_data)
}

fn scaffold_root(
    primitives: Vec<json::mesh::Primitive>,
    buffer_views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
    nodes: Vec<json::Node>,
    roots: &[u32],
) -> json::Root {
    json::Root {
        accessors,
        animations: Vec::new(),
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("printprep-test".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers: vec![json::Buffer {
            byte_length: 0u64.into(), // patched by assemble_glb
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }],
        buffer_views,
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images: Vec::new(),
        materials: Vec::new(),
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("TestMesh".to_string()),
            primitives,
            weights: None,
        }],
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("TestScene".to_string()),
            nodes: roots.iter().map(|&i| json::Index::new(i)).collect(),
        }],
        skins: Vec::new(),
        textures: Vec::new(),
    }
}

/// Assemble the final GLB binary.
fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Vec<u8> {
    let mut root = root.clone();
    root.buffers[0].byte_length = buffer_data.len().into();

    let json_string = json::serialize::to_string(&root).expect("failed to serialize JSON");
    let json_bytes = json_string.as_bytes();

    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;
    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

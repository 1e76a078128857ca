//! Triangle-soup STL serializer, ASCII and binary.
//!
//! Both writers refuse non-finite coordinates: a NaN or Infinity anywhere in
//! the buffer fails the export instead of silently emitting a corrupt file.

use crate::error::{ExportError, Result};
use crate::mesh::{face_normal, TriangleBuffer};
use glam::Vec3;
use std::io::Write;

/// Bytes per triangle record in binary STL: normal + 3 vertices + attribute
/// byte count.
pub const BINARY_TRIANGLE_SIZE: usize = 12 * 4 + 2;
/// Binary STL prelude: 80-byte header plus the little-endian triangle count.
pub const BINARY_HEADER_SIZE: usize = 80 + 4;

/// Write ASCII STL (`solid <name>` ... `endsolid <name>`).
pub fn write_ascii<W: Write>(w: &mut W, name: &str, buffer: &TriangleBuffer) -> Result<()> {
    writeln!(w, "solid {name}")?;
    for i in 0..buffer.triangle_count() {
        let [a, b, c] = buffer.triangle(i);
        let normal = facet_normal(buffer, i)?;
        writeln!(
            w,
            "  facet normal {} {} {}",
            normal.x, normal.y, normal.z
        )?;
        writeln!(w, "    outer loop")?;
        for v in [a, b, c] {
            writeln!(w, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(w, "    endloop")?;
        writeln!(w, "  endfacet")?;
    }
    writeln!(w, "endsolid {name}")?;
    Ok(())
}

/// Write binary STL: 80-byte header, u32 triangle count, 50-byte records.
pub fn write_binary<W: Write>(w: &mut W, buffer: &TriangleBuffer) -> Result<()> {
    let count = buffer.triangle_count();
    let count32 = u32::try_from(count).map_err(|_| {
        ExportError::Serialization(format!("triangle count {count} exceeds the u32 STL limit"))
    })?;

    let mut header = [0u8; 80];
    let tag = b"printprep binary STL";
    header[..tag.len()].copy_from_slice(tag);
    w.write_all(&header)?;
    w.write_all(&count32.to_le_bytes())?;

    for i in 0..count {
        let normal = facet_normal(buffer, i)?;
        write_vec3(w, normal)?;
        for v in buffer.triangle(i) {
            write_vec3(w, v)?;
        }
        w.write_all(&0u16.to_le_bytes())?; // attribute byte count
    }
    Ok(())
}

/// Facet normal for triangle `i`, after proving the triangle finite.
///
/// STL facets carry one geometric normal; smoothed per-vertex normals only
/// affect welding, so the facet normal is recomputed from winding. A
/// degenerate facet falls back to the stored vertex normal.
fn facet_normal(buffer: &TriangleBuffer, i: usize) -> Result<Vec3> {
    let [a, b, c] = buffer.triangle(i);
    for v in [a, b, c] {
        if !v.is_finite() {
            return Err(ExportError::Serialization(format!(
                "non-finite vertex coordinate in triangle {i}"
            )));
        }
    }
    let cross = (b - a).cross(c - a);
    let normal = if cross.length_squared() > f32::EPSILON {
        cross.normalize()
    } else {
        buffer.normals()[i * 3]
    };
    if !normal.is_finite() {
        return Err(ExportError::Serialization(format!(
            "non-finite normal in triangle {i}"
        )));
    }
    Ok(normal)
}

fn write_vec3<W: Write>(w: &mut W, v: Vec3) -> Result<()> {
    w.write_all(&v.x.to_le_bytes())?;
    w.write_all(&v.y.to_le_bytes())?;
    w.write_all(&v.z.to_le_bytes())?;
    Ok(())
}

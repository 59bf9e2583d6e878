use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, MaterialPalette};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle: its render flags and three indices into the owning mesh's
/// `positions`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MeshFace {
    pub flags: u16,
    pub vertex_indexes: (u16, u16, u16),
}

/// A vertex-animation instruction. The stream is ambiguous by design: each
/// entry is four bytes read speculatively, then reinterpreted once its
/// leading `type_field` is known — as a single `f32` offset when
/// `type_field == 4`, otherwise as a pair of `u16` vertex indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MeshOp {
    Offset(f32),
    Indices(u16, u16),
}

/// `0x36` A mesh's geometry: vertex positions, texture coordinates,
/// normals, per-vertex colors, faces, and the run-length groupings that
/// bind ranges of faces/vertices to palette entries or skeleton bones.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct Mesh {
    pub name_reference: StringReference,
    pub flags: u32,
    pub material_palette_reference: FragmentRef<MaterialPalette>,
    pub animated_vertices_reference: i32,
    pub center: (f32, f32, f32),
    pub params2: (u32, u32, u32),
    pub max_distance: f32,
    pub min: (f32, f32, f32),
    pub max: (f32, f32, f32),
    pub scale: u16,
    pub positions: Vec<(i16, i16, i16)>,
    pub texture_coordinates: Vec<(i16, i16)>,
    pub vertex_normals: Vec<(i8, i8, i8)>,
    pub vertex_colors: Vec<u32>,
    pub faces: Vec<MeshFace>,
    pub skin_assignment_groups: Vec<(u16, u16)>,
    pub face_material_groups: Vec<(u16, u16)>,
    pub vertex_material_groups: Vec<(u16, u16)>,
    pub mesh_ops: Vec<MeshOp>,
}

impl Mesh {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let material_palette_reference = FragmentRef::parse(cursor)?;
        let animated_vertices_reference = cursor.i32_le()?;
        let _unknown_reference_3 = cursor.i32_le()?;
        let _unknown_reference_4 = cursor.i32_le()?;
        let center = (cursor.f32_le()?, cursor.f32_le()?, cursor.f32_le()?);
        let params2 = (cursor.u32_le()?, cursor.u32_le()?, cursor.u32_le()?);
        let max_distance = cursor.f32_le()?;
        let min = (cursor.f32_le()?, cursor.f32_le()?, cursor.f32_le()?);
        let max = (cursor.f32_le()?, cursor.f32_le()?, cursor.f32_le()?);
        let position_count = cursor.u16_le()?;
        let texture_coordinate_count = cursor.u16_le()?;
        let normal_count = cursor.u16_le()?;
        let color_count = cursor.u16_le()?;
        let face_count = cursor.u16_le()?;
        let skin_assignment_count = cursor.u16_le()?;
        let face_material_group_count = cursor.u16_le()?;
        let vertex_material_group_count = cursor.u16_le()?;
        let mesh_op_count = cursor.u16_le()?;
        let scale = cursor.u16_le()?;

        let mut positions = Vec::with_capacity(position_count as usize);
        for _ in 0..position_count {
            positions.push((cursor.i16_le()?, cursor.i16_le()?, cursor.i16_le()?));
        }

        let mut texture_coordinates = Vec::with_capacity(texture_coordinate_count as usize);
        for _ in 0..texture_coordinate_count {
            texture_coordinates.push((cursor.i16_le()?, cursor.i16_le()?));
        }

        let mut vertex_normals = Vec::with_capacity(normal_count as usize);
        for _ in 0..normal_count {
            vertex_normals.push((cursor.i8()?, cursor.i8()?, cursor.i8()?));
        }

        let mut vertex_colors = Vec::with_capacity(color_count as usize);
        for _ in 0..color_count {
            vertex_colors.push(cursor.u32_le()?);
        }

        let mut faces = Vec::with_capacity(face_count as usize);
        for _ in 0..face_count {
            faces.push(MeshFace {
                flags: cursor.u16_le()?,
                vertex_indexes: (cursor.u16_le()?, cursor.u16_le()?, cursor.u16_le()?),
            });
        }

        let mut skin_assignment_groups = Vec::with_capacity(skin_assignment_count as usize);
        for _ in 0..skin_assignment_count {
            skin_assignment_groups.push((cursor.u16_le()?, cursor.u16_le()?));
        }

        let mut face_material_groups = Vec::with_capacity(face_material_group_count as usize);
        for _ in 0..face_material_group_count {
            face_material_groups.push((cursor.u16_le()?, cursor.u16_le()?));
        }

        let mut vertex_material_groups = Vec::with_capacity(vertex_material_group_count as usize);
        for _ in 0..vertex_material_group_count {
            vertex_material_groups.push((cursor.u16_le()?, cursor.u16_le()?));
        }

        let mut mesh_ops = Vec::with_capacity(mesh_op_count as usize);
        for _ in 0..mesh_op_count {
            mesh_ops.push(parse_mesh_op(cursor)?);
        }

        Ok(Mesh {
            name_reference,
            flags,
            material_palette_reference,
            animated_vertices_reference,
            center,
            params2,
            max_distance,
            min,
            max,
            scale,
            positions,
            texture_coordinates,
            vertex_normals,
            vertex_colors,
            faces,
            skin_assignment_groups,
            face_material_groups,
            vertex_material_groups,
            mesh_ops,
        })
    }

    /// `2^-scale`, the factor `positions` must be multiplied by to recover
    /// world-space coordinates.
    pub fn position_scale(&self) -> f32 {
        (2.0f32).powi(-(self.scale as i32))
    }
}

/// Each meshop is a `type_field:u16` tag followed by four bytes whose
/// interpretation depends on the tag read just ahead of them.
fn parse_mesh_op(cursor: &mut Cursor) -> Result<MeshOp, UnexpectedEof> {
    let type_field = cursor.u16_le()?;
    if type_field == 4 {
        Ok(MeshOp::Offset(cursor.f32_le()?))
    } else {
        Ok(MeshOp::Indices(cursor.u16_le()?, cursor.u16_le()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_mesh_header() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        data.extend_from_slice(&0i32.to_le_bytes()); // material_palette_reference
        data.extend_from_slice(&0i32.to_le_bytes()); // animated_vertices_reference
        data.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_3
        data.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_4
        data.extend(std::iter::repeat(0u8).take(3 * 4)); // center
        data.extend(std::iter::repeat(0u8).take(3 * 4)); // params2
        data.extend_from_slice(&0f32.to_le_bytes()); // max_distance
        data.extend(std::iter::repeat(0u8).take(3 * 4)); // min
        data.extend(std::iter::repeat(0u8).take(3 * 4)); // max
        for _ in 0..10 {
            data.extend_from_slice(&0u16.to_le_bytes()); // nine array counts + scale, all zero
        }
        data
    }

    #[test]
    fn it_parses_an_empty_mesh() {
        let data = empty_mesh_header();
        let mut cursor = Cursor::new(&data);
        let mesh = Mesh::parse(StringReference::new(0), &mut cursor).unwrap();
        assert!(mesh.positions.is_empty());
        assert!(mesh.faces.is_empty());
        assert_eq!(mesh.position_scale(), 1.0);
    }

    #[test]
    fn meshop_reinterprets_its_trailing_bytes_by_type_field() {
        let mut data = Vec::new();
        data.extend_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        let mut cursor = Cursor::new(&data);
        assert_eq!(parse_mesh_op(&mut cursor).unwrap(), MeshOp::Offset(1.5));

        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        let mut cursor = Cursor::new(&data);
        assert_eq!(parse_mesh_op(&mut cursor).unwrap(), MeshOp::Indices(2, 3));
    }
}

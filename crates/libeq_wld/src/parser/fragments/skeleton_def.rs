use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, Mesh, MeshRef, SkeletonTrackRef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HAS_CENTER_OFFSET: u32 = 0x1;
const HAS_BOUNDING_RADIUS: u32 = 0x2;
const HAS_MESH_REFERENCES: u32 = 0x200;

/// One bone in a [`SkeletonDef`]'s hierarchy. `sub_dags` holds the indices,
/// into the owning fragment's flat `entries` array, of this bone's
/// children — the tree is implicit, not nested.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SkeletonDefEntry {
    pub name_reference: StringReference,
    pub flags: u32,
    pub track_reference: FragmentRef<SkeletonTrackRef>,
    pub mesh_or_sprite_reference: FragmentRef<MeshRef>,
    pub sub_dags: Vec<u32>,
}

impl SkeletonDefEntry {
    fn parse(cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let name_reference = StringReference::parse(cursor)?;
        let flags = cursor.u32_le()?;
        let track_reference = FragmentRef::parse(cursor)?;
        let mesh_or_sprite_reference = FragmentRef::parse(cursor)?;
        let sub_dag_count = cursor.u32_le()?;
        let mut sub_dags = Vec::with_capacity(sub_dag_count as usize);
        for _ in 0..sub_dag_count {
            sub_dags.push(cursor.u32_le()?);
        }
        Ok(SkeletonDefEntry {
            name_reference,
            flags,
            track_reference,
            mesh_or_sprite_reference,
            sub_dags,
        })
    }
}

/// `0x10` The skeleton of an animated model: a flat array of bones plus,
/// for each attached skin, a reference to the mesh it deforms.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SkeletonDef {
    pub name_reference: StringReference,
    pub flags: u32,
    /// Optionally points to a polygon-animation-reference fragment; purpose
    /// otherwise undocumented.
    pub collision_volume_reference: u32,
    pub center_offset: Option<(u32, u32, u32)>,
    pub entries: Vec<SkeletonDefEntry>,
    pub bounding_radius: Option<f32>,
    pub mesh_references: Vec<FragmentRef<Mesh>>,
}

impl SkeletonDef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let entry_count = cursor.u32_le()?;
        let collision_volume_reference = cursor.u32_le()?;
        let center_offset = if flags & HAS_CENTER_OFFSET != 0 {
            Some((cursor.u32_le()?, cursor.u32_le()?, cursor.u32_le()?))
        } else {
            None
        };
        let bounding_radius = if flags & HAS_BOUNDING_RADIUS != 0 {
            Some(cursor.f32_le()?)
        } else {
            None
        };
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(SkeletonDefEntry::parse(cursor)?);
        }
        let mesh_references = if flags & HAS_MESH_REFERENCES != 0 {
            let mesh_count = cursor.u32_le()?;
            let mut refs = Vec::with_capacity(mesh_count as usize);
            for _ in 0..mesh_count {
                refs.push(FragmentRef::parse(cursor)?);
            }
            refs
        } else {
            Vec::new()
        };
        Ok(SkeletonDef {
            name_reference,
            flags,
            collision_volume_reference,
            center_offset,
            entries,
            bounding_radius,
            mesh_references,
        })
    }

    /// Indices, into `entries`, of the direct children of `entries[idx]`.
    pub fn children(&self, idx: usize) -> &[u32] {
        self.entries
            .get(idx)
            .map(|e| e.sub_dags.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_single_bone_with_no_children() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        data.extend_from_slice(&1u32.to_le_bytes()); // entry_count
        data.extend_from_slice(&0u32.to_le_bytes()); // collision_volume_reference
        data.extend_from_slice(&0i32.to_le_bytes()); // entry name_reference
        data.extend_from_slice(&0u32.to_le_bytes()); // entry flags
        data.extend_from_slice(&0i32.to_le_bytes()); // track_reference
        data.extend_from_slice(&0i32.to_le_bytes()); // mesh_or_sprite_reference
        data.extend_from_slice(&0u32.to_le_bytes()); // sub_dag_count

        let mut cursor = Cursor::new(&data);
        let fragment = SkeletonDef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.entries.len(), 1);
        assert!(fragment.children(0).is_empty());
        assert_eq!(fragment.collision_volume_reference, 0);
        assert!(fragment.center_offset.is_none());
        assert!(fragment.bounding_radius.is_none());
    }

    #[test]
    fn it_parses_the_optional_center_offset_and_bounding_radius() {
        let mut data = Vec::new();
        data.extend_from_slice(&(HAS_CENTER_OFFSET | HAS_BOUNDING_RADIUS).to_le_bytes()); // flags
        data.extend_from_slice(&0u32.to_le_bytes()); // entry_count
        data.extend_from_slice(&7u32.to_le_bytes()); // collision_volume_reference
        data.extend_from_slice(&1u32.to_le_bytes()); // center_offset.0
        data.extend_from_slice(&2u32.to_le_bytes()); // center_offset.1
        data.extend_from_slice(&3u32.to_le_bytes()); // center_offset.2
        data.extend_from_slice(&1.5f32.to_le_bytes()); // bounding_radius

        let mut cursor = Cursor::new(&data);
        let fragment = SkeletonDef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.collision_volume_reference, 7);
        assert_eq!(fragment.center_offset, Some((1, 2, 3)));
        assert_eq!(fragment.bounding_radius, Some(1.5));
    }
}

use crate::cursor::{Cursor, UnexpectedEof};

use super::common::Location;
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HAS_CURRENT_ACTION: u32 = 0x1;
const HAS_OFFSET: u32 = 0x2;

/// One level of detail within an [`ActorAction`]: a sprite (skeleton or
/// static mesh, resolved via [`crate::WldDoc::resolve`]) and the distance
/// past which a coarser LOD takes over.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct ActorLevelOfDetail {
    pub sprite_reference: i32,
    pub min_distance: f32,
}

/// A named pose or animation set: one sprite per level of detail.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct ActorAction {
    pub unknown: u32,
    pub levels_of_detail: Vec<ActorLevelOfDetail>,
}

/// `0x14` An actor: the skeleton/mesh sprites available for each of its
/// animation actions, plus any attached collision or sound fragments.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct ActorDef {
    pub name_reference: StringReference,
    pub flags: u32,
    pub fragment_references: Vec<i32>,
    pub bounding_radius: f32,
    pub current_action: Option<u32>,
    pub offset: Option<Location>,
    pub actions: Vec<ActorAction>,
}

impl ActorDef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let action_count = cursor.u32_le()?;
        let fragment_ref_count = cursor.u32_le()?;
        let bounding_radius = cursor.f32_le()?;
        let current_action = if flags & HAS_CURRENT_ACTION != 0 {
            Some(cursor.u32_le()?)
        } else {
            None
        };
        let offset = if flags & HAS_OFFSET != 0 {
            Some(Location::parse(cursor)?)
        } else {
            None
        };
        let mut fragment_references = Vec::with_capacity(fragment_ref_count as usize);
        for _ in 0..fragment_ref_count {
            fragment_references.push(cursor.i32_le()?);
        }

        let mut actions = Vec::with_capacity(action_count as usize);
        for _ in 0..action_count {
            let unknown = cursor.u32_le()?;
            let lod_count = cursor.u32_le()?;
            let mut sprite_references = Vec::with_capacity(lod_count as usize);
            for _ in 0..lod_count {
                sprite_references.push(cursor.i32_le()?);
            }
            let mut min_distances = Vec::with_capacity(lod_count.saturating_sub(1) as usize);
            for _ in 0..lod_count.saturating_sub(1) {
                min_distances.push(cursor.f32_le()?);
            }
            min_distances.push(f32::INFINITY);
            let levels_of_detail = sprite_references
                .into_iter()
                .zip(min_distances)
                .map(|(sprite_reference, min_distance)| ActorLevelOfDetail {
                    sprite_reference,
                    min_distance,
                })
                .collect();
            actions.push(ActorAction {
                unknown,
                levels_of_detail,
            });
        }

        Ok(ActorDef {
            name_reference,
            flags,
            fragment_references,
            bounding_radius,
            current_action,
            offset,
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_single_action_with_one_lod() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        data.extend_from_slice(&1u32.to_le_bytes()); // action_count
        data.extend_from_slice(&0u32.to_le_bytes()); // fragment_ref_count
        data.extend_from_slice(&1.0f32.to_le_bytes()); // bounding_radius
        data.extend_from_slice(&0u32.to_le_bytes()); // action.unknown
        data.extend_from_slice(&1u32.to_le_bytes()); // lod_count
        data.extend_from_slice(&3i32.to_le_bytes()); // sprite_reference

        let mut cursor = Cursor::new(&data);
        let fragment = ActorDef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.actions.len(), 1);
        assert_eq!(fragment.actions[0].levels_of_detail.len(), 1);
        assert_eq!(fragment.actions[0].levels_of_detail[0].sprite_reference, 3);
        assert!(fragment.actions[0].levels_of_detail[0].min_distance.is_infinite());
    }
}

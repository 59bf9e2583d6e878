use crate::cursor::{Cursor, UnexpectedEof};

use super::common::Location;
use super::{ActorDef, FragmentRef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x15` A placed instance of an [`ActorDef`] somewhere in the zone:
/// position, scale, and collision volume.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct ActorPlacement {
    pub name_reference: StringReference,
    pub actor_def_reference: FragmentRef<ActorDef>,
    pub flags: u32,
    pub sphere_reference: i32,
    pub location: Location,
    pub scale_y: f32,
    pub scale_x: f32,
    pub sound_name_reference: i32,
}

impl ActorPlacement {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let actor_def_reference = FragmentRef::parse(cursor)?;
        let flags = cursor.u32_le()?;
        let sphere_reference = cursor.i32_le()?;
        let location = Location::parse(cursor)?;
        let scale_y = cursor.f32_le()?;
        let scale_x = cursor.f32_le()?;
        let sound_name_reference = cursor.i32_le()?;
        Ok(ActorPlacement {
            name_reference,
            actor_def_reference,
            flags,
            sphere_reference,
            location,
            scale_y,
            scale_x,
            sound_name_reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_placement() {
        let mut data = Vec::new();
        data.extend_from_slice(&8i32.to_le_bytes()); // actor_def_reference
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        data.extend_from_slice(&0i32.to_le_bytes()); // sphere_reference
        for _ in 0..6 {
            data.extend_from_slice(&0f32.to_le_bytes()); // x,y,z,rotate_z,rotate_y,rotate_x
        }
        data.extend_from_slice(&0u32.to_le_bytes()); // Location.unknown
        data.extend_from_slice(&1.0f32.to_le_bytes()); // scale_y
        data.extend_from_slice(&1.0f32.to_le_bytes()); // scale_x
        data.extend_from_slice(&0i32.to_le_bytes()); // sound_name_reference

        let mut cursor = Cursor::new(&data);
        let fragment = ActorPlacement::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.actor_def_reference.reference, 8);
        assert_eq!(fragment.scale_x, 1.0);
    }
}

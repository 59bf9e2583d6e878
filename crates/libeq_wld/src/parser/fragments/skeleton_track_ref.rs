use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, SkeletonTrack};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HAS_PARAM1: u32 = 0x1;

/// `0x13` A reference to a [`SkeletonTrack`], one per bone per animation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SkeletonTrackRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<SkeletonTrack>,
    pub flags: u32,
    pub param1: Option<u32>,
}

impl SkeletonTrackRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let reference = FragmentRef::parse(cursor)?;
        let flags = cursor.u32_le()?;
        let param1 = if flags & HAS_PARAM1 != 0 {
            Some(cursor.u32_le()?)
        } else {
            None
        };
        Ok(SkeletonTrackRef {
            name_reference,
            reference,
            flags,
            param1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_reference_without_the_optional_param() {
        let data = [7i32.to_le_bytes(), 0u32.to_le_bytes()].concat();
        let mut cursor = Cursor::new(&data);
        let fragment = SkeletonTrackRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.reference.reference, 7);
        assert_eq!(fragment.param1, None);
    }

    #[test]
    fn it_parses_the_optional_param_when_flagged() {
        let data = [
            7i32.to_le_bytes().to_vec(),
            HAS_PARAM1.to_le_bytes().to_vec(),
            99u32.to_le_bytes().to_vec(),
        ]
        .concat();
        let mut cursor = Cursor::new(&data);
        let fragment = SkeletonTrackRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.param1, Some(99));
    }
}

use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, SkeletonDef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x11` A reference to a [`SkeletonDef`], attaching it to an actor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SkeletonRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<SkeletonDef>,
    pub flags: u32,
}

impl SkeletonRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(SkeletonRef {
            name_reference,
            reference: FragmentRef::parse(cursor)?,
            flags: cursor.u32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_reference() {
        let data = [6i32.to_le_bytes(), 0u32.to_le_bytes()].concat();
        let mut cursor = Cursor::new(&data);
        let fragment = SkeletonRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.reference.reference, 6);
    }
}

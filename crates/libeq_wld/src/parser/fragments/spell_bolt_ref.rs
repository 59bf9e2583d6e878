use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, SpellBoltDef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x27` A reference to a [`SpellBoltDef`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SpellBoltRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<SpellBoltDef>,
    pub flags: u32,
}

impl SpellBoltRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(SpellBoltRef {
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
        let data = [10i32.to_le_bytes(), 0u32.to_le_bytes()].concat();
        let mut cursor = Cursor::new(&data);
        let fragment = SpellBoltRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.reference.reference, 10);
    }
}

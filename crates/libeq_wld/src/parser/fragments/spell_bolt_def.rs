use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, TextureFileListRef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x26` A billboard sprite animation used for spell bolt effects: a
/// material (for its texture frames) plus the on-screen size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SpellBoltDef {
    pub name_reference: StringReference,
    pub flags: u32,
    pub texture_reference: FragmentRef<TextureFileListRef>,
    pub width: f32,
    pub height: f32,
}

impl SpellBoltDef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(SpellBoltDef {
            name_reference,
            flags: cursor.u32_le()?,
            texture_reference: FragmentRef::parse(cursor)?,
            width: cursor.f32_le()?,
            height: cursor.f32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_dimensions() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&9i32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());

        let mut cursor = Cursor::new(&data);
        let fragment = SpellBoltDef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.width, 2.0);
    }
}

use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, TextureFileList};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x05` A reference to a [`TextureFileList`], with its own flags field
/// (material-specific rendering hints layered over the shared texture).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct TextureFileListRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<TextureFileList>,
    pub flags: u32,
}

impl TextureFileListRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(TextureFileListRef {
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
    fn it_parses_a_reference_and_its_flags() {
        let data = [2u8, 0, 0, 0, 0xAA, 0, 0, 0];
        let mut cursor = Cursor::new(&data);
        let fragment = TextureFileListRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.reference.reference, 2);
        assert_eq!(fragment.flags, 0xAA);
    }
}

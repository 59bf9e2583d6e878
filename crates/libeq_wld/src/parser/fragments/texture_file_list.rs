use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, TextureFile};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x04` A named list of [`TextureFile`] references, one per animation
/// frame or LOD variant sharing a name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct TextureFileList {
    pub name_reference: StringReference,
    pub flags: u32,
    pub frame_references: Vec<FragmentRef<TextureFile>>,
}

impl TextureFileList {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let frame_count = cursor.u32_le()?;
        let mut frame_references = Vec::with_capacity(frame_count as usize);
        for _ in 0..frame_count {
            frame_references.push(FragmentRef::parse(cursor)?);
        }
        Ok(TextureFileList {
            name_reference,
            flags,
            frame_references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_single_frame_list() {
        let data = [0u8, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0];
        let mut cursor = Cursor::new(&data);
        let fragment = TextureFileList::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.frame_references.len(), 1);
        assert_eq!(fragment.frame_references[0].reference, 1);
    }
}

use crate::cursor::{Cursor, UnexpectedEof};

use super::common::EncodedFilename;
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ANIMATED: u32 = 0x8;

/// `0x03` One or more bitmap filenames backing a texture. More than one
/// filename means the texture is an animation, one frame per name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct TextureFile {
    pub name_reference: StringReference,
    pub flags: u32,
    pub current_frame_ms: Option<u32>,
    pub file_names: Vec<EncodedFilename>,
}

impl TextureFile {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let name_count = cursor.u32_le()?;
        let current_frame_ms = if flags & ANIMATED != 0 {
            Some(cursor.u32_le()?)
        } else {
            None
        };
        let mut file_names = Vec::with_capacity(name_count as usize);
        for _ in 0..name_count {
            file_names.push(EncodedFilename::parse(cursor)?);
        }
        Ok(TextureFile {
            name_reference,
            flags,
            current_frame_ms,
            file_names,
        })
    }

    pub fn is_animated(&self) -> bool {
        self.flags & ANIMATED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip([0x95u8, 0x3a, 0xc5, 0x2a, 0x95, 0x7a, 0x95, 0x6a].iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }

    #[test]
    fn it_parses_a_single_static_texture() {
        let encoded = name(b"FOO.BMP\0");
        let mut data = vec![0, 0, 0, 0, 1, 0, 0, 0];
        data.extend_from_slice(&(encoded.len() as u16).to_le_bytes());
        data.extend_from_slice(&encoded);

        let mut cursor = Cursor::new(&data);
        let fragment = TextureFile::parse(StringReference::new(0), &mut cursor).unwrap();

        assert!(!fragment.is_animated());
        assert_eq!(fragment.file_names.len(), 1);
        assert_eq!(fragment.file_names[0].file_name, "FOO.BMP");
    }
}

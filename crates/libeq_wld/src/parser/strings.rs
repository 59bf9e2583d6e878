use encoding_rs::WINDOWS_1252;
use nom::combinator::map;
use nom::number::complete::le_i32;
use nom::IResult;

use crate::cursor::{Cursor, UnexpectedEof};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A signed reference into either the string table (negative) or the
/// fragment list (positive); `0` means absent. Resolving the sign is the
/// fragment graph's job (see [`crate::WldDoc::get`]); this type only carries
/// the raw value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StringReference(pub i32);

impl StringReference {
    pub fn new(idx: i32) -> Self {
        Self(idx)
    }

    pub fn parse(cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(Self::new(cursor.i32_le()?))
    }

    pub fn parse_nom(input: &[u8]) -> IResult<&[u8], Self> {
        map(le_i32, Self::new)(input)
    }
}

/// The unmasked (but not yet latin-1 decoded) string table bytes. Kept raw
/// rather than pre-split on NUL: a reference's offset can land mid-string
/// (the format reuses a longer string's suffix), so lookups have to be able
/// to start decoding from any byte, not just a segment boundary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct StringHash(Vec<u8>);

const XOR_KEY: [u8; 8] = [0x95, 0x3a, 0xc5, 0x2a, 0x95, 0x7a, 0x95, 0x6a];

pub fn decode_string(encoded_data: &[u8]) -> String {
    let data: Vec<u8> = encoded_data
        .iter()
        .zip(XOR_KEY.iter().cycle())
        .map(|(encoded_char, key_char)| encoded_char ^ key_char)
        .collect();
    let (cow, _, _) = WINDOWS_1252.decode(&data);
    cow.into_owned()
}

impl StringHash {
    pub fn new(encoded_data: &[u8]) -> StringHash {
        let unmasked: Vec<u8> = encoded_data
            .iter()
            .zip(XOR_KEY.iter().cycle())
            .map(|(encoded_char, key_char)| encoded_char ^ key_char)
            .collect();
        StringHash(unmasked)
    }

    /// The longest prefix starting at `offset` up to (but not including) the
    /// next NUL. Out-of-range offsets yield `None`; an empty table has no
    /// valid offsets at all.
    pub fn lookup(&self, offset: usize) -> Option<String> {
        if offset >= self.0.len() {
            return None;
        }
        let tail = &self.0[offset..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        let (cow, _, _) = WINDOWS_1252.decode(&tail[..end]);
        Some(cow.into_owned())
    }

    /// Look up a string by its signed reference using the `-p` (2012)
    /// lineage: a string reference's offset is `reference.abs()`.
    pub fn get(&self, string_reference: StringReference) -> Option<String> {
        self.lookup(string_reference.0.unsigned_abs() as usize)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_unmasks_and_splits_on_nul() {
        // Each byte XORed with the key spells "AB\0" once unmasked.
        let data = [0x95 ^ b'A', 0x3a ^ b'B', 0xc5 ^ 0];

        let hash = StringHash::new(&data);

        assert_eq!(hash.lookup(0), Some("AB".to_string()));
        assert_eq!(hash.lookup(1), Some("B".to_string()));
        assert_eq!(hash.lookup(2), Some("".to_string()));
        assert_eq!(hash.lookup(3), None);
    }

    #[test]
    fn signed_reference_uses_the_minus_p_lineage() {
        let data = [0x95 ^ b'A', 0x3a ^ b'B', 0xc5 ^ 0];
        let hash = StringHash::new(&data);

        assert_eq!(hash.get(StringReference::new(-1)), Some("B".to_string()));
        assert_eq!(hash.get(StringReference::new(0)), Some("AB".to_string()));
    }

    #[test]
    fn empty_table_has_no_strings() {
        let hash = StringHash::new(&[]);
        assert!(hash.is_empty());
        assert_eq!(hash.get(StringReference::new(0)), None);
    }
}

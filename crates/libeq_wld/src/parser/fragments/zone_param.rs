use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x16` A small fixed-size record of zone-wide parameters whose
/// individual fields were never reverse engineered beyond their byte
/// offsets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct ZoneParam {
    pub name_reference: StringReference,
    pub flags: u32,
    pub data: Vec<u8>,
}

impl ZoneParam {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let data = cursor.take_rest().to_vec();
        Ok(ZoneParam {
            name_reference,
            flags,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keeps_the_unparsed_tail_as_opaque_bytes() {
        let data = [1u8, 0, 0, 0, 0xAA, 0xBB];
        let mut cursor = Cursor::new(&data);
        let fragment = ZoneParam::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.flags, 1);
        assert_eq!(fragment.data, vec![0xAA, 0xBB]);
    }
}

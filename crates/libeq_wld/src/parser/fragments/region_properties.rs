use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::{strings::decode_string, StringReference};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HAS_REGION_TYPE: u32 = 0x01;
const HAS_USER_DATA: u32 = 0x02;

/// `0x29` Gameplay metadata attached to a BSP region: water/lava/PvP type
/// tags and an optional free-form, XOR-masked user-data string.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct RegionProperties {
    pub name_reference: StringReference,
    pub flags: u32,
    pub region_count: u32,
    pub regions: Vec<u32>,
    pub region_type: Option<u32>,
    pub user_data: Option<String>,
}

impl RegionProperties {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let region_count = cursor.u32_le()?;
        let mut regions = Vec::with_capacity(region_count as usize);
        for _ in 0..region_count {
            regions.push(cursor.u32_le()?);
        }
        let region_type = if flags & HAS_REGION_TYPE != 0 {
            Some(cursor.u32_le()?)
        } else {
            None
        };
        let user_data = if flags & HAS_USER_DATA != 0 {
            let len = cursor.u32_le()?;
            let encoded = cursor.take(len as usize)?;
            Some(decode_string(encoded).trim_end_matches('\0').to_string())
        } else {
            None
        };
        Ok(RegionProperties {
            name_reference,
            flags,
            region_count,
            regions,
            region_type,
            user_data,
        })
    }
}

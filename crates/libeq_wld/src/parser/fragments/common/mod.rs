use nom::multi::length_data;
use nom::number::complete::{le_f32, le_u16, le_u32};
use nom::sequence::tuple;
use nom::IResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A length-prefixed, XOR-masked filename, as embedded in texture and
/// palette-file records.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct EncodedFilename {
    pub file_name: String,
}

impl EncodedFilename {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, encoded) = length_data(le_u16)(input)?;
        let file_name = super::super::strings::decode_string(encoded)
            .trim_end_matches('\0')
            .to_string();
        Ok((i, EncodedFilename { file_name }))
    }
}

/// A placement: position plus Z/Y/X rotation, each in units of
/// `degrees * (512 / 360)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotate_z: f32,
    pub rotate_y: f32,
    pub rotate_x: f32,
    pub unknown: u32,
}

impl Location {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, (x, y, z, rotate_z, rotate_y, rotate_x, unknown)) =
            tuple((le_f32, le_f32, le_f32, le_f32, le_f32, le_f32, le_u32))(input)?;
        Ok((
            i,
            Location {
                x,
                y,
                z,
                rotate_z,
                rotate_y,
                rotate_x,
                unknown,
            },
        ))
    }
}

use nom::bytes::complete::take;
use nom::number::complete::le_u32;
use nom::IResult;
use nom::Parser;

/// Trailing `(magic, date)` pair some archives carry after the index. Not
/// every archive has one; its absence is not an error.
#[derive(Debug, Default, PartialEq)]
pub struct Footer {
    pub magic: Vec<u8>,
    pub date: u32,
}

impl Footer {
    pub const MAGIC: [u8; 5] = *b"STEVE";

    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, magic) = take(5usize).parse(input)?;
        let (i, date) = le_u32(i)?;

        Ok((
            i,
            Footer {
                magic: Vec::from(magic),
                date,
            },
        ))
    }
}

use nom::number::complete::le_u32;
use nom::IResult;

#[derive(Debug, Default, PartialEq)]
pub struct Header {
    pub index_offset: u32,
    pub magic_number: u32,
    pub version: u32,
}

impl Header {
    pub const MAGIC_NUMBER: u32 = u32::from_le_bytes(*b"PFS ");
    pub const VERSION: u32 = 0x00020000;
    pub const SIZE: usize = 12;

    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, index_offset) = le_u32(input)?;
        let (i, magic_number) = le_u32(i)?;
        let (i, version) = le_u32(i)?;

        Ok((
            i,
            Header {
                index_offset,
                magic_number,
                version,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses() {
        let data = [
            0x30, 0x00, 0x00, 0x00, // index_offset
            b'P', b'F', b'S', b' ', // magic_number
            0x00, 0x00, 0x00, 0x00, // version
        ];

        let (_, header) = Header::parse(&data).unwrap();

        assert_eq!(header.index_offset, 0x30);
        assert_eq!(header.magic_number, Header::MAGIC_NUMBER);
        assert_eq!(header.version, 0);
    }

    #[test]
    fn it_fails_on_short_input() {
        assert!(Header::parse(&[0x00, 0x00]).is_err());
    }
}

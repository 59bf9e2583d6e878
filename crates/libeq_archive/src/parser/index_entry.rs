use nom::number::complete::le_u32;
use nom::IResult;

/// Sentinel CRC marking the directory-listing entry rather than a real file.
pub const DIRECTORY_CRC: u32 = 0x61580AC9;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub filename_crc: u32,
    pub data_offset: u32,
    pub uncompressed_size: u32,
}

impl IndexEntry {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, filename_crc) = le_u32(input)?;
        let (i, data_offset) = le_u32(i)?;
        let (i, uncompressed_size) = le_u32(i)?;

        Ok((
            i,
            IndexEntry {
                uncompressed_size,
                filename_crc,
                data_offset,
            },
        ))
    }

    pub fn is_directory(&self) -> bool {
        self.filename_crc == DIRECTORY_CRC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses() {
        let data = [
            0xc9, 0x0a, 0x58, 0x61, // filename_crc (directory sentinel)
            0xe5, 0x25, 0x00, 0x00, // data_offset
            0x38, 0x44, 0x00, 0x00, // uncompressed_size
        ];

        let (_, entry) = IndexEntry::parse(&data).unwrap();

        assert_eq!(entry.filename_crc, DIRECTORY_CRC);
        assert_eq!(entry.data_offset, 0x25e5);
        assert_eq!(entry.uncompressed_size, 0x4438);
        assert!(entry.is_directory());
    }
}

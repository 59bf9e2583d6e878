use nom::bytes::complete::take;
use nom::number::complete::le_u32;
use nom::IResult;
use nom::Parser;

/// One deflate chunk belonging to an entry's data stream.
///
/// Entries are split into chunks; each chunk independently inflates to
/// `uncompressed_size` bytes. A reader concatenates the inflated chunks, in
/// file order, to reconstruct an entry's full contents.
#[derive(Debug, Default)]
pub struct Block {
    pub uncompressed_size: u32,
    pub compressed_data: Vec<u8>,
}

impl Block {
    pub const HEADER_SIZE: usize = 8;

    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, compressed_size) = le_u32(input)?;
        let (i, uncompressed_size) = le_u32(i)?;
        let (i, compressed_data) = take(compressed_size).parse(i)?;

        Ok((
            i,
            Self {
                uncompressed_size,
                compressed_data: Vec::from(compressed_data),
            },
        ))
    }

    /// Total size of this chunk on disk, header included.
    pub fn size(&self) -> usize {
        self.compressed_data.len() + Self::HEADER_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses() {
        let data = [
            0x04, 0x00, 0x00, 0x00, // compressed_size
            0x00, 0x20, 0x00, 0x00, // uncompressed_size
            0xde, 0xad, 0xbe, 0xef, // compressed_data
        ];

        let (remaining, block) = Block::parse(&data).unwrap();

        assert_eq!(block.uncompressed_size, 0x2000);
        assert_eq!(block.compressed_data, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(block.size(), 12);
        assert!(remaining.is_empty());
    }

    #[test]
    fn it_fails_on_truncated_data() {
        let data = [0x04, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0xde];
        assert!(Block::parse(&data).is_err());
    }
}

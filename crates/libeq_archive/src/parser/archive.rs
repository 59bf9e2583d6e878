use std::collections::BTreeMap;

use nom::bytes::complete::take;
use nom::multi::{count, fold_many0};
use nom::number::complete::le_u32;
use nom::IResult;

use super::{Block, Footer, Header, IndexEntry};

/// On-disk layout:
/// ```text
/// ---------------------
/// |      Header       |
/// ---------------------
/// |     File Data     |
/// ---------------------
/// |      Index        |
/// ---------------------
/// |  Footer (optional) |
/// ---------------------
/// ```
#[derive(Debug)]
pub struct ArchiveData {
    pub header: Header,
    /// Deflate chunks keyed by their byte offset into the data region, so
    /// that an [`IndexEntry::data_offset`] is a direct lookup key.
    pub blocks: BTreeMap<usize, Block>,
    pub index_entries: Vec<IndexEntry>,
    /// Not every archive carries a footer (e.g. `global_chr1.s3d` does not).
    pub footer: Option<Footer>,
}

impl ArchiveData {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, header) = Header::parse(input)?;
        let (i, all_block_data) = take(header.index_offset - Header::SIZE as u32)(i)?;
        let (i, index_entry_count) = le_u32(i)?;
        let (i, index_entries) = count(IndexEntry::parse, index_entry_count as usize)(i)?;

        let (i, footer) = if !i.is_empty() {
            Footer::parse(i).map(|(i, f)| (i, Some(f)))?
        } else {
            (i, None)
        };

        let (_, (_, blocks)) = fold_many0(
            Block::parse,
            || (Header::SIZE, BTreeMap::new()),
            |(offset, mut blocks), block| {
                let next_offset = offset + block.size();
                blocks.insert(offset, block);
                (next_offset, blocks)
            },
        )(all_block_data)?;

        Ok((
            i,
            ArchiveData {
                header,
                blocks,
                index_entries,
                footer,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_header_blocks_index_and_missing_footer() {
        // header: index_offset = 12 (Header::SIZE) + 17 (one block) = 29
        let header: &[u8] = &[0x1d, 0x00, 0x00, 0x00, b'P', b'F', b'S', b' ', 0x00, 0x00, 0x00, 0x00];
        // one block: compressed_size=9, uncompressed_size=4, 9 bytes of data (header 8 + data 9 = 17)
        let block: &[u8] = &[
            0x09, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xde, 0xad, 0xbe, 0xef, 0x00, 0x00,
            0x00, 0x00, 0x00,
        ];
        let entry_count: &[u8] = &[0x01, 0x00, 0x00, 0x00];
        // directory-sentinel index entry pointing at the block above
        let index_entry: &[u8] = &[
            0xc9, 0x0a, 0x58, 0x61, 0x0c, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        ];
        let data: Vec<u8> = [header, block, entry_count, index_entry].concat();

        let (remaining, archive) = ArchiveData::parse(&data).unwrap();

        assert_eq!(archive.header.index_offset, 0x1d);
        assert_eq!(archive.index_entries.len(), 1);
        assert!(archive.footer.is_none());
        assert_eq!(
            archive.blocks.values().map(|b| b.size()).sum::<usize>(),
            (archive.header.index_offset - Header::SIZE as u32) as usize
        );
        assert!(remaining.is_empty());
    }
}

//! Reader for the EverQuest PFS archive container format (`.s3d`/`.eqg`-era
//! files share this layout; the extension on disk doesn't matter to this
//! crate).
//!
//! An archive is an ordered sequence of entries, each made of one or more
//! deflate chunks, plus a directory entry (identified by a sentinel CRC)
//! holding the file-name list. This crate only reads archives; there is no
//! writer.
//!
//! ```no_run
//! let archive = libeq_archive::Archive::open("gfaydark.s3d")?;
//! for (name, _entry) in archive.files() {
//!     let data = archive.open(name)?;
//!     println!("{name}: {} bytes", data.len());
//! }
//! # Ok::<(), libeq_archive::Error>(())
//! ```

mod parser;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;

pub use parser::{Block, Directory, Footer, Header, IndexEntry};
use parser::ArchiveData;

/// The sentinel CRC used by the directory-listing entry.
pub const DIRECTORY_CRC: u32 = 0x61580AC9;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not a PFS archive (bad magic number)")]
    NotAnArchive,
    #[error("malformed archive: {0}")]
    Parse(String),
    #[error("entry's inflated chunks produced {produced} bytes, expected {expected}")]
    CorruptChunk { produced: u32, expected: u32 },
    #[error("'{0}' not found in archive")]
    NotFound(String),
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(e: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::Parse(e.to_string())
    }
}

/// An open archive: its index plus the raw deflate chunks backing every
/// entry, keyed by the byte offset [`IndexEntry::data_offset`] points at.
pub struct Archive {
    index_entries: Vec<IndexEntry>,
    blocks: BTreeMap<usize, Block>,
    filenames: Vec<String>,
    footer: Option<Footer>,
}

impl Archive {
    /// Read and parse an archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("opening archive {}", path.display());
        let buffer = fs::read(path)?;
        Self::from_bytes(&buffer)
    }

    /// Parse an archive already resident in memory.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, Error> {
        let (_, data) = ArchiveData::parse(buffer)?;

        if data.header.magic_number != Header::MAGIC_NUMBER {
            return Err(Error::NotAnArchive);
        }

        let ArchiveData {
            mut index_entries,
            blocks,
            footer,
            ..
        } = data;

        index_entries.sort_by_key(|e| e.data_offset);

        let directory_entry = index_entries
            .iter()
            .find(|e| e.is_directory())
            .ok_or_else(|| Error::Parse("archive has no directory entry".to_string()))?;
        let directory_data = Self::unpack_entry(directory_entry, &blocks)?;
        let (_, directory) = Directory::parse(&directory_data)?;

        Ok(Archive {
            index_entries,
            blocks,
            filenames: directory.filenames,
            footer,
        })
    }

    /// The trailing `(magic, date)` footer, if this archive carries one.
    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    /// The directory-sorted, non-sentinel entries paired with their names.
    pub fn files(&self) -> Vec<(&str, &IndexEntry)> {
        self.index_entries
            .iter()
            .filter(|e| !e.is_directory())
            .zip(self.filenames.iter())
            .map(|(entry, name)| (name.as_str(), entry))
            .collect()
    }

    /// Inflate a named entry's contents.
    pub fn open(&self, name: &str) -> Result<Vec<u8>, Error> {
        let entry = self
            .files()
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        self.unpack(entry)
    }

    /// Inflate an entry's chunks, concatenated in file order.
    pub fn unpack(&self, entry: &IndexEntry) -> Result<Vec<u8>, Error> {
        Self::unpack_entry(entry, &self.blocks)
    }

    fn unpack_entry(entry: &IndexEntry, blocks: &BTreeMap<usize, Block>) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
        let mut produced = 0u32;

        for (_, block) in blocks.range(entry.data_offset as usize..) {
            if produced >= entry.uncompressed_size {
                break;
            }
            let mut buf = Vec::new();
            ZlibDecoder::new(&block.compressed_data[..])
                .read_to_end(&mut buf)
                .map_err(Error::Io)?;
            produced += buf.len() as u32;
            out.extend(buf);
        }

        if produced != entry.uncompressed_size {
            return Err(Error::CorruptChunk {
                produced,
                expected: entry.uncompressed_size,
            });
        }

        Ok(out)
    }
}

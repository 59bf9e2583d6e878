mod error;
pub mod fragments;
mod strings;

use crate::cursor::Cursor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use error::WldError;
pub use fragments::*;
pub use strings::{StringHash, StringReference};

pub type WResult<T> = Result<T, WldError>;

const WLD_MAGIC: u32 = 0x54503d02;

/// A parsed WLD scene-graph document: its string table and the flat,
/// backward-referencing list of fragments it declares.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug)]
pub struct WldDoc {
    header: WldHeader,
    strings: StringHash,
    fragments: Vec<FragmentType>,
}

impl WldDoc {
    pub fn parse(input: &[u8]) -> WResult<WldDoc> {
        let mut cursor = Cursor::new(input);
        let header = WldHeader::parse(&mut cursor).map_err(WldError::Header)?;
        let string_hash_data = cursor
            .take(header.string_hash_size as usize)
            .map_err(WldError::Header)?;
        let strings = StringHash::new(string_hash_data);

        // The header's fragment count is one short of the true record
        // count; read fragment_count+1 records, stopping early (rather
        // than failing) if the file runs out before the extra one shows up.
        let mut fragments = Vec::with_capacity(header.fragment_count as usize + 1);
        for index in 0..=header.fragment_count as usize {
            if cursor.remaining() < FragmentHeader::WIRE_SIZE {
                break;
            }
            let fragment_header = FragmentHeader::parse(&mut cursor).map_err(WldError::Header)?;
            fragments.push(fragment_header.parse_body(index)?);
        }

        Ok(WldDoc {
            header,
            strings,
            fragments,
        })
    }

    /// Look up a string by its signed reference (see [`StringHash::get`]).
    pub fn get_string(&self, string_reference: StringReference) -> Option<String> {
        self.strings.get(string_reference)
    }

    /// Resolve a raw signed reference field (as found in e.g. a mesh's
    /// `animated_vertices_reference`) against the `-p` (2012) lineage:
    /// negative resolves through the string table, positive through the
    /// fragment list, zero is always absent.
    pub fn resolve(&self, reference: i32) -> Resolved<'_> {
        use std::cmp::Ordering;
        match reference.cmp(&0) {
            Ordering::Less => match self.strings.get(StringReference::new(reference)) {
                Some(s) => Resolved::String(s),
                None => Resolved::Absent,
            },
            Ordering::Greater => match self.at((reference - 1) as usize) {
                Some(f) => Resolved::Fragment(f),
                None => Resolved::Absent,
            },
            Ordering::Equal => Resolved::Absent,
        }
    }

    /// Get a fragment given a typed reference to it.
    pub fn get<T: 'static + Fragment>(&self, fragment_ref: &FragmentRef<T>) -> Option<&T> {
        if fragment_ref.reference <= 0 {
            return None;
        }
        T::downcast_ref(self.fragments.get((fragment_ref.reference - 1) as usize)?)
    }

    /// Get a fragment given its 0-based index into the document.
    pub fn at(&self, idx: usize) -> Option<&FragmentType> {
        self.fragments.get(idx)
    }

    /// Iterate over all fragments of a specific type.
    pub fn fragment_iter<T: 'static + Fragment>(&self) -> impl Iterator<Item = &T> + '_ {
        self.fragments.iter().filter_map(|f| T::downcast_ref(f))
    }

    /// Iterate over every fragment in the document, in file order.
    pub fn iter(&self) -> impl Iterator<Item = &FragmentType> + '_ {
        self.fragments.iter()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn string_hash(&self) -> &StringHash {
        &self.strings
    }

    pub fn header(&self) -> &WldHeader {
        &self.header
    }
}

/// The result of resolving a signed reference field.
#[derive(Debug)]
pub enum Resolved<'a> {
    String(String),
    Fragment(&'a FragmentType),
    Absent,
}

/// The fixed-size preamble present at the start of every `.wld` file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct WldHeader {
    pub magic: u32,
    /// Two known versions exist: the old format (`0x00015500`) and the
    /// newer, `-p`-era format (`0x1000C800`).
    pub version: u32,
    pub fragment_count: u32,
    pub region_count: u32,
    pub max_object_bytes: u32,
    pub string_hash_size: u32,
    pub string_count: u32,
}

impl WldHeader {
    pub fn parse(cursor: &mut Cursor) -> Result<Self, crate::cursor::UnexpectedEof> {
        let header = WldHeader {
            magic: cursor.u32_le()?,
            version: cursor.u32_le()?,
            fragment_count: cursor.u32_le()?,
            region_count: cursor.u32_le()?,
            max_object_bytes: cursor.u32_le()?,
            string_hash_size: cursor.u32_le()?,
            string_count: cursor.u32_le()?,
        };
        if header.magic != WLD_MAGIC {
            log::warn!("WLD magic {:#x} does not match the known signature", header.magic);
        }
        Ok(header)
    }
}

/// The header shared by every fragment record: its total size, type tag,
/// and name reference, followed by the type-specific body.
#[derive(Debug, Clone, Copy)]
pub struct FragmentHeader<'a> {
    pub size: u32,
    pub fragment_type: u32,
    pub name_reference: i32,
    pub field_data: &'a [u8],
}

impl<'a> FragmentHeader<'a> {
    /// `size:u32, type:u32, name_reference:i32` — the fixed portion read
    /// before the type-specific body.
    const WIRE_SIZE: usize = 12;

    pub fn parse(cursor: &mut Cursor<'a>) -> Result<Self, crate::cursor::UnexpectedEof> {
        let size = cursor.u32_le()?;
        let fragment_type = cursor.u32_le()?;
        let name_start = cursor.position();
        let name_reference = cursor.i32_le()?;
        let consumed = cursor.position() - name_start;
        let body_len = (size as usize)
            .checked_sub(consumed)
            .ok_or(crate::cursor::UnexpectedEof {
                requested: consumed,
                remaining: size as usize,
            })?;
        let field_data = cursor.take(body_len)?;
        Ok(FragmentHeader {
            size,
            fragment_type,
            name_reference,
            field_data,
        })
    }

    fn parse_body(self, index: usize) -> WResult<FragmentType> {
        fragments::decode(self.fragment_type, self.name_reference, self.field_data).map_err(|source| {
            WldError::Fragment {
                index,
                fragment_type: self.fragment_type,
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(fragment_count: u32, string_hash_size: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&WLD_MAGIC.to_le_bytes());
        data.extend_from_slice(&0x1000C800u32.to_le_bytes());
        data.extend_from_slice(&fragment_count.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&string_hash_size.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data
    }

    #[test]
    fn it_parses_a_document_with_no_fragments() {
        let mut data = header_bytes(0, 1);
        data.push(0); // string hash: a single masked NUL byte
        let doc = WldDoc::parse(&data).unwrap();
        assert_eq!(doc.fragment_count(), 0);
        assert_eq!(doc.get_string(StringReference::new(0)), Some("".to_string()));
    }

    #[test]
    fn it_decodes_unknown_fragment_types_as_opaque_records() {
        let mut data = header_bytes(1, 0);
        // fragment: size=8 (type + name_ref + 4-byte opaque body), type=0xEE
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&0xEEu32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&[0xAA; 4]);

        let doc = WldDoc::parse(&data).unwrap();
        assert_eq!(doc.fragment_count(), 1);
        match doc.at(0).unwrap() {
            FragmentType::Unknown(0xEE, bytes) => assert_eq!(bytes, &[0xAA; 4]),
            other => panic!("expected an opaque Unknown fragment, got {:?}", other),
        }
    }

    /// The header's `fragment_count` is one short of the real record
    /// count: a header declaring `1` with two records on the wire yields
    /// two decoded fragments, not one.
    #[test]
    fn it_reads_one_more_fragment_than_the_header_declares() {
        let mut data = header_bytes(1, 0);
        for _ in 0..2 {
            data.extend_from_slice(&8u32.to_le_bytes());
            data.extend_from_slice(&0xEEu32.to_le_bytes());
            data.extend_from_slice(&0i32.to_le_bytes());
            data.extend_from_slice(&[0xAA; 4]);
        }

        let doc = WldDoc::parse(&data).unwrap();
        assert_eq!(doc.fragment_count(), 2);
    }

    #[test]
    fn it_fails_with_a_short_fragment_body() {
        let mut data = header_bytes(1, 0);
        // Material (0x30) declared with a body far shorter than its schema.
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0x30u32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());

        assert!(WldDoc::parse(&data).is_err());
    }
}

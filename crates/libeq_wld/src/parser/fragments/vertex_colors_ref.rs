use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, VertexColors};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x33` A reference to a [`VertexColors`] track, attached to a mesh.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct VertexColorsRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<VertexColors>,
    pub flags: u32,
}

impl VertexColorsRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(VertexColorsRef {
            name_reference,
            reference: FragmentRef::parse(cursor)?,
            flags: cursor.u32_le()?,
        })
    }
}

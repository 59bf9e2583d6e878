use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, Material};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x31` The ordered set of [`Material`]s a [`super::Mesh`] indexes into
/// by material group.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct MaterialPalette {
    pub name_reference: StringReference,
    pub flags: u32,
    pub material_references: Vec<FragmentRef<Material>>,
}

impl MaterialPalette {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let material_count = cursor.u32_le()?;
        let mut material_references = Vec::with_capacity(material_count as usize);
        for _ in 0..material_count {
            material_references.push(FragmentRef::parse(cursor)?);
        }
        Ok(MaterialPalette {
            name_reference,
            flags,
            material_references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_an_empty_palette() {
        let data = [0u8, 0, 0, 0, 0, 0, 0, 0];
        let mut cursor = Cursor::new(&data);
        let fragment = MaterialPalette::parse(StringReference::new(0), &mut cursor).unwrap();
        assert!(fragment.material_references.is_empty());
    }
}

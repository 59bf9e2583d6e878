use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, Mesh};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x2d` A reference to a [`Mesh`], attaching it to an actor's skeleton
/// piece or to a static placement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct MeshRef {
    pub name_reference: StringReference,
    pub reference: FragmentRef<Mesh>,
    pub params: u32,
}

impl MeshRef {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(MeshRef {
            name_reference,
            reference: FragmentRef::parse(cursor)?,
            params: cursor.u32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_reference_and_params() {
        let data = [5i32.to_le_bytes(), 0u32.to_le_bytes()].concat();
        let mut cursor = Cursor::new(&data);
        let fragment = MeshRef::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.reference.reference, 5);
        assert_eq!(fragment.params, 0);
    }
}

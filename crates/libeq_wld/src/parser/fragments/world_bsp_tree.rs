use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One BSP split plane. Interior nodes have a non-zero `normal`;
/// leaves have `region == 0` for the normal and a positive
/// `region_reference` pointing at the owning [`super::BspRegionVis`]
/// (via [`crate::WldDoc::resolve`]).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct BspTreeNode {
    pub normal: (f32, f32, f32),
    pub split_distance: f32,
    pub region_reference: i32,
    pub left_node: u32,
    pub right_node: u32,
}

impl BspTreeNode {
    pub fn is_leaf(&self) -> bool {
        self.left_node == 0 && self.right_node == 0
    }
}

/// `0x21` The BSP tree partitioning the whole zone into convex regions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct BspTree {
    pub name_reference: StringReference,
    pub nodes: Vec<BspTreeNode>,
}

impl BspTree {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let node_count = cursor.u32_le()?;
        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            nodes.push(BspTreeNode {
                normal: (cursor.f32_le()?, cursor.f32_le()?, cursor.f32_le()?),
                split_distance: cursor.f32_le()?,
                region_reference: cursor.i32_le()?,
                left_node: cursor.u32_le()?,
                right_node: cursor.u32_le()?,
            });
        }
        Ok(BspTree {
            name_reference,
            nodes,
        })
    }

    pub fn root(&self) -> Option<&BspTreeNode> {
        self.nodes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_single_leaf_node() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0f32.to_le_bytes());
        data.extend_from_slice(&0f32.to_le_bytes());
        data.extend_from_slice(&0f32.to_le_bytes());
        data.extend_from_slice(&0f32.to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut cursor = Cursor::new(&data);
        let fragment = BspTree::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.nodes.len(), 1);
        assert!(fragment.root().unwrap().is_leaf());
    }
}

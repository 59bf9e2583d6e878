use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `0x32` Per-vertex RGBA color data for every frame of a mesh's color
/// animation (used for things like lava glow or torch flicker).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct VertexColors {
    pub name_reference: StringReference,
    pub vertex_count: u32,
    pub frame_count: u32,
    pub unknown: u32,
    /// `frame_count` rows of `vertex_count` RGBA colors each.
    pub frames: Vec<Vec<u32>>,
}

impl VertexColors {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let vertex_count = cursor.u32_le()?;
        let frame_count = cursor.u32_le()?;
        let unknown = cursor.u32_le()?;
        let mut frames = Vec::with_capacity(frame_count as usize);
        for _ in 0..frame_count {
            let mut colors = Vec::with_capacity(vertex_count as usize);
            for _ in 0..vertex_count {
                colors.push(cursor.u32_le()?);
            }
            frames.push(colors);
        }
        Ok(VertexColors {
            name_reference,
            vertex_count,
            frame_count,
            unknown,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_one_frame_of_two_vertices() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0xff0000ffu32.to_le_bytes());
        data.extend_from_slice(&0x00ff00ffu32.to_le_bytes());

        let mut cursor = Cursor::new(&data);
        let fragment = VertexColors::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(fragment.frames.len(), 1);
        assert_eq!(fragment.frames[0], vec![0xff0000ff, 0x00ff00ff]);
    }
}

use crate::cursor::{Cursor, UnexpectedEof};

use super::{FragmentRef, TextureFileListRef};
use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HAS_PAIR: u32 = 0x2;

/// `0x30` A surface's render method, tint, and texture. The trailing pair
/// (present only when `flags & 0x2`) is an unexplained `(u32, f32)` the
/// client reads but whose meaning was never publicly documented.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct Material {
    pub name_reference: StringReference,
    pub flags: u32,
    pub render_method: u32,
    pub rgb_pen: u32,
    pub brightness: f32,
    pub scaled_ambient: f32,
    pub texture_reference: FragmentRef<TextureFileListRef>,
    pub pair: Option<(u32, f32)>,
}

impl Material {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let render_method = cursor.u32_le()?;
        let rgb_pen = cursor.u32_le()?;
        let brightness = cursor.f32_le()?;
        let scaled_ambient = cursor.f32_le()?;
        let texture_reference = FragmentRef::parse(cursor)?;
        let pair = if flags & HAS_PAIR != 0 {
            Some((cursor.u32_le()?, cursor.f32_le()?))
        } else {
            None
        };
        Ok(Material {
            name_reference,
            flags,
            render_method,
            rgb_pen,
            brightness,
            scaled_ambient,
            texture_reference,
            pair,
        })
    }

    /// A texture is masked (alpha-tested rather than opaque) iff both of
    /// its two low flag bits are set.
    pub fn is_masked(&self) -> bool {
        self.flags & 0b11 == 0b11
    }
}

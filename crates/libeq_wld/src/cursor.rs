//! An endian-aware, EOF-checked reader over a borrowed byte slice.
//!
//! Every fragment decoder reads its record body through one of these: a
//! short read anywhere returns `UnexpectedEof` instead of panicking or
//! silently truncating. `libeq_net` reuses the same type for its
//! big-endian session header fields. No copies are made; every read
//! aliases the input slice.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnexpectedEof {
    pub requested: usize,
    pub remaining: usize,
}

impl fmt::Display for UnexpectedEof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected EOF: requested {} bytes, {} remaining",
            self.requested, self.remaining
        )
    }
}

impl std::error::Error for UnexpectedEof {}

pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_le {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty, UnexpectedEof> {
            const N: usize = std::mem::size_of::<$ty>();
            let bytes = self.take(N)?;
            Ok(<$ty>::from_le_bytes(bytes.try_into().unwrap()))
        }
    };
}

macro_rules! read_be {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty, UnexpectedEof> {
            const N: usize = std::mem::size_of::<$ty>();
            let bytes = self.take(N)?;
            Ok(<$ty>::from_be_bytes(bytes.try_into().unwrap()))
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], UnexpectedEof> {
        self.data.get(self.pos..self.pos + n).ok_or(UnexpectedEof {
            requested: n,
            remaining: self.remaining(),
        })
    }

    /// Borrow and consume the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], UnexpectedEof> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Consume and return every remaining byte.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    pub fn skip(&mut self, n: usize) -> Result<(), UnexpectedEof> {
        self.take(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, UnexpectedEof> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, UnexpectedEof> {
        Ok(self.take(1)?[0] as i8)
    }

    read_le!(u16_le, u16);
    read_le!(u32_le, u32);
    read_le!(i16_le, i16);
    read_le!(i32_le, i32);
    read_le!(f32_le, f32);

    read_be!(u16_be, u16);
    read_be!(u32_be, u32);
    read_be!(i16_be, i16);
    read_be!(i32_be, i32);
    read_be!(f32_be, f32);

    /// A NUL-terminated string; the NUL is consumed but not included.
    pub fn cstring(&mut self) -> Result<String, UnexpectedEof> {
        let nul_offset = self.data[self.pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(UnexpectedEof {
                requested: 1,
                remaining: self.remaining(),
            })?;
        let bytes = self.take(nul_offset)?;
        self.skip(1)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_typed_values_and_advances() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xff];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.u32_le().unwrap(), 1);
        assert_eq!(cursor.u8().unwrap(), 0xff);
        assert!(cursor.is_empty());
    }

    #[test]
    fn big_endian_reads_differ_from_little_endian() {
        let data = [0x00, 0x00, 0x00, 0x01];
        assert_eq!(Cursor::new(&data).u32_be().unwrap(), 1);
        assert_eq!(Cursor::new(&data).u32_le().unwrap(), 0x0100_0000);
    }

    #[test]
    fn short_reads_fail_with_unexpected_eof() {
        let data = [0x01];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.u32_le().is_err());
    }

    #[test]
    fn cstring_stops_before_nul_and_consumes_it() {
        let data = [b'h', b'i', 0x00, 0xAA];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.cstring().unwrap(), "hi");
        assert_eq!(cursor.u8().unwrap(), 0xAA);
    }
}

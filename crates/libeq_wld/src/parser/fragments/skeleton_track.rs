use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sampled pose within a [`SkeletonTrack`]. A zero raw rotation (`rw`)
/// or zero raw scale collapses the corresponding component to `None`
/// (identity) rather than a division.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TrackFrame {
    pub rotation: Option<(f32, f32, f32, f32)>,
    pub location: Option<(f32, f32, f32)>,
}

impl TrackFrame {
    fn parse(cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let rw = cursor.i16_le()?;
        let rx = cursor.i16_le()?;
        let ry = cursor.i16_le()?;
        let rz = cursor.i16_le()?;
        let dx = cursor.i16_le()?;
        let dy = cursor.i16_le()?;
        let dz = cursor.i16_le()?;
        let scale = cursor.i16_le()?;

        let rotation = if rw == 0 {
            None
        } else {
            let (w, x, y, z) = (rw as f32, rx as f32, ry as f32, rz as f32);
            let magnitude = (w * w + x * x + y * y + z * z).sqrt();
            Some((w / magnitude, x / magnitude, y / magnitude, z / magnitude))
        };

        let location = if scale == 0 {
            None
        } else {
            let s = scale as f32;
            Some((dx as f32 / s, dy as f32 / s, dz as f32 / s))
        };

        Ok(TrackFrame { rotation, location })
    }
}

/// `0x12` An animation track: a named sequence of per-frame bone poses.
/// Played back by sampling `frames[clamp(i, 0, frames.len() - 1)]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct SkeletonTrack {
    pub name_reference: StringReference,
    pub flags: u32,
    pub frames: Vec<TrackFrame>,
}

impl SkeletonTrack {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let flags = cursor.u32_le()?;
        let frame_count = cursor.u32_le()?;
        let mut frames = Vec::with_capacity(frame_count as usize);
        for _ in 0..frame_count {
            frames.push(TrackFrame::parse(cursor)?);
        }
        Ok(SkeletonTrack {
            name_reference,
            flags,
            frames,
        })
    }

    /// The frame at `index`, clamped into range. Panics only if the track
    /// has zero frames, which the format never produces in practice.
    pub fn frame(&self, index: usize) -> &TrackFrame {
        let clamped = index.min(self.frames.len() - 1);
        &self.frames[clamped]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(rw: i16, rx: i16, ry: i16, rz: i16, dx: i16, dy: i16, dz: i16, scale: i16) -> Vec<u8> {
        [rw, rx, ry, rz, dx, dy, dz, scale]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    #[test]
    fn zero_rotation_and_scale_decode_to_identity() {
        let mut data = 0u32.to_le_bytes().to_vec(); // flags
        data.extend_from_slice(&1u32.to_le_bytes()); // frame_count
        data.extend(frame_bytes(0, 1, 2, 3, 0, 5, 6, 0));

        let mut cursor = Cursor::new(&data);
        let track = SkeletonTrack::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(track.frames.len(), 1);
        assert_eq!(track.frames[0].rotation, None);
        assert_eq!(track.frames[0].location, None);
    }

    #[test]
    fn nonzero_rotation_is_unit_magnitude() {
        let mut data = 0u32.to_le_bytes().to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend(frame_bytes(1, 0, 0, 0, 10, 20, 30, 10));

        let mut cursor = Cursor::new(&data);
        let track = SkeletonTrack::parse(StringReference::new(0), &mut cursor).unwrap();
        let (w, x, y, z) = track.frames[0].rotation.unwrap();
        let magnitude = (w * w + x * x + y * y + z * z).sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
        assert_eq!(track.frames[0].location, Some((1.0, 2.0, 3.0)));
    }

    #[test]
    fn single_frame_track_returns_that_frame_at_any_index() {
        let mut data = 0u32.to_le_bytes().to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend(frame_bytes(1, 0, 0, 0, 0, 0, 0, 0));

        let mut cursor = Cursor::new(&data);
        let track = SkeletonTrack::parse(StringReference::new(0), &mut cursor).unwrap();
        assert_eq!(track.frame(0), track.frame(99));
    }
}

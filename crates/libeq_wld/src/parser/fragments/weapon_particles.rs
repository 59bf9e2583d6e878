use crate::cursor::{Cursor, UnexpectedEof};

use crate::parser::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a particle cloud's spawn point moves relative to its emitter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ParticleMovement {
    None,
    SphereBound,
    Plane,
    StreamBound,
    Other(u32),
}

impl From<u32> for ParticleMovement {
    fn from(value: u32) -> Self {
        match value {
            0 => ParticleMovement::None,
            1 => ParticleMovement::SphereBound,
            2 => ParticleMovement::Plane,
            3 => ParticleMovement::StreamBound,
            other => ParticleMovement::Other(other),
        }
    }
}

/// `0x34` A particle-cloud emitter definition, used for weapon trails and
/// similar effects.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq)]
pub struct WeaponParticles {
    pub name_reference: StringReference,
    pub particle_movement: ParticleMovement,
    pub flags: u32,
    pub simultaneous_particles: u32,
    pub unknown: [u32; 4],
    pub spawn_radius: f32,
    pub spawn_angle: f32,
    pub spawn_lifespan_ms: u32,
    pub spawn_velocity: f32,
    pub spawn_normal: (f32, f32, f32),
    pub spawn_rate_ms: u32,
    pub spawn_scale: f32,
    pub color: (u8, u8, u8, u8),
}

impl WeaponParticles {
    pub fn parse(name_reference: StringReference, cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        let particle_movement = ParticleMovement::from(cursor.u32_le()?);
        let flags = cursor.u32_le()?;
        let simultaneous_particles = cursor.u32_le()?;
        let unknown = [
            cursor.u32_le()?,
            cursor.u32_le()?,
            cursor.u32_le()?,
            cursor.u32_le()?,
        ];
        let spawn_radius = cursor.f32_le()?;
        let spawn_angle = cursor.f32_le()?;
        let spawn_lifespan_ms = cursor.u32_le()?;
        let spawn_velocity = cursor.f32_le()?;
        let spawn_normal = (cursor.f32_le()?, cursor.f32_le()?, cursor.f32_le()?);
        let spawn_rate_ms = cursor.u32_le()?;
        let spawn_scale = cursor.f32_le()?;
        let color = (
            cursor.u8()?,
            cursor.u8()?,
            cursor.u8()?,
            cursor.u8()?,
        );
        Ok(WeaponParticles {
            name_reference,
            particle_movement,
            flags,
            simultaneous_particles,
            unknown,
            spawn_radius,
            spawn_angle,
            spawn_lifespan_ms,
            spawn_velocity,
            spawn_normal,
            spawn_rate_ms,
            spawn_scale,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_the_particle_movement_mode() {
        assert_eq!(ParticleMovement::from(1), ParticleMovement::SphereBound);
        assert_eq!(ParticleMovement::from(99), ParticleMovement::Other(99));
    }
}

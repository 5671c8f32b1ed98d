//! GPU record types for the particle and center buffers

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One particle as stored in the device buffer.
///
/// Two tightly packed `vec3<f32>` with no padding (24 bytes). The WGSL side
/// declares the fields as `array<f32, 3>` so its stride matches this struct
/// rather than the 16-byte alignment of `vec3<f32>`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleRecord {
    pub velocity: [f32; 3],
    pub position: [f32; 3],
}

impl ParticleRecord {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(velocity: Vec3, position: Vec3) -> Self {
        Self {
            velocity: velocity.to_array(),
            position: position.to_array(),
        }
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// A center attractor point (`vec2<f32>` on the device).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CenterPoint {
    pub position: [f32; 2],
}

impl CenterPoint {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub const ORIGIN: Self = Self {
        position: [0.0, 0.0],
    };

    pub fn new(position: Vec2) -> Self {
        Self {
            position: position.to_array(),
        }
    }

    /// The center lifted onto the z = 0 plane, as the kernel sees it
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_record_is_tightly_packed() {
        assert_eq!(size_of::<ParticleRecord>(), 24);
        assert_eq!(align_of::<ParticleRecord>(), 4);
        assert_eq!(offset_of!(ParticleRecord, velocity), 0);
        assert_eq!(offset_of!(ParticleRecord, position), 12);
    }

    #[test]
    fn test_center_layout() {
        assert_eq!(size_of::<CenterPoint>(), 8);
        assert_eq!(CenterPoint::default(), CenterPoint::ORIGIN);
    }

    #[test]
    fn test_record_bytes_order() {
        let record = ParticleRecord::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&record));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}

//! Random initial state for the particle and center buffers

use crate::constants::{POSITION_SEED_RADIUS, VELOCITY_SEED_RADIUS};
use crate::particle::{CenterPoint, ParticleRecord};
use glam::Vec3;
use rand::Rng;

/// Radii of the spheres initial velocities and positions are drawn from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedRadii {
    pub velocity: f32,
    pub position: f32,
}

impl Default for SeedRadii {
    fn default() -> Self {
        Self {
            velocity: VELOCITY_SEED_RADIUS,
            position: POSITION_SEED_RADIUS,
        }
    }
}

/// Uniform random point inside the unit sphere.
///
/// Direction from a uniform (theta, cos phi) pair, radius from the cube root
/// of a uniform sample so that density is constant over the volume.
pub fn random_in_unit_sphere<R: Rng>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    let cos_phi = rng.random::<f32>() * 2.0 - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = rng.random::<f32>().cbrt();

    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * cos_phi,
    )
}

/// Host-side staging data for the particle buffer
pub fn seed_particles<R: Rng>(
    rng: &mut R,
    count: usize,
    radii: SeedRadii,
) -> Vec<ParticleRecord> {
    (0..count)
        .map(|_| {
            let velocity = random_in_unit_sphere(rng) * radii.velocity;
            let position = random_in_unit_sphere(rng) * radii.position;
            ParticleRecord::new(velocity, position)
        })
        .collect()
}

/// Host-side staging data for the centers buffer (all at the origin)
pub fn seed_centers(count: usize) -> Vec<CenterPoint> {
    vec![CenterPoint::ORIGIN; count]
}

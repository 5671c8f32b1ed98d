//! Startup configuration
//!
//! Everything here is read once when the system initializes. Buffers are sized
//! from it, so changing a value means building a new system.

use glam::Vec3;
use particle_physics::{
    SeedRadii, StepParams, DEFAULT_AREA_SIZE, DEFAULT_CENTER_COUNT, DEFAULT_GRAVITY,
    DEFAULT_INTENSITY, DEFAULT_PARTICLE_COUNT, DEFAULT_POINT_SIZE, DEFAULT_WORKGROUP_SIZE,
    MAX_WORKGROUP_SIZE,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("particle count must be non-zero")]
    NoParticles,
    #[error("workgroup size {0} is outside 1..={max}", max = MAX_WORKGROUP_SIZE)]
    WorkgroupSize(u32),
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite")]
    NotFinite { name: &'static str },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub particle_count: u32,
    pub center_count: u32,
    pub workgroup_size: u32,
    pub gravity: Vec3,
    pub area_size: Vec3,
    pub intensity: f32,
    pub point_size: f32,
    /// Edge length of the generated sprite texture, in pixels
    pub texture_size: u32,
    pub seed_radii: SeedRadii,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            center_count: DEFAULT_CENTER_COUNT,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
            area_size: Vec3::from_array(DEFAULT_AREA_SIZE),
            intensity: DEFAULT_INTENSITY,
            point_size: DEFAULT_POINT_SIZE,
            texture_size: 64,
            seed_radii: SeedRadii::default(),
            rng_seed: None,
        }
    }
}

impl ParticleConfig {
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_center_count(mut self, count: u32) -> Self {
        self.center_count = count;
        self
    }

    pub fn with_workgroup_size(mut self, size: u32) -> Self {
        self.workgroup_size = size;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_area_size(mut self, area_size: Vec3) -> Self {
        self.area_size = area_size;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    pub fn with_seed_radii(mut self, radii: SeedRadii) -> Self {
        self.seed_radii = radii;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.workgroup_size == 0 || self.workgroup_size > MAX_WORKGROUP_SIZE {
            return Err(ConfigError::WorkgroupSize(self.workgroup_size));
        }

        let positive = [
            ("point size", self.point_size),
            ("velocity seed radius", self.seed_radii.velocity),
            ("position seed radius", self.seed_radii.position),
            ("area width", self.area_size.x),
            ("area height", self.area_size.y),
            ("area depth", self.area_size.z),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !self.gravity.is_finite() {
            return Err(ConfigError::NotFinite { name: "gravity" });
        }
        if !self.intensity.is_finite() {
            return Err(ConfigError::NotFinite { name: "intensity" });
        }
        if self.texture_size == 0 {
            return Err(ConfigError::NotPositive {
                name: "texture size",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// This frame's kernel parameters from the clock and the fixed settings
    pub fn step_params(&self, time_step: f32, elapsed_time: f32) -> StepParams {
        StepParams {
            time_step,
            elapsed_time,
            gravity: self.gravity,
            area_size: self.area_size,
            intensity: self.intensity,
        }
    }
}

//! Default simulation constants
//!
//! Every value here can be overridden through the system configuration before
//! startup. None of them may change once the GPU buffers exist.

/// Number of particles in the default configuration (4 * 2^20)
pub const DEFAULT_PARTICLE_COUNT: u32 = 1_048_576 * 4;

/// Number of center attractor points
pub const DEFAULT_CENTER_COUNT: u32 = 32;

/// Threads per workgroup along X. Y and Z are always 1.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 256;

/// Largest workgroup width accepted under default device limits
pub const MAX_WORKGROUP_SIZE: u32 = 256;

/// Constant acceleration applied to every particle
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -0.3, 0.0];

/// Extents of the box particles live in, centered on the origin
pub const DEFAULT_AREA_SIZE: [f32; 3] = [5.0, 5.0, 5.0];

/// Scale of the pull towards the center points
pub const DEFAULT_INTENSITY: f32 = 20.0;

/// World-space edge length of a particle sprite
pub const DEFAULT_POINT_SIZE: f32 = 0.05;

/// Radius of the sphere initial velocities are drawn from
pub const VELOCITY_SEED_RADIUS: f32 = 10.0;

/// Radius of the sphere initial positions are drawn from
pub const POSITION_SEED_RADIUS: f32 = 55.0;

/// Softening term in the center pull, keeps the force finite at r = 0
pub const CENTER_SOFTENING: f32 = 1.0;

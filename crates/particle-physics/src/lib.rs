//! # Particle Physics
//!
//! Host-side definitions shared with the GPU: the particle record layout,
//! default constants, random seeding, and a CPU reference of the compute kernel.

pub mod constants;
pub mod kernel;
pub mod particle;
pub mod seed;

pub use constants::*;
pub use kernel::*;
pub use particle::*;
pub use seed::*;

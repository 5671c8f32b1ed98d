//! GPU particle system
//!
//! Ties the particle store, the compute stage and the sprite renderer into a
//! single owner with a strict create-once, release-once lifecycle.

pub mod clock;
pub mod config;
pub mod system;

pub use clock::*;
pub use config::*;
pub use system::*;

pub use particle_physics::{CenterPoint, ParticleRecord, SeedRadii, StepParams};
pub use particle_renderer::{Camera, DrawCall, ViewSource};
pub use particle_simulation::{ResourceKind, ResourceTracker};

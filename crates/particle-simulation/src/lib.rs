//! # Particle Simulation
//!
//! GPU-resident particle storage and the compute stage that advances it.

pub mod error;
pub mod params;
pub mod scope;
pub mod simulation;
pub mod store;
pub mod tracker;

pub use error::*;
pub use params::*;
pub use scope::*;
pub use simulation::*;
pub use store::*;
pub use tracker::*;

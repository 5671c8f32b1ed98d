//! # Particle Renderer
//!
//! Draws the particle buffer as textured, camera-facing sprites.

pub mod camera;
pub mod error;
pub mod renderer;
pub mod texture;

pub use camera::*;
pub use error::*;
pub use renderer::*;
pub use texture::*;

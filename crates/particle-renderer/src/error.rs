//! Error types for the sprite pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("texture must be at least 1x1, got {width}x{height}")]
    EmptyTexture { width: u32, height: u32 },
    #[error("texture data holds {actual} bytes, expected {expected}")]
    InvalidTextureData { expected: usize, actual: usize },
    #[error("failed to create texture: {0}")]
    Texture(#[source] wgpu::Error),
    #[error("failed to build render pipeline: {0}")]
    Pipeline(#[source] wgpu::Error),
    #[error("draw submission failed: {0}")]
    Draw(#[source] wgpu::Error),
    #[error("render pipeline has been released")]
    Released,
}

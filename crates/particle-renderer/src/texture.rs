//! Sprite texture sampled by the particle fragment shader
//!
//! Loading image assets is the application's job. This module takes raw RGBA
//! pixels, and can generate a soft round sprite when nothing else is supplied.

use crate::error::RenderError;
use particle_simulation::{capture_errors, AllocationToken, ResourceKind, ResourceTracker};

pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct ParticleTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    _token: AllocationToken,
}

impl ParticleTexture {
    /// Upload `data` (tightly packed RGBA8, row-major) as a sprite texture.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        data: &[u8],
        tracker: &ResourceTracker,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::InvalidTextureData {
                expected,
                actual: data.len(),
            });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let (texture, sampler) = capture_errors(device, || {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Particle Texture"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );

            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Particle Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            });

            (texture, sampler)
        })
        .map_err(RenderError::Texture)?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("Particle texture uploaded ({width}x{height})");

        Ok(Self {
            texture,
            view,
            sampler,
            _token: tracker.register(ResourceKind::Texture),
        })
    }

    /// White disc with a quadratic alpha falloff towards the edge
    pub fn soft_disc(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        tracker: &ResourceTracker,
    ) -> Result<Self, RenderError> {
        let pixels = soft_disc_pixels(size);
        Self::from_rgba8(device, queue, size, size, &pixels, tracker)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl Drop for ParticleTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

/// RGBA8 pixels for [`ParticleTexture::soft_disc`]
pub fn soft_disc_pixels(size: u32) -> Vec<u8> {
    let size = size.max(1);
    let half = size as f32 * 0.5;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            let alpha = (falloff * falloff * 255.0).round() as u8;
            pixels.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_disc_shape() {
        let size = 32;
        let pixels = soft_disc_pixels(size);
        assert_eq!(pixels.len(), (size * size * 4) as usize);

        let alpha = |x: u32, y: u32| pixels[((y * size + x) * 4 + 3) as usize];
        assert_eq!(alpha(0, 0), 0);
        assert!(alpha(16, 16) > 200);
        assert!(alpha(16, 16) > alpha(24, 16));
        assert_eq!(alpha(3, 16), alpha(28, 16));
    }
}

#![allow(dead_code)]

use gpu_particles::ParticleRecord;
use particle_simulation::ParticlesReadOnly;

pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const READBACK_SIZE: u32 = 64;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A device and queue, or `None` (with a warning logged) on machines without
/// any usable adapter. GPU tests return early in that case.
pub fn gpu() -> Option<(wgpu::Device, wgpu::Queue)> {
    init_logging();
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = match pollster::block_on(
        instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
    ) {
        Ok(adapter) => adapter,
        Err(e) => {
            log::warn!("skipping GPU test: no adapter ({e})");
            return None;
        }
    };

    match pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())) {
        Ok(pair) => Some(pair),
        Err(e) => {
            log::warn!("skipping GPU test: no device ({e})");
            None
        }
    }
}

pub fn offscreen_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = target_texture(device, width, height, wgpu::TextureUsages::empty());
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// A square `READBACK_SIZE` target that `read_pixels` can copy from. One row
/// is exactly 256 bytes, so no row padding is needed.
pub fn readback_target(device: &wgpu::Device) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = target_texture(
        device,
        READBACK_SIZE,
        READBACK_SIZE,
        wgpu::TextureUsages::COPY_SRC,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn target_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    extra_usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | extra_usage,
        view_formats: &[],
    })
}

/// RGBA8 pixels of a `readback_target` texture, top row first.
pub fn read_pixels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Vec<u8> {
    let bytes_per_row = READBACK_SIZE * 4;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pixel Readback Buffer"),
        size: (bytes_per_row * READBACK_SIZE) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Pixel Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(READBACK_SIZE),
            },
        },
        wgpu::Extent3d {
            width: READBACK_SIZE,
            height: READBACK_SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| {});
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .expect("device poll");

    let pixels = slice.get_mapped_range().to_vec();
    staging.unmap();
    pixels
}

/// Copy the particle buffer back to the host. Tests only; the pipeline itself
/// never does this.
pub fn read_particles(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    particles: ParticlesReadOnly<'_>,
) -> Vec<ParticleRecord> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: particles.size_bytes(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    particles.encode_copy_to(&mut encoder, &staging);
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| {});
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .expect("device poll");

    let records = {
        let data = slice.get_mapped_range();
        bytemuck::pod_collect_to_vec::<u8, ParticleRecord>(&data)
    };
    staging.unmap();
    records
}

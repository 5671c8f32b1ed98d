//! Device-resident particle and center buffers
//!
//! The store is the only owner of both buffers. Stages get access through
//! borrowed capability handles: [`ParticlesReadWrite`] for the compute stage
//! and [`ParticlesReadOnly`] for rendering.

use crate::error::StoreError;
use crate::scope::capture_errors;
use crate::tracker::{OwnedBuffer, ResourceTracker};
use particle_physics::{seed_centers, seed_particles, CenterPoint, ParticleRecord, SeedRadii};
use rand::Rng;

pub struct ParticleStore {
    particles: Option<OwnedBuffer>,
    centers: Option<OwnedBuffer>,
    particle_count: u32,
    center_count: u32,
    seeded: bool,
}

impl ParticleStore {
    /// Allocate storage for `particle_count` records and `center_count` centers.
    ///
    /// Contents are zeroed until [`seed`](Self::seed) uploads the initial
    /// state. The centers buffer always holds at least one slot since empty
    /// storage bindings are invalid; the kernel only reads `center_count`.
    pub fn initialize(
        device: &wgpu::Device,
        particle_count: u32,
        center_count: u32,
        tracker: &ResourceTracker,
    ) -> Result<Self, StoreError> {
        if particle_count == 0 {
            return Err(StoreError::EmptyParticleBuffer);
        }

        let particle_bytes = ParticleRecord::SIZE * particle_count as u64;
        let center_bytes = CenterPoint::SIZE * center_count.max(1) as u64;
        check_limits(device, "particle buffer", particle_bytes)?;
        check_limits(device, "centers buffer", center_bytes)?;

        let particles = allocate(
            device,
            "Particle Buffer",
            particle_bytes,
            wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            tracker,
        )?;
        // If this fails `particles` is dropped here, releasing it before the
        // error reaches the caller.
        let centers = allocate(
            device,
            "Centers Buffer",
            center_bytes,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            tracker,
        )?;

        log::info!(
            "Particle store allocated: {} particles ({} bytes), {} centers",
            particle_count,
            particle_bytes,
            center_count
        );

        Ok(Self {
            particles: Some(particles),
            centers: Some(centers),
            particle_count,
            center_count,
            seeded: false,
        })
    }

    /// Upload random initial state once.
    ///
    /// The host staging arrays are dropped as soon as the upload is queued;
    /// from here on the device buffer is the only copy of particle state.
    pub fn seed<R: Rng>(
        &mut self,
        queue: &wgpu::Queue,
        rng: &mut R,
        radii: SeedRadii,
    ) -> Result<(), StoreError> {
        if self.seeded {
            return Err(StoreError::AlreadySeeded);
        }
        let particles_buffer = self.particles.as_ref().ok_or(StoreError::Released)?;
        let centers_buffer = self.centers.as_ref().ok_or(StoreError::Released)?;

        let particles = seed_particles(rng, self.particle_count as usize, radii);
        queue.write_buffer(particles_buffer.buffer(), 0, bytemuck::cast_slice(&particles));
        drop(particles);

        let centers = seed_centers(self.center_count.max(1) as usize);
        queue.write_buffer(centers_buffer.buffer(), 0, bytemuck::cast_slice(&centers));

        self.seeded = true;
        log::info!("Particle store seeded");
        Ok(())
    }

    /// Overwrite all center points.
    ///
    /// Nothing in the frame loop calls this; it exists for collaborators that
    /// want to move the attractors.
    pub fn write_centers(
        &self,
        queue: &wgpu::Queue,
        centers: &[CenterPoint],
    ) -> Result<(), StoreError> {
        if centers.len() != self.center_count as usize {
            return Err(StoreError::CenterCountMismatch {
                expected: self.center_count,
                actual: centers.len(),
            });
        }
        let buffer = self.centers.as_ref().ok_or(StoreError::Released)?;
        if !centers.is_empty() {
            queue.write_buffer(buffer.buffer(), 0, bytemuck::cast_slice(centers));
        }
        Ok(())
    }

    pub fn read_write(&self) -> Result<ParticlesReadWrite<'_>, StoreError> {
        let buffer = self.particles.as_ref().ok_or(StoreError::Released)?;
        Ok(ParticlesReadWrite {
            buffer: buffer.buffer(),
            count: self.particle_count,
        })
    }

    pub fn read_only(&self) -> Result<ParticlesReadOnly<'_>, StoreError> {
        let buffer = self.particles.as_ref().ok_or(StoreError::Released)?;
        Ok(ParticlesReadOnly {
            buffer: buffer.buffer(),
            count: self.particle_count,
        })
    }

    pub fn centers(&self) -> Result<Centers<'_>, StoreError> {
        let buffer = self.centers.as_ref().ok_or(StoreError::Released)?;
        Ok(Centers {
            buffer: buffer.buffer(),
            count: self.center_count,
        })
    }

    /// Destroy both buffers. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(particles) = self.particles.take() {
            drop(particles);
            log::debug!("Particle buffer released");
        }
        if let Some(centers) = self.centers.take() {
            drop(centers);
            log::debug!("Centers buffer released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.particles.is_none() && self.centers.is_none()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn center_count(&self) -> u32 {
        self.center_count
    }
}

impl Drop for ParticleStore {
    fn drop(&mut self) {
        self.release();
    }
}

fn check_limits(device: &wgpu::Device, label: &'static str, bytes: u64) -> Result<(), StoreError> {
    let limits = device.limits();
    let limit = limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64);
    if bytes > limit {
        return Err(StoreError::ExceedsLimit {
            label,
            requested: bytes,
            limit,
        });
    }
    Ok(())
}

fn allocate(
    device: &wgpu::Device,
    label: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
    tracker: &ResourceTracker,
) -> Result<OwnedBuffer, StoreError> {
    let buffer = capture_errors(device, || {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    })
    .map_err(|source| StoreError::Allocation { label, source })?;

    log::debug!("{label}: {size} bytes");
    Ok(OwnedBuffer::new(buffer, tracker))
}

/// Read-write view of the particle buffer, handed to the compute stage
#[derive(Clone, Copy, Debug)]
pub struct ParticlesReadWrite<'a> {
    buffer: &'a wgpu::Buffer,
    count: u32,
}

impl<'a> ParticlesReadWrite<'a> {
    pub fn binding(&self) -> wgpu::BindingResource<'a> {
        self.buffer.as_entire_binding()
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Read-only view of the particle buffer, handed to the render stage
#[derive(Clone, Copy, Debug)]
pub struct ParticlesReadOnly<'a> {
    buffer: &'a wgpu::Buffer,
    count: u32,
}

impl<'a> ParticlesReadOnly<'a> {
    pub fn binding(&self) -> wgpu::BindingResource<'a> {
        self.buffer.as_entire_binding()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn size_bytes(&self) -> u64 {
        ParticleRecord::SIZE * self.count as u64
    }

    /// Record a copy of the whole buffer into `destination` (diagnostics only;
    /// the frame loop never reads particles back).
    pub fn encode_copy_to(&self, encoder: &mut wgpu::CommandEncoder, destination: &wgpu::Buffer) {
        encoder.copy_buffer_to_buffer(self.buffer, 0, destination, 0, self.size_bytes());
    }
}

/// Read-only view of the centers buffer
#[derive(Clone, Copy, Debug)]
pub struct Centers<'a> {
    buffer: &'a wgpu::Buffer,
    count: u32,
}

impl<'a> Centers<'a> {
    pub fn binding(&self) -> wgpu::BindingResource<'a> {
        self.buffer.as_entire_binding()
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

//! Resource lifecycle for the whole pipeline
//!
//! `Uninitialized -> Active -> Released`. Buffers, the compute pipeline, the
//! render pipeline and the sprite texture are created together once and
//! released together once. Released is terminal; run again with a new system.

use crate::config::{ConfigError, ParticleConfig};
use particle_physics::{CenterPoint, StepParams};
use particle_renderer::{
    DrawCall, ParticleRenderer, ParticleTexture, RenderError, RenderParams, ViewSource,
};
use particle_simulation::{
    ParticleSimulation, ParticleStore, ParticlesReadOnly, ResourceTracker, SimulationError,
    StoreError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    Released,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Active => "active",
            LifecycleState::Released => "released",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("cannot {action} while {state}")]
    InvalidState {
        state: LifecycleState,
        action: &'static str,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("frame submission failed: {0}")]
    Submission(#[source] wgpu::Error),
}

/// Everything created at startup. Field order is drop order: consumers of the
/// particle buffer go before the store that owns it.
struct Resources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: ParticleRenderer,
    texture: ParticleTexture,
    simulation: ParticleSimulation,
    store: ParticleStore,
}

impl Resources {
    fn build(
        config: &ParticleConfig,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        tracker: &ResourceTracker,
    ) -> Result<Self, SystemError> {
        let mut store = ParticleStore::initialize(
            device,
            config.particle_count,
            config.center_count,
            tracker,
        )?;

        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        store.seed(queue, &mut rng, config.seed_radii)?;

        let simulation = ParticleSimulation::new(
            device.clone(),
            queue.clone(),
            store.read_write()?,
            store.centers()?,
            config.workgroup_size,
            tracker,
        )?;
        let renderer = ParticleRenderer::new(device, target_format, tracker)?;
        let texture = ParticleTexture::soft_disc(device, queue, config.texture_size, tracker)?;

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            renderer,
            texture,
            simulation,
            store,
        })
    }

    fn release(mut self) {
        self.renderer.release();
        drop(self.texture);
        drop(self.simulation);
        self.store.release();
        log::info!("Particle system resources released");
    }
}

pub struct ParticleSystem {
    config: ParticleConfig,
    state: LifecycleState,
    tracker: ResourceTracker,
    resources: Option<Resources>,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        Self::with_tracker(config, ResourceTracker::new())
    }

    /// Use a caller-owned tracker, e.g. to check for leaks across several systems
    pub fn with_tracker(config: ParticleConfig, tracker: ResourceTracker) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            tracker,
            resources: None,
        }
    }

    /// Create and seed every device resource. Uninitialized -> Active.
    ///
    /// On failure everything built so far is released before the error is
    /// returned and the system stays Uninitialized.
    pub fn initialize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Result<(), SystemError> {
        self.expect_state(LifecycleState::Uninitialized, "initialize")?;
        self.config.validate()?;

        log::info!(
            "Initializing particle system: {} particles, {} centers",
            self.config.particle_count,
            self.config.center_count
        );

        let resources =
            Resources::build(&self.config, device, queue, target_format, &self.tracker)?;
        self.resources = Some(resources);
        self.state = LifecycleState::Active;
        log::info!("✓ Particle system active");
        Ok(())
    }

    /// Submit this frame's simulation dispatch.
    pub fn simulate(
        &mut self,
        time_step: f32,
        elapsed_time: f32,
    ) -> Result<StepParams, SystemError> {
        let step = self.config.step_params(time_step, elapsed_time);
        let resources = self.active_ref("simulate")?;
        resources.simulation.step(&step)?;
        Ok(step)
    }

    /// Submit this frame's sprite draw. Call after [`simulate`](Self::simulate).
    pub fn render(
        &self,
        target: &wgpu::TextureView,
        clear: Option<wgpu::Color>,
        camera: &dyn ViewSource,
    ) -> Result<DrawCall, SystemError> {
        let resources = self.active_ref("render")?;
        let params = RenderParams {
            camera,
            texture: &resources.texture,
            point_size: self.config.point_size,
        };
        let call = resources.renderer.draw(
            &resources.device,
            &resources.queue,
            target,
            clear,
            &params,
            resources.store.read_only()?,
        )?;
        Ok(call)
    }

    /// Simulate then render, recorded into one command buffer.
    pub fn frame(
        &mut self,
        time_step: f32,
        elapsed_time: f32,
        target: &wgpu::TextureView,
        clear: Option<wgpu::Color>,
        camera: &dyn ViewSource,
    ) -> Result<DrawCall, SystemError> {
        let step = self.config.step_params(time_step, elapsed_time);
        let point_size = self.config.point_size;
        let resources = self.active_ref("run a frame")?;

        let device = &resources.device;
        let outcome = particle_simulation::capture_errors(device, || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

            resources.simulation.encode_step(&mut encoder, &step);

            let params = RenderParams {
                camera,
                texture: &resources.texture,
                point_size,
            };
            let call = resources.renderer.encode_draw(
                device,
                &resources.queue,
                &mut encoder,
                target,
                clear,
                &params,
                resources.store.read_only()?,
            )?;

            resources.queue.submit(std::iter::once(encoder.finish()));
            Ok::<_, SystemError>(call)
        });

        outcome.map_err(SystemError::Submission)?
    }

    /// Replace the center attractor points. Requires exactly `center_count` entries.
    pub fn write_centers(&self, centers: &[CenterPoint]) -> Result<(), SystemError> {
        let resources = self.active_ref("write centers")?;
        resources.store.write_centers(&resources.queue, centers)?;
        Ok(())
    }

    /// Read-only access to the particle buffer for additional passes
    pub fn particles(&self) -> Result<ParticlesReadOnly<'_>, SystemError> {
        let resources = self.active_ref("read particles")?;
        Ok(resources.store.read_only()?)
    }

    /// Release every device resource. Active -> Released.
    ///
    /// A no-op when nothing was ever initialized or when already released, so
    /// it is safe from any shutdown path, including `Drop`.
    pub fn release(&mut self) {
        match self.state {
            LifecycleState::Uninitialized => {
                log::debug!("release() before initialize(): nothing to do");
            }
            LifecycleState::Released => {
                log::debug!("release() on released particle system: nothing to do");
            }
            LifecycleState::Active => {
                if let Some(resources) = self.resources.take() {
                    resources.release();
                }
                self.state = LifecycleState::Released;
            }
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Workgroups per dispatch, once active
    pub fn workgroups(&self) -> Option<u32> {
        self.resources.as_ref().map(|r| r.simulation.workgroups())
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        action: &'static str,
    ) -> Result<(), SystemError> {
        if self.state != expected {
            return Err(SystemError::InvalidState {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn active_ref(&self, action: &'static str) -> Result<&Resources, SystemError> {
        self.resources.as_ref().ok_or(SystemError::InvalidState {
            state: self.state,
            action,
        })
    }
}

impl Drop for ParticleSystem {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uninitialized() {
        let system = ParticleSystem::new(ParticleConfig::default());
        assert_eq!(system.state(), LifecycleState::Uninitialized);
        assert_eq!(system.workgroups(), None);
    }

    #[test]
    fn test_release_before_initialize_is_noop() {
        let mut system = ParticleSystem::new(ParticleConfig::default());
        system.release();
        system.release();
        assert_eq!(system.state(), LifecycleState::Uninitialized);
        assert_eq!(system.tracker().live_total(), 0);
    }

    #[test]
    fn test_frame_operations_need_active_state() {
        let mut system = ParticleSystem::new(ParticleConfig::default());
        assert!(matches!(
            system.simulate(0.016, 0.0),
            Err(SystemError::InvalidState {
                state: LifecycleState::Uninitialized,
                action: "simulate"
            })
        ));
        assert!(matches!(
            system.write_centers(&[]),
            Err(SystemError::InvalidState { .. })
        ));
        assert!(matches!(system.particles(), Err(SystemError::InvalidState { .. })));
    }

    #[test]
    fn test_state_error_message() {
        let error = SystemError::InvalidState {
            state: LifecycleState::Released,
            action: "initialize",
        };
        assert_eq!(error.to_string(), "cannot initialize while released");
    }
}

//! GPU particle demo
//!
//! Simulates and draws the particle system in a window. Drag with the left
//! mouse button to orbit, scroll to zoom, Escape to quit.

use gpu_particles::{Camera, FrameClock, ParticleConfig, ParticleSystem};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

// Catppuccin Mocha base #1e1e2e in linear
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01176,
    g: 0.01176,
    b: 0.02447,
    a: 1.0,
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    System(#[from] gpu_particles::SystemError),
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    system: ParticleSystem,
    camera: Camera,
    clock: FrameClock,

    frame_counter: u32,
    fps_window_start: f32,
}

impl GpuState {
    async fn new(window: Arc<Window>, particles: ParticleConfig) -> Result<Self, StartupError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut system = ParticleSystem::new(particles);
        system.initialize(&device, &queue, surface_format)?;

        Ok(Self {
            surface,
            device,
            queue,
            camera: Camera::new(config.width, config.height),
            config,
            system,
            clock: FrameClock::new(),
            frame_counter: 0,
            fps_window_start: 0.0,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    /// One frame: simulate, then draw into the swapchain image.
    ///
    /// Returns the measured FPS once per second.
    fn render(&mut self) -> Result<Option<f32>, FrameError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let time = self.clock.tick();
        self.system.simulate(time.time_step, time.elapsed)?;
        self.system.render(&view, Some(CLEAR_COLOR), &self.camera)?;

        output.present();

        self.frame_counter += 1;
        let window = time.elapsed - self.fps_window_start;
        if window >= 1.0 {
            let fps = self.frame_counter as f32 / window;
            self.frame_counter = 0;
            self.fps_window_start = time.elapsed;
            return Ok(Some(fps));
        }
        Ok(None)
    }
}

#[derive(Debug, thiserror::Error)]
enum FrameError {
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    System(#[from] gpu_particles::SystemError),
}

struct App {
    particles: ParticleConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.system.release();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("GPU Particles")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone(), self.particles.clone())) {
            Ok(state) => {
                self.window = Some(window);
                self.gpu_state = Some(state);
            }
            Err(e) => {
                log::error!("Startup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_pressed = state == ElementState::Pressed;
                if !self.mouse_pressed {
                    self.last_mouse_pos = None;
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let (Some(last_pos), Some(gpu_state)) =
                        (self.last_mouse_pos, &mut self.gpu_state)
                    {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;
                        gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state
                        .camera
                        .zoom(-scroll * gpu_state.camera.distance / 100.0);
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) else {
                    return;
                };

                let mut fatal = false;
                match gpu_state.render() {
                    Ok(Some(fps)) => {
                        window.set_title(&format!(
                            "GPU Particles - {:.0} FPS - {} particles",
                            fps,
                            gpu_state.system.config().particle_count
                        ));
                    }
                    Ok(None) => {}
                    Err(FrameError::Surface(wgpu::SurfaceError::Lost))
                    | Err(FrameError::Surface(wgpu::SurfaceError::Outdated)) => {
                        gpu_state.resize(window.inner_size())
                    }
                    Err(FrameError::Surface(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("Surface timeout, skipping frame");
                    }
                    Err(e) => {
                        log::error!("Frame failed: {e}");
                        fatal = true;
                    }
                }

                if fatal {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting GPU particle simulation...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        particles: ParticleConfig::default(),
        window: None,
        gpu_state: None,
        mouse_pressed: false,
        last_mouse_pos: None,
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {e}");
    }
}

//! Particle rendering system

use crate::camera::ViewSource;
use crate::error::RenderError;
use crate::texture::ParticleTexture;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use particle_simulation::{
    capture_errors, AllocationToken, OwnedBuffer, ParticlesReadOnly, ResourceKind,
    ResourceTracker,
};

/// Each particle becomes one quad, two triangles
pub const VERTICES_PER_SPRITE: u32 = 6;

/// Matches `RenderUniform` in `shaders/particle.wgsl` (144 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RenderUniform {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub point_size: f32,
    pub _padding: [f32; 3],
}

impl RenderUniform {
    pub fn new(camera: &dyn ViewSource, point_size: f32) -> Self {
        let view = camera.world_to_camera();
        Self {
            view_proj: (camera.projection() * view).to_cols_array_2d(),
            inv_view: camera.camera_to_world().to_cols_array_2d(),
            point_size,
            _padding: [0.0; 3],
        }
    }

    pub fn inverse_view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inv_view)
    }
}

/// Per-frame inputs of the render stage
pub struct RenderParams<'a> {
    pub camera: &'a dyn ViewSource,
    pub texture: &'a ParticleTexture,
    pub point_size: f32,
}

/// What a draw put on the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub particle_count: u32,
    pub vertices_per_sprite: u32,
}

struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: OwnedBuffer,
    _token: AllocationToken,
}

pub struct ParticleRenderer {
    state: Option<PipelineState>,
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        tracker: &ResourceTracker,
    ) -> Result<Self, RenderError> {
        let (pipeline, bind_group_layout, uniform_buffer) = capture_errors(device, || {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Uniform Buffer"),
                size: std::mem::size_of::<RenderUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Particle Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Particle Bind Group Layout"),
                    entries: &[
                        // Camera + point size (Uniform) - Binding 0
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Particles (Storage) - Binding 1
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Sprite texture - Binding 2
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        // Sprite sampler - Binding 3
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            // Additive blending: sprites are unsorted, so nothing writes depth.
            let additive = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Particle Render Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: Some(wgpu::BlendState {
                            color: additive,
                            alpha: additive,
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            (pipeline, bind_group_layout, uniform_buffer)
        })
        .map_err(RenderError::Pipeline)?;

        log::info!("Particle render pipeline created ({target_format:?})");

        Ok(Self {
            state: Some(PipelineState {
                pipeline,
                bind_group_layout,
                uniform_buffer: OwnedBuffer::new(uniform_buffer, tracker),
                _token: tracker.register(ResourceKind::Pipeline),
            }),
        })
    }

    /// Bind this frame's camera, texture and particles and record the sprite
    /// pass into `encoder`.
    ///
    /// `clear` clears the target first; `None` draws over what is there.
    pub fn encode_draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear: Option<wgpu::Color>,
        params: &RenderParams<'_>,
        particles: ParticlesReadOnly<'_>,
    ) -> Result<DrawCall, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::Released)?;

        let uniform = RenderUniform::new(params.camera, params.point_size);
        queue.write_buffer(
            state.uniform_buffer.buffer(),
            0,
            bytemuck::cast_slice(&[uniform]),
        );

        // Create bind group for this frame
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &state.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: state.uniform_buffer.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particles.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(params.texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(params.texture.sampler()),
                },
            ],
        });

        let load = match clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&state.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..VERTICES_PER_SPRITE, 0..particles.count());
        }

        Ok(DrawCall {
            particle_count: particles.count(),
            vertices_per_sprite: VERTICES_PER_SPRITE,
        })
    }

    /// Record and submit the sprite pass in its own command buffer.
    ///
    /// Call after the frame's simulation step has been submitted; queue order
    /// is what makes this pass see the updated particles.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        clear: Option<wgpu::Color>,
        params: &RenderParams<'_>,
        particles: ParticlesReadOnly<'_>,
    ) -> Result<DrawCall, RenderError> {
        if self.state.is_none() {
            return Err(RenderError::Released);
        }

        capture_errors(device, || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
            let call =
                self.encode_draw(device, queue, &mut encoder, target, clear, params, particles)?;
            queue.submit(std::iter::once(encoder.finish()));
            Ok(call)
        })
        .map_err(RenderError::Draw)?
    }

    /// Drop the pipeline and its uniform buffer. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Particle render pipeline released");
        }
    }
}

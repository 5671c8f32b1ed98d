//! Compute stage: one `simulate` dispatch per frame over the particle buffer

use crate::error::SimulationError;
use crate::params::{SimParams, StepParams};
use crate::scope::capture_errors;
use crate::store::{Centers, ParticlesReadWrite};
use crate::tracker::{AllocationToken, OwnedBuffer, ResourceKind, ResourceTracker};
use particle_physics::MAX_WORKGROUP_SIZE;

/// Number of workgroups needed so that `groups * workgroup_size >= particle_count`.
///
/// Rounds up; the kernel discards the trailing invocations past the last particle.
pub fn workgroup_count(particle_count: u32, workgroup_size: u32) -> u32 {
    particle_count.div_ceil(workgroup_size)
}

pub struct ParticleSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params_buffer: OwnedBuffer,
    particle_count: u32,
    center_count: u32,
    workgroups: u32,
    _pipeline_token: AllocationToken,
}

impl ParticleSimulation {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        particles: ParticlesReadWrite<'_>,
        centers: Centers<'_>,
        workgroup_size: u32,
        tracker: &ResourceTracker,
    ) -> Result<Self, SimulationError> {
        log::info!("Initializing ParticleSimulation...");

        let limits = device.limits();
        let max_size = MAX_WORKGROUP_SIZE
            .min(limits.max_compute_workgroup_size_x)
            .min(limits.max_compute_invocations_per_workgroup);
        if workgroup_size == 0 || workgroup_size > max_size {
            return Err(SimulationError::InvalidWorkgroupSize {
                size: workgroup_size,
                max: max_size,
            });
        }

        let particle_count = particles.count();
        let workgroups = workgroup_count(particle_count, workgroup_size);
        if workgroups > limits.max_compute_workgroups_per_dimension {
            return Err(SimulationError::TooManyWorkgroups {
                groups: workgroups,
                limit: limits.max_compute_workgroups_per_dimension,
            });
        }

        let (pipeline, bind_group, params_buffer) = capture_errors(&device, || {
            let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Simulation Params Buffer"),
                size: std::mem::size_of::<SimParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Simulate Compute Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/simulate.wgsl").into()),
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Simulation Bind Group Layout"),
                    entries: &[
                        // Params (Uniform) - Binding 0
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Particles (Storage, read-write) - Binding 1
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: false },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Centers (Storage, read) - Binding 2
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Simulation Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Simulate Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("simulate"),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &[("WORKGROUP_SIZE", workgroup_size as f64)],
                    ..Default::default()
                },
                cache: None,
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Simulation Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: particles.binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: centers.binding(),
                    },
                ],
            });

            (pipeline, bind_group, params_buffer)
        })
        .map_err(SimulationError::Pipeline)?;

        log::info!(
            "Simulation pipeline created ({} workgroups of {})",
            workgroups,
            workgroup_size
        );

        Ok(Self {
            params_buffer: OwnedBuffer::new(params_buffer, tracker),
            _pipeline_token: tracker.register(ResourceKind::Pipeline),
            device,
            queue,
            pipeline,
            bind_group,
            particle_count,
            center_count: centers.count(),
            workgroups,
        })
    }

    /// Write this frame's parameters and record the dispatch into `encoder`.
    ///
    /// The parameter write is queued and lands before the encoder's commands
    /// once it is submitted.
    pub fn encode_step(&self, encoder: &mut wgpu::CommandEncoder, step: &StepParams) {
        let params = SimParams::new(step, self.particle_count, self.center_count);
        self.queue
            .write_buffer(self.params_buffer.buffer(), 0, bytemuck::cast_slice(&[params]));

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Simulate Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, &self.bind_group, &[]);
        compute_pass.dispatch_workgroups(self.workgroups, 1, 1);
    }

    /// Step the simulation forward by one timestep and submit it.
    pub fn step(&self, step: &StepParams) -> Result<(), SimulationError> {
        capture_errors(&self.device, || {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Simulation Encoder"),
                });
            self.encode_step(&mut encoder, step);
            self.queue.submit(std::iter::once(encoder.finish()));
        })
        .map_err(SimulationError::Dispatch)
    }

    pub fn workgroups(&self) -> u32 {
        self.workgroups
    }
}

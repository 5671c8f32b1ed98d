//! Uniform block for the `simulate` kernel

use bytemuck::{Pod, Zeroable};
pub use particle_physics::StepParams;

/// Matches `SimParams` in `shaders/simulate.wgsl` (48 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    pub gravity: [f32; 3],
    pub time_step: f32,

    pub area_size: [f32; 3],
    pub elapsed_time: f32,

    pub intensity: f32,
    pub particle_count: u32,
    pub center_count: u32,
    pub _padding: u32,
}

impl SimParams {
    pub fn new(step: &StepParams, particle_count: u32, center_count: u32) -> Self {
        Self {
            gravity: step.gravity.to_array(),
            time_step: step.time_step,
            area_size: step.area_size.to_array(),
            elapsed_time: step.elapsed_time,
            intensity: step.intensity,
            particle_count,
            center_count,
            _padding: 0,
        }
    }
}

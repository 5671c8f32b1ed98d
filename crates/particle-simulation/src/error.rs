//! Error types for buffer allocation and compute dispatch

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("particle count must be non-zero")]
    EmptyParticleBuffer,
    #[error("{label} needs {requested} bytes but the device allows at most {limit}")]
    ExceedsLimit {
        label: &'static str,
        requested: u64,
        limit: u64,
    },
    #[error("failed to allocate {label}: {source}")]
    Allocation {
        label: &'static str,
        #[source]
        source: wgpu::Error,
    },
    #[error("particle buffer has already been seeded")]
    AlreadySeeded,
    #[error("expected {expected} center points, got {actual}")]
    CenterCountMismatch { expected: u32, actual: usize },
    #[error("particle store has been released")]
    Released,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("workgroup size {size} is outside 1..={max}")]
    InvalidWorkgroupSize { size: u32, max: u32 },
    #[error("dispatch needs {groups} workgroups but the device allows at most {limit}")]
    TooManyWorkgroups { groups: u32, limit: u32 },
    #[error("failed to build compute pipeline: {0}")]
    Pipeline(#[source] wgpu::Error),
    #[error("compute dispatch failed: {0}")]
    Dispatch(#[source] wgpu::Error),
}

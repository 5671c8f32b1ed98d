//! Live device allocation accounting
//!
//! Every device resource owned by the pipeline registers an [`AllocationToken`]
//! with a shared [`ResourceTracker`]. Dropping the token (which happens when the
//! owning resource is released) decrements the live count, so a tracker that
//! reads zero after teardown proves nothing leaked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Buffer,
    Texture,
    Pipeline,
}

#[derive(Debug, Default)]
struct Counters {
    buffers: AtomicUsize,
    textures: AtomicUsize,
    pipelines: AtomicUsize,
    total: AtomicUsize,
}

impl Counters {
    fn slot(&self, kind: ResourceKind) -> &AtomicUsize {
        match kind {
            ResourceKind::Buffer => &self.buffers,
            ResourceKind::Texture => &self.textures,
            ResourceKind::Pipeline => &self.pipelines,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created resource. The returned token must live
    /// exactly as long as the resource.
    pub fn register(&self, kind: ResourceKind) -> AllocationToken {
        self.counters.slot(kind).fetch_add(1, Ordering::Relaxed);
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        AllocationToken {
            counters: Arc::clone(&self.counters),
            kind,
        }
    }

    pub fn live(&self, kind: ResourceKind) -> usize {
        self.counters.slot(kind).load(Ordering::Relaxed)
    }

    pub fn live_total(&self) -> usize {
        self.live(ResourceKind::Buffer)
            + self.live(ResourceKind::Texture)
            + self.live(ResourceKind::Pipeline)
    }

    /// Number of registrations ever made, including released ones
    pub fn total_allocations(&self) -> usize {
        self.counters.total.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct AllocationToken {
    counters: Arc<Counters>,
    kind: ResourceKind,
}

impl AllocationToken {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for AllocationToken {
    fn drop(&mut self) {
        self.counters.slot(self.kind).fetch_sub(1, Ordering::Relaxed);
    }
}

/// A device buffer that is destroyed when dropped.
///
/// `wgpu` frees a buffer only once every bind group referencing it is gone;
/// `destroy` releases the memory immediately, which is what teardown needs.
#[derive(Debug)]
pub struct OwnedBuffer {
    buffer: wgpu::Buffer,
    _token: AllocationToken,
}

impl OwnedBuffer {
    pub fn new(buffer: wgpu::Buffer, tracker: &ResourceTracker) -> Self {
        Self {
            buffer,
            _token: tracker.register(ResourceKind::Buffer),
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_balance() {
        let tracker = ResourceTracker::new();
        let a = tracker.register(ResourceKind::Buffer);
        let b = tracker.register(ResourceKind::Buffer);
        let p = tracker.register(ResourceKind::Pipeline);

        assert_eq!(tracker.live(ResourceKind::Buffer), 2);
        assert_eq!(tracker.live(ResourceKind::Pipeline), 1);
        assert_eq!(tracker.live_total(), 3);

        drop(a);
        drop(p);
        assert_eq!(tracker.live(ResourceKind::Buffer), 1);
        assert_eq!(tracker.live(ResourceKind::Pipeline), 0);

        drop(b);
        assert_eq!(tracker.live_total(), 0);
        assert_eq!(tracker.total_allocations(), 3);
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = ResourceTracker::new();
        let clone = tracker.clone();
        let token = clone.register(ResourceKind::Texture);
        assert_eq!(tracker.live(ResourceKind::Texture), 1);
        assert_eq!(token.kind(), ResourceKind::Texture);
        drop(token);
        assert_eq!(tracker.live(ResourceKind::Texture), 0);
    }
}

mod common;

use gpu_particles::{CenterPoint, ResourceKind, ResourceTracker, SeedRadii};
use particle_simulation::{ParticleStore, StoreError};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_seeded_buffer_holds_every_particle_within_radii() {
    let Some((device, queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    let radii = SeedRadii::default();

    let mut store = ParticleStore::initialize(&device, 1000, 8, &tracker).expect("allocate");
    assert_eq!(store.particle_count(), 1000);
    assert_eq!(store.center_count(), 8);
    store
        .seed(&queue, &mut StdRng::seed_from_u64(5), radii)
        .expect("seed");

    let records = common::read_particles(&device, &queue, store.read_only().expect("handle"));
    assert_eq!(records.len(), 1000);
    for record in &records {
        assert!(record.velocity().length() <= radii.velocity * (1.0 + 1e-5));
        assert!(record.position().length() <= radii.position * (1.0 + 1e-5));
    }
    assert!(records.iter().any(|r| r.position().length() > 1.0));
}

#[test]
fn test_seed_is_one_shot() {
    let Some((device, queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    let mut store = ParticleStore::initialize(&device, 64, 4, &tracker).expect("allocate");
    let mut rng = StdRng::seed_from_u64(1);

    store.seed(&queue, &mut rng, SeedRadii::default()).expect("seed");
    assert!(store.is_seeded());
    assert!(matches!(
        store.seed(&queue, &mut rng, SeedRadii::default()),
        Err(StoreError::AlreadySeeded)
    ));
}

#[test]
fn test_release_is_idempotent() {
    let Some((device, _queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    let mut store = ParticleStore::initialize(&device, 256, 32, &tracker).expect("allocate");
    assert_eq!(tracker.live(ResourceKind::Buffer), 2);

    store.release();
    assert!(store.is_released());
    assert_eq!(tracker.live(ResourceKind::Buffer), 0);

    store.release();
    assert!(store.is_released());
    assert!(matches!(store.read_write(), Err(StoreError::Released)));
    assert!(matches!(store.read_only(), Err(StoreError::Released)));
}

#[test]
fn test_drop_releases_buffers() {
    let Some((device, _queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    {
        let _store = ParticleStore::initialize(&device, 128, 2, &tracker).expect("allocate");
        assert_eq!(tracker.live_total(), 2);
    }
    assert_eq!(tracker.live_total(), 0);
}

#[test]
fn test_rejects_empty_and_oversized_buffers() {
    let Some((device, _queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();

    assert!(matches!(
        ParticleStore::initialize(&device, 0, 8, &tracker),
        Err(StoreError::EmptyParticleBuffer)
    ));
    assert!(matches!(
        ParticleStore::initialize(&device, u32::MAX, 8, &tracker),
        Err(StoreError::ExceedsLimit { .. })
    ));
    assert_eq!(tracker.live_total(), 0);
}

#[test]
fn test_zero_centers_still_binds() {
    let Some((device, queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    let mut store = ParticleStore::initialize(&device, 16, 0, &tracker).expect("allocate");
    store
        .seed(&queue, &mut StdRng::seed_from_u64(2), SeedRadii::default())
        .expect("seed");
    assert_eq!(store.centers().expect("centers").count(), 0);
    store.write_centers(&queue, &[]).expect("empty write");
}

#[test]
fn test_write_centers_checks_length() {
    let Some((device, queue)) = common::gpu() else {
        return;
    };
    let tracker = ResourceTracker::new();
    let store = ParticleStore::initialize(&device, 16, 4, &tracker).expect("allocate");

    assert!(matches!(
        store.write_centers(&queue, &[CenterPoint::ORIGIN; 3]),
        Err(StoreError::CenterCountMismatch {
            expected: 4,
            actual: 3
        })
    ));
    store
        .write_centers(&queue, &[CenterPoint::ORIGIN; 4])
        .expect("matching write");
}

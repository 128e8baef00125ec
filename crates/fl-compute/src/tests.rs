//! Unit tests for fl-compute.

use fl_agent::{AgentRecord, AgentStore};
use glam::Vec3;

/// Store with `n` agents whose heading encodes their index.
fn indexed_store(n: usize) -> AgentStore {
    let mut store = AgentStore::new();
    for i in 0..n {
        let f = i as f32;
        store.append(AgentRecord::new(Vec3::new(f, 0.0, 0.0), Vec3::new(f, f + 0.5, -f)));
    }
    store
}

#[cfg(test)]
mod groups {
    use crate::{THREADS_PER_GROUP, thread_groups};

    #[test]
    fn ceil_division() {
        assert_eq!(THREADS_PER_GROUP, 512);
        assert_eq!(thread_groups(0), 0);
        assert_eq!(thread_groups(1), 1);
        assert_eq!(thread_groups(512), 1);
        assert_eq!(thread_groups(513), 2);
        assert_eq!(thread_groups(1_024), 2);
        assert_eq!(thread_groups(1_025), 3);
    }
}

#[cfg(test)]
mod params {
    use fl_core::FlockParams;
    use glam::Vec3;

    use crate::KernelParams;

    #[test]
    fn squares_distances_and_copies_origin() {
        let p = FlockParams {
            view_distance:          2.0,
            alignment_coefficient:  0.1,
            cohesion_coefficient:   0.2,
            separation_coefficient: 0.3,
            max_wander_range:       10.0,
            origin:                 Vec3::new(1.0, 2.0, 3.0),
        };
        let k = KernelParams::new(&p, 77);
        assert_eq!(k.agent_count, 77);
        assert_eq!(k.flock_origin, [1.0, 2.0, 3.0]);
        assert_eq!(k.max_view_distance_squared, 4.0);
        assert_eq!(k.max_wander_distance_squared, 100.0);
        assert_eq!(k.alignment_coefficient, 0.1);
        assert_eq!(k.cohesion_coefficient, 0.2);
        assert_eq!(k.separation_coefficient, 0.3);
    }

    #[test]
    fn block_is_48_bytes() {
        let k = KernelParams::default();
        assert_eq!(bytemuck::bytes_of(&k).len(), 48);
    }
}

#[cfg(test)]
mod round_trip {
    use fl_agent::AgentStore;
    use fl_core::FlockParams;
    use glam::Vec3;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::indexed_store;
    use crate::{DispatchCoordinator, HostDevice, IdentityKernel, KernelParams};

    #[test]
    fn empty_store_makes_no_device_calls() {
        let store = AgentStore::new();
        let mut coord = DispatchCoordinator::new(HostDevice::new(IdentityKernel));
        let result = coord.run_step(store.view(), &FlockParams::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(coord.device().stats().device_calls(), 0);
        assert_eq!(coord.steps(), 0);
    }

    #[test]
    fn identity_kernel_preserves_length_and_order() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut coord = DispatchCoordinator::new(HostDevice::new(IdentityKernel));
        for n in [1usize, 2, 8, 511, 512, 513, 2_000] {
            let mut store = AgentStore::new();
            for _ in 0..n {
                let heading = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
                store.append(fl_agent::AgentRecord::new(Vec3::ZERO, heading));
            }
            let result = coord.run_step(store.view(), &FlockParams::default()).unwrap();
            assert_eq!(result.len(), n);
            for (i, record) in store.iter().enumerate() {
                assert_eq!(result[i], record.heading, "n = {n}, i = {i}");
            }
        }
    }

    #[test]
    fn one_dispatch_with_ceil_groups_and_no_leaks() {
        let store = indexed_store(1_025);
        let mut coord = DispatchCoordinator::new(HostDevice::new(IdentityKernel));
        coord.run_step(store.view(), &FlockParams::default()).unwrap();

        let stats = coord.device().stats();
        assert_eq!(stats.input_buffers, 1);
        assert_eq!(stats.output_buffers, 1);
        assert_eq!(stats.dispatches, 1);
        assert_eq!(stats.readbacks, 1);
        assert_eq!(stats.releases, 2);
        assert_eq!(stats.live_buffers, 0);
        assert_eq!(stats.peak_live_buffers, 2);
        assert_eq!(stats.last_thread_groups, 3);
        assert_eq!(coord.steps(), 1);
    }

    #[test]
    fn kernel_sees_count_and_params() {
        let kernel = |i: usize, agents: &[fl_agent::AgentRecord], p: &KernelParams| {
            assert_eq!(agents.len(), p.agent_count());
            Vec3::new(i as f32, p.max_view_distance_squared, p.agent_count as f32)
        };
        let store = indexed_store(5);
        let params = FlockParams { view_distance: 3.0, ..Default::default() };
        let mut coord = DispatchCoordinator::new(HostDevice::new(kernel));
        let result = coord.run_step(store.view(), &params).unwrap();
        assert_eq!(result.as_slice()[4], Vec3::new(4.0, 9.0, 5.0));
    }

    #[test]
    fn kernel_reads_uploaded_positions() {
        let store = indexed_store(3);
        let mut coord = DispatchCoordinator::new(HostDevice::new(
            |i: usize, agents: &[fl_agent::AgentRecord], _: &KernelParams| agents[i].position,
        ));
        let result = coord.run_step(store.view(), &FlockParams::default()).unwrap();
        assert_eq!(result.into_vec(), vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)]);
    }
}

#[cfg(test)]
mod failures {
    use fl_core::FlockParams;

    use super::indexed_store;
    use crate::{
        DeviceCall, DeviceError, DispatchCoordinator, DispatchError, HostDevice, IdentityKernel,
    };

    fn coordinator() -> DispatchCoordinator<HostDevice<IdentityKernel>> {
        DispatchCoordinator::new(HostDevice::new(IdentityKernel))
    }

    #[test]
    fn every_failing_call_releases_what_was_acquired() {
        let store = indexed_store(10);
        for (call, acquired) in [
            (DeviceCall::CreateInput, 0),
            (DeviceCall::CreateOutput, 1),
            (DeviceCall::Dispatch, 2),
            (DeviceCall::ReadHeadings, 2),
        ] {
            let mut coord = coordinator();
            coord.device_mut().fail_on(call);
            let err = coord.run_step(store.view(), &FlockParams::default()).unwrap_err();
            assert!(matches!(err, DispatchError::DeviceResourceExhausted(_)), "{call:?}: {err}");

            let stats = coord.device().stats();
            assert_eq!(stats.buffers_allocated(), acquired, "{call:?}");
            assert_eq!(stats.releases, acquired, "{call:?}");
            assert_eq!(stats.live_buffers, 0, "{call:?} leaked a buffer");
            assert_eq!(coord.steps(), 0);
        }
    }

    #[test]
    fn recovers_on_next_frame() {
        let store = indexed_store(4);
        let mut coord = coordinator();
        coord.device_mut().fail_on(DeviceCall::Dispatch);
        assert!(coord.run_step(store.view(), &FlockParams::default()).is_err());
        coord.device_mut().clear_fault();
        let result = coord.run_step(store.view(), &FlockParams::default()).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(coord.device().stats().live_buffers, 0);
    }

    #[test]
    fn oversized_buffer_is_resource_exhaustion() {
        let store = indexed_store(100);
        // Input needs 2400 bytes.
        let mut coord = DispatchCoordinator::new(HostDevice::new(IdentityKernel).with_max_buffer_bytes(1_000));
        let err = coord.run_step(store.view(), &FlockParams::default()).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::DeviceResourceExhausted(DeviceError::BufferAllocation { bytes: 2_400, .. })
        ));
        assert_eq!(coord.device().stats().live_buffers, 0);
    }

    #[test]
    fn unbound_kernel_is_resource_exhaustion() {
        let store = indexed_store(3);
        let mut coord = DispatchCoordinator::new(HostDevice::<IdentityKernel>::unbound());
        let err = coord.run_step(store.view(), &FlockParams::default()).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::DeviceResourceExhausted(DeviceError::KernelUnavailable(_))
        ));
        assert_eq!(coord.device().stats().live_buffers, 0);
    }

    #[test]
    fn short_readback_is_size_mismatch() {
        let store = indexed_store(6);
        let mut coord = coordinator();
        coord.device_mut().truncate_readback(5);
        let err = coord.run_step(store.view(), &FlockParams::default()).unwrap_err();
        assert!(matches!(err, DispatchError::ResultSizeMismatch { expected: 6, got: 5 }));
        assert_eq!(coord.device().stats().live_buffers, 0);
        assert_eq!(coord.steps(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "buffer released twice")]
    fn double_release_is_caught() {
        use crate::ComputeDevice;

        let mut device = HostDevice::new(IdentityKernel);
        let buffer = device.create_output_buffer(4).unwrap();
        device.release(buffer);
        let stray = crate::HostBuffer::Headings(Vec::new());
        device.release(stray);
    }

    #[test]
    fn error_messages() {
        let e = DispatchError::ResultSizeMismatch { expected: 6, got: 5 };
        assert_eq!(e.to_string(), "readback returned 5 headings for 6 agents");
        let e = DispatchError::from(DeviceError::Submission("queue lost".into()));
        assert_eq!(e.to_string(), "device resources exhausted: dispatch submission failed: queue lost");
    }
}

#[cfg(all(test, feature = "gpu"))]
mod gpu {
    use fl_core::FlockParams;

    use super::indexed_store;
    use crate::{DeviceError, DispatchCoordinator, IDENTITY_KERNEL_WGSL, WgpuDevice};

    /// Runs only where an adapter exists; skipped silently otherwise.
    #[test]
    fn identity_kernel_on_gpu() {
        let device = match WgpuDevice::new(IDENTITY_KERNEL_WGSL) {
            Ok(d) => d,
            Err(DeviceError::NoAdapter) => return,
            Err(e) => panic!("device creation failed: {e}"),
        };
        let store = indexed_store(600);
        let mut coord = DispatchCoordinator::new(device);
        let result = coord.run_step(store.view(), &FlockParams::default()).unwrap();
        assert_eq!(result.len(), 600);
        for (i, r) in store.iter().enumerate() {
            assert_eq!(result[i], r.heading);
        }
    }

    #[test]
    fn invalid_kernel_is_unavailable() {
        match WgpuDevice::new("this is not wgsl") {
            Err(DeviceError::KernelUnavailable(_)) | Err(DeviceError::NoAdapter) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("invalid WGSL accepted"),
        }
    }
}

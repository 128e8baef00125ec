//! Unit tests for fl-sim.

use fl_compute::{HostDevice, HostKernel, IdentityKernel};
use fl_core::FlockConfig;
use fl_transform::SimTransformFactory;

use crate::{Flock, FlockBuilder};

fn config(initial: usize) -> FlockConfig {
    FlockConfig {
        initial_agent_count: initial,
        spawn_radius:        0.0,
        agent_speed:         1.0,
        num_threads:         Some(2),
        ..Default::default()
    }
}

fn flock_with<K: HostKernel>(
    config: FlockConfig,
    kernel: K,
) -> Flock<HostDevice<K>, SimTransformFactory> {
    FlockBuilder::new(config, HostDevice::new(kernel), SimTransformFactory::new())
        .build()
        .unwrap()
}

fn identity_flock(initial: usize) -> Flock<HostDevice<IdentityKernel>, SimTransformFactory> {
    flock_with(config(initial), IdentityKernel)
}

#[cfg(test)]
mod build {
    use fl_agent::DEFAULT_CAPACITY;
    use fl_compute::{HostDevice, IdentityKernel};
    use fl_core::{FORWARD, FlockConfig, FlockParams};
    use fl_transform::SimTransformFactory;
    use glam::Vec3;

    use super::{config, identity_flock};
    use crate::{FlockBuilder, FlockError};

    #[test]
    fn default_config_spawns_256_within_radius() {
        let flock = FlockBuilder::new(
            FlockConfig::default(),
            HostDevice::new(IdentityKernel),
            SimTransformFactory::new(),
        )
        .build()
        .unwrap();
        assert_eq!(flock.agent_count(), 256);
        assert_eq!(flock.capacity(), 256);
        assert_eq!(flock.handles().len(), 256);
        assert_eq!(flock.factory().spawned(), 256);
        for r in flock.store().iter() {
            assert!(r.position.abs().max_element() <= 20.0, "{}", r.position);
            assert_eq!(r.heading, FORWARD);
        }
    }

    #[test]
    fn records_mirror_handles() {
        let flock = FlockBuilder::new(
            FlockConfig { initial_agent_count: 10, ..Default::default() },
            HostDevice::new(IdentityKernel),
            SimTransformFactory::new(),
        )
        .build()
        .unwrap();
        for (r, h) in flock.store().iter().zip(flock.handles()) {
            assert_eq!(r.position, h.position);
        }
    }

    #[test]
    fn empty_flock_uses_default_capacity() {
        let flock = identity_flock(0);
        assert_eq!(flock.agent_count(), 0);
        assert_eq!(flock.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn explicit_capacity_wins() {
        let cfg = FlockConfig { initial_capacity: Some(3), ..config(2) };
        let flock = FlockBuilder::new(cfg, HostDevice::new(IdentityKernel), SimTransformFactory::new())
            .build()
            .unwrap();
        assert_eq!(flock.capacity(), 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = FlockConfig {
            params: FlockParams { view_distance: -1.0, ..Default::default() },
            ..Default::default()
        };
        let err = FlockBuilder::new(cfg, HostDevice::new(IdentityKernel), SimTransformFactory::new())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, FlockError::Config(_)));
    }

    #[test]
    fn same_seed_same_scatter() {
        let cfg = FlockConfig { initial_agent_count: 32, seed: 9, ..Default::default() };
        let a = FlockBuilder::new(cfg.clone(), HostDevice::new(IdentityKernel), SimTransformFactory::new())
            .build()
            .unwrap();
        let b = FlockBuilder::new(cfg, HostDevice::new(IdentityKernel), SimTransformFactory::new())
            .build()
            .unwrap();
        let pa: Vec<Vec3> = a.store().iter().map(|r| r.position).collect();
        let pb: Vec<Vec3> = b.store().iter().map(|r| r.position).collect();
        assert_eq!(pa, pb);
    }
}

#[cfg(test)]
mod step {
    use fl_agent::{AgentRecord, DEFAULT_CAPACITY};
    use fl_compute::{DeviceCall, KernelParams};
    use fl_core::{AgentId, FORWARD, Frame};
    use glam::Vec3;

    use super::{config, flock_with, identity_flock};
    use crate::FlockError;

    #[test]
    fn three_agents_move_along_heading() {
        let mut flock = identity_flock(3);
        flock.step(1.0).unwrap();

        assert_eq!(flock.agent_count(), 3);
        for (i, h) in flock.handles().iter().enumerate() {
            let r = flock.agent(AgentId(i as u32)).unwrap();
            assert_eq!(r.position, Vec3::ZERO + FORWARD);
            assert_eq!(r.heading, FORWARD);
            assert_eq!(h.position, r.position);
        }
        assert_eq!(flock.clock().current_frame, Frame(1));
    }

    #[test]
    fn delta_speed_scales_translation() {
        let mut flock = identity_flock(1);
        flock.set_agent_speed(3.0);
        flock.step(0.5).unwrap();
        flock.step(0.5).unwrap();
        assert_eq!(flock.agent(AgentId(0)).unwrap().position, FORWARD * 3.0);
        assert_eq!(flock.clock().elapsed_secs, 1.0);
    }

    #[test]
    fn zero_agents_allocate_no_buffers() {
        let mut flock = identity_flock(0);
        flock.step(1.0).unwrap();
        let stats = flock.coordinator().device().stats();
        assert_eq!(stats.device_calls(), 0);
        assert_eq!(stats.peak_live_buffers, 0);
        assert_eq!(flock.clock().current_frame, Frame(1));
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut flock = identity_flock(4);
        let before: Vec<AgentRecord> = flock.store().iter().copied().collect();

        flock.coordinator_mut().device_mut().fail_on(DeviceCall::ReadHeadings);
        let err = flock.step(1.0).unwrap_err();
        assert!(matches!(err, FlockError::Dispatch(_)));
        assert_eq!(flock.store().iter().copied().collect::<Vec<_>>(), before);
        assert!(flock.handles().iter().all(|h| h.position == Vec3::ZERO));
        assert_eq!(flock.clock().current_frame, Frame(0));
        assert_eq!(flock.coordinator().device().stats().live_buffers, 0);

        flock.coordinator_mut().device_mut().clear_fault();
        flock.step(1.0).unwrap();
        assert_eq!(flock.agent(AgentId(3)).unwrap().position, FORWARD);
    }

    #[test]
    fn param_edits_reach_the_next_dispatch() {
        let kernel = |_: usize, _: &[AgentRecord], p: &KernelParams| Vec3::splat(p.cohesion_coefficient);
        let mut flock = flock_with(config(2), kernel);
        flock.params_mut().cohesion_coefficient = 2.0;
        flock.step(1.0).unwrap();
        assert_eq!(flock.agent(AgentId(1)).unwrap().heading, Vec3::splat(2.0));
        assert_eq!(flock.agent(AgentId(1)).unwrap().position, Vec3::splat(2.0));
    }

    #[test]
    fn spawning_past_default_capacity_doubles_once() {
        let mut flock = identity_flock(0);
        let ids = flock.spawn_agents(DEFAULT_CAPACITY + 1).unwrap();
        assert_eq!(ids.len(), 9);
        assert_eq!(ids[8], AgentId(8));
        assert_eq!(flock.capacity(), 16);
        assert_eq!(flock.store().resize_count(), 1);
        flock.step(1.0).unwrap();
        assert_eq!(flock.coordinator().device().stats().last_thread_groups, 1);
    }

    #[test]
    fn out_of_range_agent() {
        let flock = identity_flock(2);
        assert!(matches!(flock.agent(AgentId(2)), Err(FlockError::Store(_))));
    }
}

#[cfg(test)]
mod observer {
    use fl_agent::AgentView;
    use fl_core::{AgentId, Frame};

    use fl_compute::{HostDevice, IdentityKernel};
    use fl_transform::{SimTransform, SimTransformFactory, SpawnError, TransformFactory};
    use glam::{Quat, Vec3};

    use super::{config, identity_flock};
    use crate::{FlockBuilder, FlockError, FlockObserver};

    #[derive(Default)]
    struct Recorder {
        starts: Vec<(Frame, usize)>,
        ends:   Vec<(Frame, usize)>,
        spawns: Vec<(AgentId, usize)>,
    }

    impl FlockObserver for Recorder {
        fn on_step_start(&mut self, frame: Frame, agent_count: usize) {
            self.starts.push((frame, agent_count));
        }
        fn on_step_end(&mut self, frame: Frame, agents: AgentView<'_>) {
            self.ends.push((frame, agents.len()));
        }
        fn on_spawn(&mut self, first: AgentId, count: usize) {
            self.spawns.push((first, count));
        }
    }

    #[test]
    fn hooks_fire_in_order() {
        let mut flock = identity_flock(2);
        let mut rec = Recorder::default();
        flock.step_observed(0.1, &mut rec).unwrap();
        flock.spawn_agents_observed(3, &mut rec).unwrap();
        flock.spawn_agents_observed(0, &mut rec).unwrap();
        flock.step_observed(0.1, &mut rec).unwrap();

        assert_eq!(rec.starts, vec![(Frame(0), 2), (Frame(1), 5)]);
        assert_eq!(rec.ends, vec![(Frame(0), 2), (Frame(1), 5)]);
        assert_eq!(rec.spawns, vec![(AgentId(2), 3)]);
    }

    /// Hands out `budget` transforms, then refuses.
    struct BudgetFactory {
        inner:  SimTransformFactory,
        budget: usize,
    }

    impl TransformFactory for BudgetFactory {
        type Handle = SimTransform;

        fn spawn(&mut self, position: Vec3, orientation: Quat) -> Result<SimTransform, SpawnError> {
            if self.budget == 0 {
                return Err(SpawnError::Rejected("out of transforms".into()));
            }
            self.budget -= 1;
            self.inner.spawn(position, orientation)
        }
    }

    #[test]
    fn partial_spawn_reports_kept_agents() {
        let factory = BudgetFactory { inner: SimTransformFactory::new(), budget: 3 };
        let mut flock = FlockBuilder::new(config(1), HostDevice::new(IdentityKernel), factory)
            .build()
            .unwrap();
        let mut rec = Recorder::default();

        let err = flock.spawn_agents_observed(5, &mut rec).unwrap_err();
        assert!(matches!(err, FlockError::Spawn(SpawnError::Rejected(_))));
        assert_eq!(flock.agent_count(), 3);
        assert_eq!(flock.handles().len(), 3);
        for (r, h) in flock.store().iter().zip(flock.handles()) {
            assert_eq!(r.position, h.position);
        }
        assert_eq!(rec.spawns, vec![(AgentId(1), 2)]);

        // The kept agents step like any others.
        flock.step(1.0).unwrap();
        assert_eq!(flock.coordinator().device().stats().dispatches, 1);
    }

    #[test]
    fn spawn_failing_on_first_agent_reports_nothing() {
        let factory = BudgetFactory { inner: SimTransformFactory::new(), budget: 0 };
        let mut flock = FlockBuilder::new(config(0), HostDevice::new(IdentityKernel), factory)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        assert!(flock.spawn_agents_observed(2, &mut rec).is_err());
        assert_eq!(flock.agent_count(), 0);
        assert!(rec.spawns.is_empty());
    }
}

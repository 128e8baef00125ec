//! The `Flock` struct and its frame step.

use fl_agent::{AgentRecord, AgentStore};
use fl_compute::{ComputeDevice, DispatchCoordinator};
use fl_core::{AgentId, FORWARD, FlockConfig, FlockParams, FrameClock, SimRng};
use fl_transform::{TransformFactory, TransformHandle, TransformUpdateJob};
use glam::Quat;
use tracing::{debug, info, warn};

use crate::{FlockObserver, FlockResult, NoopObserver};

// ── Flock ─────────────────────────────────────────────────────────────────────

/// The per-frame controller.
///
/// `Flock<D, F>` exclusively owns the agent store and the engine transforms
/// (`handles[i]` belongs to agent `i`) and sequences dispatch and apply
/// each frame.  The coordinator and the transform job only ever see
/// borrows that end with the step.
///
/// Create via [`FlockBuilder`][crate::FlockBuilder].
pub struct Flock<D: ComputeDevice, F: TransformFactory> {
    pub(crate) config:      FlockConfig,
    pub(crate) store:       AgentStore,
    pub(crate) handles:     Vec<F::Handle>,
    pub(crate) coordinator: DispatchCoordinator<D>,
    pub(crate) job:         TransformUpdateJob,
    pub(crate) factory:     F,
    pub(crate) rng:         SimRng,
    pub(crate) clock:       FrameClock,
}

impl<D: ComputeDevice, F: TransformFactory> Flock<D, F> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Advance the flock by one frame of `delta_time` seconds.
    pub fn step(&mut self, delta_time: f32) -> FlockResult<()> {
        self.step_observed(delta_time, &mut NoopObserver)
    }

    /// [`step`](Self::step) with observer callbacks.
    ///
    /// On error the store, the handles and the clock are unchanged.
    pub fn step_observed<O: FlockObserver>(&mut self, delta_time: f32, observer: &mut O) -> FlockResult<()> {
        let frame = self.clock.current_frame;
        observer.on_step_start(frame, self.store.count());

        if !self.store.is_empty() {
            let headings = self.coordinator.run_step(self.store.view(), &self.config.params)?;
            let delta_speed = self.config.delta_speed(delta_time);
            self.job.apply(self.store.view_mut(), &mut self.handles, headings, delta_speed)?;
        }

        self.clock.advance(delta_time);
        observer.on_step_end(frame, self.store.view());
        Ok(())
    }

    /// Spawn `n` agents scattered around the flock origin.
    ///
    /// Returns the new ids in order.
    pub fn spawn_agents(&mut self, n: usize) -> FlockResult<Vec<AgentId>> {
        self.spawn_agents_observed(n, &mut NoopObserver)
    }

    /// [`spawn_agents`](Self::spawn_agents) with an observer callback.
    ///
    /// If the factory fails part-way through, agents spawned before the
    /// failure are kept and reported through `on_spawn`; handles and records
    /// stay index-aligned and the factory error is returned.
    pub fn spawn_agents_observed<O: FlockObserver>(
        &mut self,
        n:        usize,
        observer: &mut O,
    ) -> FlockResult<Vec<AgentId>> {
        let origin = self.config.params.origin;
        let radius = self.config.spawn_radius;
        let mut ids = Vec::with_capacity(n);
        let mut failure = None;

        for _ in 0..n {
            let position = self.rng.scatter(origin, radius);
            let handle = match self.factory.spawn(position, Quat::IDENTITY) {
                Ok(handle) => handle,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            let record = AgentRecord { position: handle.position(), heading: FORWARD };
            self.handles.push(handle);
            ids.push(self.store.append(record));
        }
        debug_assert_eq!(self.handles.len(), self.store.count());

        if let Some(&first) = ids.first() {
            info!(
                spawned = ids.len(),
                total = self.store.count(),
                capacity = self.store.capacity(),
                "spawned agents"
            );
            observer.on_spawn(first, ids.len());
        }
        if let Some(e) = failure {
            warn!(requested = n, spawned = ids.len(), error = %e, "spawn batch stopped early");
            return Err(e.into());
        }
        Ok(ids)
    }

    /// Record of one agent.
    pub fn agent(&self, agent: AgentId) -> FlockResult<AgentRecord> {
        Ok(self.store.get(agent)?)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent_count(&self) -> usize {
        self.store.count()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    pub fn handles(&self) -> &[F::Handle] {
        &self.handles
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn params(&self) -> &FlockParams {
        &self.config.params
    }

    /// Parameters are read afresh on every step, so edits take effect on the
    /// next frame.
    pub fn params_mut(&mut self) -> &mut FlockParams {
        &mut self.config.params
    }

    /// Change the per-second agent speed.
    pub fn set_agent_speed(&mut self, speed: f32) {
        debug!(speed, "agent speed changed");
        self.config.agent_speed = speed;
    }

    pub fn coordinator(&self) -> &DispatchCoordinator<D> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut DispatchCoordinator<D> {
        &mut self.coordinator
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

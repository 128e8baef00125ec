//! Fluent builder for constructing a [`Flock`].

use fl_agent::{AgentStore, DEFAULT_CAPACITY};
use fl_compute::{ComputeDevice, DispatchCoordinator};
use fl_core::{FlockConfig, FrameClock, SimRng};
use fl_transform::{TransformFactory, TransformUpdateJob};

use crate::{Flock, FlockObserver, FlockResult, NoopObserver};

/// Fluent builder for [`Flock<D, F>`].
///
/// # Required inputs
///
/// - [`FlockConfig`] — parameters, speed, initial population, seed, …
/// - `D: ComputeDevice` — where the heading kernel runs
/// - `F: TransformFactory` — creates one engine transform per agent
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                           |
/// |---------------------|---------------------------------------------------|
/// | `.transform_job(j)` | Built from `config.num_threads`                   |
/// | `.rng(r)`           | `SimRng::new(config.seed)`                        |
pub struct FlockBuilder<D: ComputeDevice, F: TransformFactory> {
    config:  FlockConfig,
    device:  D,
    factory: F,
    job:     Option<TransformUpdateJob>,
    rng:     Option<SimRng>,
}

impl<D: ComputeDevice, F: TransformFactory> FlockBuilder<D, F> {
    pub fn new(config: FlockConfig, device: D, factory: F) -> Self {
        Self { config, device, factory, job: None, rng: None }
    }

    /// Use an existing transform job instead of building one.
    pub fn transform_job(mut self, job: TransformUpdateJob) -> Self {
        self.job = Some(job);
        self
    }

    /// Override the spawn RNG.
    pub fn rng(mut self, rng: SimRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the config, size the store, and spawn the initial
    /// population.
    pub fn build(self) -> FlockResult<Flock<D, F>> {
        self.build_observed(&mut NoopObserver)
    }

    /// [`build`](Self::build), reporting the initial spawn to `observer`.
    pub fn build_observed<O: FlockObserver>(self, observer: &mut O) -> FlockResult<Flock<D, F>> {
        self.config.validate()?;

        let capacity = self
            .config
            .initial_capacity
            .unwrap_or_else(|| self.config.initial_agent_count.max(DEFAULT_CAPACITY));
        let job = match self.job {
            Some(job) => job,
            None => TransformUpdateJob::from_thread_count(self.config.num_threads)?,
        };
        let rng = self.rng.unwrap_or_else(|| SimRng::new(self.config.seed));
        let initial = self.config.initial_agent_count;

        let mut flock = Flock {
            store:       AgentStore::with_capacity(capacity),
            handles:     Vec::with_capacity(capacity),
            coordinator: DispatchCoordinator::new(self.device),
            factory:     self.factory,
            clock:       FrameClock::new(),
            config:      self.config,
            job,
            rng,
        };
        if initial > 0 {
            flock.spawn_agents_observed(initial, observer)?;
        }
        Ok(flock)
    }
}

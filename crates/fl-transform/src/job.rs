//! `TransformUpdateJob` — fans computed headings out to agent transforms.
//!
//! One work item per agent, executed on a Rayon pool.  Item `i` touches
//! only `records[i]`, `handles[i]` and `headings[i]`, so the result is
//! independent of scheduling order.

use fl_agent::AgentRecord;
use fl_compute::FrameResultBuffer;
use glam::Vec3;
use rayon::prelude::*;
use tracing::debug;

use crate::{TransformError, TransformHandle, TransformResult};

/// Applies one frame's headings to the store and the engine transforms.
///
/// Owns an optional dedicated thread pool.  Without one, work runs on
/// Rayon's global pool.
#[derive(Default)]
pub struct TransformUpdateJob {
    pool: Option<rayon::ThreadPool>,
}

impl TransformUpdateJob {
    /// A job that runs on Rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// A job with its own pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> TransformResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("fl-transform-{i}"))
            .build()
            .map_err(|e| TransformError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// `Some(n)` builds a dedicated pool; `None` uses the global pool.
    pub fn from_thread_count(num_threads: Option<usize>) -> TransformResult<Self> {
        match num_threads {
            Some(n) => Self::with_threads(n),
            None => Ok(Self::new()),
        }
    }

    /// Worker count this job will use.
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// For every agent `i`: orient `handles[i]` along `headings[i]`, move it
    /// by `headings[i] * delta_speed`, then overwrite `records[i]` with the
    /// handle's resulting position and the new heading.
    ///
    /// Consumes `headings`; the buffer is freed when the job finishes.
    ///
    /// # Errors
    ///
    /// [`TransformError::CountMismatch`] if the three lengths differ.
    /// Nothing is mutated in that case.
    pub fn apply<H: TransformHandle>(
        &self,
        records:     &mut [AgentRecord],
        handles:     &mut [H],
        headings:    FrameResultBuffer,
        delta_speed: f32,
    ) -> TransformResult<()> {
        if records.len() != handles.len() || records.len() != headings.len() {
            return Err(TransformError::CountMismatch {
                records:  records.len(),
                handles:  handles.len(),
                headings: headings.len(),
            });
        }
        debug!(agents = records.len(), delta_speed, "applying headings");

        let headings = headings.as_slice();
        let mut run = || {
            records
                .par_iter_mut()
                .zip(handles.par_iter_mut())
                .zip(headings.par_iter())
                .for_each(|((record, handle), &heading)| {
                    update_agent(record, handle, heading, delta_speed);
                });
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        Ok(())
    }
}

/// The per-agent work item.
#[inline]
pub fn update_agent<H: TransformHandle>(
    record:      &mut AgentRecord,
    handle:      &mut H,
    heading:     Vec3,
    delta_speed: f32,
) {
    handle.set_orientation(heading);
    handle.translate(heading * delta_speed);
    *record = AgentRecord { position: handle.position(), heading };
}

//! `DispatchCoordinator` — one synchronous upload → dispatch → readback
//! round trip per frame.

use fl_agent::AgentView;
use fl_core::FlockParams;
use tracing::{debug, warn};

use crate::{
    ComputeDevice, DeviceError, DispatchError, DispatchResult, FrameResultBuffer, KernelParams,
    thread_groups,
};

/// Drives the per-frame protocol against a [`ComputeDevice`].
///
/// # Type parameter
///
/// `D` is the device backend.  Swap it at compile time (`HostDevice` in
/// tests, `WgpuDevice` on a GPU) with no runtime overhead.
///
/// No device state survives between steps: both transient buffers are
/// acquired and released inside [`run_step`](Self::run_step).
pub struct DispatchCoordinator<D: ComputeDevice> {
    device: D,
    /// Number of non-empty steps that completed successfully.
    steps:  u64,
}

impl<D: ComputeDevice> DispatchCoordinator<D> {
    pub fn new(device: D) -> Self {
        Self { device, steps: 0 }
    }

    /// Compute one heading per agent in `view`.
    ///
    /// The view must not be mutated while this runs; holding it as a shared
    /// borrow of the store guarantees that.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::DeviceResourceExhausted`] if any device call fails.
    ///   Buffers acquired before the failure are released first.
    /// - [`DispatchError::ResultSizeMismatch`] if the readback length differs
    ///   from the agent count.
    pub fn run_step(
        &mut self,
        view:   AgentView<'_>,
        params: &FlockParams,
    ) -> DispatchResult<FrameResultBuffer> {
        let count = view.len();
        if count == 0 {
            return Ok(FrameResultBuffer::empty());
        }

        let agent_count = u32::try_from(count).map_err(|_| DeviceError::BufferAllocation {
            bytes:  view.as_bytes().len() as u64,
            reason: format!("{count} agents exceed the kernel's u32 agent count"),
        })?;
        let kernel_params = KernelParams::new(params, agent_count);
        let groups = thread_groups(agent_count);

        debug!(
            backend = self.device.name(),
            agents = count,
            thread_groups = groups,
            "dispatching heading kernel"
        );

        let headings = self.round_trip(view, &kernel_params, groups).inspect_err(|e| {
            warn!(backend = self.device.name(), agents = count, error = %e, "dispatch step failed");
        })?;

        if headings.len() != count {
            warn!(expected = count, got = headings.len(), "heading readback size mismatch");
            return Err(DispatchError::ResultSizeMismatch { expected: count, got: headings.len() });
        }

        self.steps += 1;
        Ok(FrameResultBuffer::from_headings(headings))
    }

    /// Acquire, dispatch, read back, and release.  Every buffer acquired here
    /// is released before this returns, whatever the outcome.
    fn round_trip(
        &mut self,
        view:   AgentView<'_>,
        params: &KernelParams,
        groups: u32,
    ) -> Result<Vec<glam::Vec3>, DeviceError> {
        let count = view.len();

        let input = self.device.create_input_buffer(view)?;

        let mut output = match self.device.create_output_buffer(count) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.device.release(input);
                return Err(e);
            }
        };

        let dispatched = self.device.dispatch(&input, &mut output, params, groups);
        // The upload is consumed by the dispatch; nothing reads it again.
        self.device.release(input);
        if let Err(e) = dispatched {
            self.device.release(output);
            return Err(e);
        }

        let readback = self.device.read_headings(&output, count);
        self.device.release(output);
        readback
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Number of non-empty steps completed successfully.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

//! The `ComputeDevice` trait — the seam between the flock and whatever
//! executes the heading kernel.

use fl_agent::AgentView;
use glam::Vec3;

use crate::{DeviceError, KernelParams};

/// Threads per kernel work group.  The kernel is compiled with this
/// workgroup size and must treat thread indices `>= agent_count` as no-ops.
pub const THREADS_PER_GROUP: u32 = 512;

/// Work groups needed to cover `agent_count` agents: `ceil(count / 512)`.
#[inline]
pub fn thread_groups(agent_count: u32) -> u32 {
    agent_count.div_ceil(THREADS_PER_GROUP)
}

/// A parallel compute unit that turns an agent array into one heading per
/// agent.
///
/// The kernel itself is opaque to the flock: a pure function of
/// `(agents, params) -> headings`.  Implementations only manage buffers and
/// submission.
///
/// # Buffer discipline
///
/// Buffers are owned values handed back to the device through
/// [`release`](Self::release).  [`DispatchCoordinator`][crate::DispatchCoordinator]
/// releases every buffer it acquires exactly once, on success and failure
/// paths alike, so devices may count live buffers to detect leaks.
///
/// # Blocking
///
/// [`read_headings`](Self::read_headings) blocks until the dispatched work
/// has completed.  No method takes a timeout; a hung device blocks the
/// simulation thread.
pub trait ComputeDevice {
    /// Device-visible buffer handle.
    type Buffer;

    /// Allocate an immutable input buffer and upload `agents` verbatim.
    fn create_input_buffer(&mut self, agents: AgentView<'_>) -> Result<Self::Buffer, DeviceError>;

    /// Allocate a writable buffer with room for `len` headings.
    fn create_output_buffer(&mut self, len: usize) -> Result<Self::Buffer, DeviceError>;

    /// Bind `input`, `output` and `params` to the kernel and submit
    /// `thread_groups` work groups of [`THREADS_PER_GROUP`] threads.
    fn dispatch(
        &mut self,
        input:         &Self::Buffer,
        output:        &mut Self::Buffer,
        params:        &KernelParams,
        thread_groups: u32,
    ) -> Result<(), DeviceError>;

    /// Wait for the last dispatch and copy the first `len` headings of
    /// `output` back to host memory.
    fn read_headings(&mut self, output: &Self::Buffer, len: usize) -> Result<Vec<Vec3>, DeviceError>;

    /// Return a buffer to the device.
    fn release(&mut self, buffer: Self::Buffer);

    /// Short human-readable backend name for logs.
    fn name(&self) -> &'static str;
}

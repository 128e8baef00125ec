//! CPU-hosted compute device.
//!
//! `HostDevice` executes a [`HostKernel`] over ordinary `Vec`s while
//! following the same buffer protocol as a GPU backend.  It exists for
//! headless runs and for tests: it counts every call and every live buffer,
//! can impose a per-buffer size limit, and can be told to fail a specific
//! call so failure paths are exercised without real hardware.

use fl_agent::{AgentRecord, AgentView};
use glam::Vec3;
use rayon::prelude::*;

use crate::{ComputeDevice, DeviceError, KernelParams, THREADS_PER_GROUP};

// ── HostKernel ────────────────────────────────────────────────────────────────

/// A heading kernel evaluated on the CPU, one "thread" per agent index.
///
/// Implementations must be pure: the result for `index` may depend only on
/// `agents` and `params`.  Indices are evaluated in parallel and in no
/// particular order.
///
/// Any `Fn(usize, &[AgentRecord], &KernelParams) -> Vec3` closure is a
/// `HostKernel`.
pub trait HostKernel: Send + Sync {
    fn heading(&self, index: usize, agents: &[AgentRecord], params: &KernelParams) -> Vec3;
}

impl<F> HostKernel for F
where
    F: Fn(usize, &[AgentRecord], &KernelParams) -> Vec3 + Send + Sync,
{
    fn heading(&self, index: usize, agents: &[AgentRecord], params: &KernelParams) -> Vec3 {
        self(index, agents, params)
    }
}

/// Returns every agent's current heading unchanged.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityKernel;

impl HostKernel for IdentityKernel {
    #[inline]
    fn heading(&self, index: usize, agents: &[AgentRecord], _params: &KernelParams) -> Vec3 {
        agents[index].heading
    }
}

// ── Buffers and bookkeeping ───────────────────────────────────────────────────

/// Host-memory stand-in for a device buffer.
#[derive(Debug)]
pub enum HostBuffer {
    Agents(Vec<AgentRecord>),
    Headings(Vec<Vec3>),
}

impl HostBuffer {
    fn kind(&self) -> &'static str {
        match self {
            HostBuffer::Agents(_) => "agent",
            HostBuffer::Headings(_) => "heading",
        }
    }
}

/// A [`ComputeDevice`] entry point, used to select which call a
/// [`HostDevice`] should fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceCall {
    CreateInput,
    CreateOutput,
    Dispatch,
    ReadHeadings,
}

/// Call and buffer counters kept by [`HostDevice`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub input_buffers:      u64,
    pub output_buffers:     u64,
    pub dispatches:         u64,
    pub readbacks:          u64,
    pub releases:           u64,
    /// Buffers acquired and not yet released.
    pub live_buffers:       usize,
    pub peak_live_buffers:  usize,
    /// Work groups requested by the most recent dispatch.
    pub last_thread_groups: u32,
}

impl DeviceStats {
    /// Total number of calls that reached the device.
    pub fn device_calls(&self) -> u64 {
        self.input_buffers + self.output_buffers + self.dispatches + self.readbacks + self.releases
    }

    /// Buffers successfully allocated over the device's lifetime.
    pub fn buffers_allocated(&self) -> u64 {
        self.input_buffers + self.output_buffers
    }
}

// ── HostDevice ────────────────────────────────────────────────────────────────

/// CPU implementation of [`ComputeDevice`].
pub struct HostDevice<K: HostKernel> {
    /// `None` models an unbound kernel: dispatch fails with
    /// [`DeviceError::KernelUnavailable`].
    kernel:           Option<K>,
    stats:            DeviceStats,
    max_buffer_bytes: Option<u64>,
    fault:            Option<DeviceCall>,
    readback_limit:   Option<usize>,
}

impl<K: HostKernel> HostDevice<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel:           Some(kernel),
            stats:            DeviceStats::default(),
            max_buffer_bytes: None,
            fault:            None,
            readback_limit:   None,
        }
    }

    /// A device with no kernel bound.
    pub fn unbound() -> Self {
        Self {
            kernel:           None,
            stats:            DeviceStats::default(),
            max_buffer_bytes: None,
            fault:            None,
            readback_limit:   None,
        }
    }

    /// Refuse any single buffer larger than `bytes`.
    pub fn with_max_buffer_bytes(mut self, bytes: u64) -> Self {
        self.max_buffer_bytes = Some(bytes);
        self
    }

    /// Make every subsequent `call` fail until [`clear_fault`](Self::clear_fault).
    pub fn fail_on(&mut self, call: DeviceCall) {
        self.fault = Some(call);
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// Return at most `len` headings from every readback, simulating a
    /// kernel that disagrees about the agent count.
    pub fn truncate_readback(&mut self, len: usize) {
        self.readback_limit = Some(len);
    }

    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    fn check_fault(&self, call: DeviceCall) -> Result<(), DeviceError> {
        if self.fault != Some(call) {
            return Ok(());
        }
        Err(match call {
            DeviceCall::CreateInput | DeviceCall::CreateOutput => DeviceError::BufferAllocation {
                bytes:  0,
                reason: format!("injected fault on {call:?}"),
            },
            DeviceCall::Dispatch => DeviceError::Submission(format!("injected fault on {call:?}")),
            DeviceCall::ReadHeadings => DeviceError::Readback(format!("injected fault on {call:?}")),
        })
    }

    fn check_size(&self, bytes: u64) -> Result<(), DeviceError> {
        match self.max_buffer_bytes {
            Some(max) if bytes > max => Err(DeviceError::BufferAllocation {
                bytes,
                reason: format!("exceeds device limit of {max} bytes"),
            }),
            _ => Ok(()),
        }
    }

    fn acquired(&mut self) {
        self.stats.live_buffers += 1;
        self.stats.peak_live_buffers = self.stats.peak_live_buffers.max(self.stats.live_buffers);
    }
}

impl<K: HostKernel> ComputeDevice for HostDevice<K> {
    type Buffer = HostBuffer;

    fn create_input_buffer(&mut self, agents: AgentView<'_>) -> Result<HostBuffer, DeviceError> {
        self.check_fault(DeviceCall::CreateInput)?;
        self.check_size(agents.as_bytes().len() as u64)?;
        self.stats.input_buffers += 1;
        self.acquired();
        Ok(HostBuffer::Agents(agents.records().to_vec()))
    }

    fn create_output_buffer(&mut self, len: usize) -> Result<HostBuffer, DeviceError> {
        self.check_fault(DeviceCall::CreateOutput)?;
        self.check_size((len * std::mem::size_of::<Vec3>()) as u64)?;
        self.stats.output_buffers += 1;
        self.acquired();
        Ok(HostBuffer::Headings(vec![Vec3::ZERO; len]))
    }

    fn dispatch(
        &mut self,
        input:         &HostBuffer,
        output:        &mut HostBuffer,
        params:        &KernelParams,
        thread_groups: u32,
    ) -> Result<(), DeviceError> {
        self.check_fault(DeviceCall::Dispatch)?;
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| DeviceError::KernelUnavailable("no kernel bound to host device".into()))?;

        let (agents, headings) = match (input, output) {
            (HostBuffer::Agents(agents), HostBuffer::Headings(headings)) => (agents, headings),
            (input, output) => {
                return Err(DeviceError::Submission(format!(
                    "expected agent/heading buffers, got {}/{}",
                    input.kind(),
                    output.kind()
                )));
            }
        };

        let threads = thread_groups as usize * THREADS_PER_GROUP as usize;
        let n = params.agent_count();
        if threads < n {
            return Err(DeviceError::Submission(format!(
                "{thread_groups} groups cover {threads} threads, need {n}"
            )));
        }
        if agents.len() < n || headings.len() < n {
            return Err(DeviceError::Submission(format!(
                "agent_count {n} exceeds bound buffers ({} agents, {} headings)",
                agents.len(),
                headings.len()
            )));
        }

        // Threads n..threads are the kernel's out-of-range no-ops.
        headings[..n]
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, h)| *h = kernel.heading(i, agents, params));

        self.stats.dispatches += 1;
        self.stats.last_thread_groups = thread_groups;
        Ok(())
    }

    fn read_headings(&mut self, output: &HostBuffer, len: usize) -> Result<Vec<Vec3>, DeviceError> {
        self.check_fault(DeviceCall::ReadHeadings)?;
        let HostBuffer::Headings(headings) = output else {
            return Err(DeviceError::Readback(format!("cannot read headings from {} buffer", output.kind())));
        };
        self.stats.readbacks += 1;
        let len = len.min(headings.len()).min(self.readback_limit.unwrap_or(usize::MAX));
        Ok(headings[..len].to_vec())
    }

    fn release(&mut self, _buffer: HostBuffer) {
        debug_assert!(self.stats.live_buffers > 0, "buffer released twice");
        self.stats.releases += 1;
        self.stats.live_buffers -= 1;
    }

    fn name(&self) -> &'static str {
        "host"
    }
}

use thiserror::Error;

/// Failures reported by a [`ComputeDevice`][crate::ComputeDevice].
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("allocation of {bytes} bytes failed: {reason}")]
    BufferAllocation { bytes: u64, reason: String },

    #[error("dispatch submission failed: {0}")]
    Submission(String),

    /// The kernel is missing, unbound, or failed to build.
    #[error("compute kernel unavailable: {0}")]
    KernelUnavailable(String),

    #[error("readback failed: {0}")]
    Readback(String),

    #[error("no compatible compute adapter found")]
    NoAdapter,

    #[error("failed to create compute device: {0}")]
    DeviceCreation(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Buffer acquisition, kernel binding, dispatch, or readback failed.
    /// Fatal for the current frame only; the agent store is untouched.
    #[error("device resources exhausted: {0}")]
    DeviceResourceExhausted(#[from] DeviceError),

    /// The device returned a different number of headings than agents were
    /// uploaded.  No heading from this frame is applied.
    #[error("readback returned {got} headings for {expected} agents")]
    ResultSizeMismatch { expected: usize, got: usize },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

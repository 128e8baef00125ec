use fl_core::AgentId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Indexed access at or beyond the live count.  Always a caller bug.
    #[error("{agent} out of range (count {count})")]
    IndexOutOfRange { agent: AgentId, count: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

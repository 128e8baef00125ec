use fl_agent::StoreError;
use fl_compute::DispatchError;
use fl_core::CoreError;
use fl_transform::{SpawnError, TransformError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlockError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("flock step failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("transform update failed: {0}")]
    Transform(#[from] TransformError),

    #[error("agent spawn failed: {0}")]
    Spawn(#[from] SpawnError),
}

pub type FlockResult<T> = Result<T, FlockError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Records, handles and headings must be index-aligned 1:1.
    #[error("length mismatch: {records} records, {handles} handles, {headings} headings")]
    CountMismatch {
        records:  usize,
        handles:  usize,
        headings: usize,
    },

    #[error("failed to build transform worker pool: {0}")]
    ThreadPool(String),
}

pub type TransformResult<T> = Result<T, TransformError>;

/// Failure reported by a [`TransformFactory`][crate::TransformFactory].
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("spawn rejected: {0}")]
    Rejected(String),
}

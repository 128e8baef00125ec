//! Framework error type for configuration and parameter validation.
//!
//! Sub-crates define their own error enums (`StoreError`, `DispatchError`,
//! `TransformError`) and `fl-sim` folds all of them into `FlockError`.

use thiserror::Error;

/// Errors raised by `fl-core` itself.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fl-core`.
pub type CoreResult<T> = Result<T, CoreError>;

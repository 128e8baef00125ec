//! `fl-sim` — the per-frame flock controller.
//!
//! # Frame pipeline
//!
//! ```text
//! step(delta_time):
//!   ① Dispatch  — DispatchCoordinator::run_step uploads the store, runs the
//!                 heading kernel, and reads one heading per agent back.
//!   ② Apply     — TransformUpdateJob orients and moves every transform in
//!                 parallel and writes position/heading back to the store.
//!   ③ Clock     — the frame clock advances by delta_time.
//! ```
//!
//! A flock with no agents skips ① and ② entirely.  A failed ① leaves the
//! store untouched; the next `step` retries with the same state.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fl_compute::{HostDevice, IdentityKernel};
//! use fl_core::FlockConfig;
//! use fl_sim::FlockBuilder;
//! use fl_transform::SimTransformFactory;
//!
//! let mut flock = FlockBuilder::new(
//!     FlockConfig::default(),
//!     HostDevice::new(IdentityKernel),
//!     SimTransformFactory::new(),
//! )
//! .build()?;
//! flock.step(1.0 / 60.0)?;
//! ```

pub mod builder;
pub mod error;
pub mod flock;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::FlockBuilder;
pub use error::{FlockError, FlockResult};
pub use flock::Flock;
pub use observer::{FlockObserver, NoopObserver};

//! `fl-transform` — applying computed headings to agent transforms.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`handle`]      | `TransformHandle` trait, `SimTransform`, `look_rotation`   |
//! | [`factory`]     | `TransformFactory` trait, `SimTransformFactory`            |
//! | [`job`]         | `TransformUpdateJob` (Rayon parallel-for), `update_agent`  |
//! | [`error`]       | `TransformError`, `SpawnError`                             |
//!
//! Transform handles belong to whatever engine renders the flock.  This
//! crate only needs the three operations in [`TransformHandle`]; the
//! headless [`SimTransform`] implements them for tests and demos.

pub mod error;
pub mod factory;
pub mod handle;
pub mod job;


pub use error::{SpawnError, TransformError, TransformResult};
pub use factory::{SimTransformFactory, TransformFactory};
pub use handle::{SimTransform, TransformHandle, look_rotation};
pub use job::{TransformUpdateJob, update_agent};

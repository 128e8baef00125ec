//! `fl-core` — foundational types for the `rust_flock` boid framework.
//!
//! This crate is a dependency of every other `fl-*` crate.  It intentionally
//! has no `fl-*` dependencies and minimal external ones (`glam`, `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`time`]        | `Frame`, `FrameClock`                                 |
//! | [`rng`]         | `SimRng` (spawn scatter)                              |
//! | [`params`]      | `FlockParams` (kernel inputs), `FlockConfig`          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::AgentId;
pub use params::{FlockConfig, FlockParams};
pub use rng::SimRng;
pub use time::{Frame, FrameClock};

/// World-space forward axis.  Freshly spawned agents face this way.
pub const FORWARD: glam::Vec3 = glam::Vec3::Z;

/// World-space up axis used as the roll reference for look rotations.
pub const WORLD_UP: glam::Vec3 = glam::Vec3::Y;

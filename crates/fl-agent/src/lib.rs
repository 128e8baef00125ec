//! `fl-agent` — contiguous agent-record storage for the `rust_flock` framework.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`record`]      | `AgentRecord` (GPU-compatible position + heading pair)    |
//! | [`store`]       | `AgentStore` (doubling array), `AgentView` (borrowed view)|
//! | [`error`]       | `StoreError`, `StoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `AgentRecord`.        |

pub mod error;
pub mod record;
pub mod store;


pub use error::{StoreError, StoreResult};
pub use record::AgentRecord;
pub use store::{AgentStore, AgentView, DEFAULT_CAPACITY};

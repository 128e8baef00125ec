//! `fl-compute` — the per-frame round trip to the heading kernel.
//!
//! # Protocol
//!
//! ```text
//! run_step(view, params):
//!   count == 0            → empty result, no device calls
//!   ① create_input_buffer  — upload the agent records verbatim (immutable)
//!   ② KernelParams         — coefficients, squared distances, origin, count
//!   ③ create_output_buffer — one heading slot per agent
//!   ④ dispatch             — ceil(count / 512) thread groups
//!   ⑤ release(input)
//!   ⑥ read_headings        — blocking readback into a FrameResultBuffer
//!   ⑦ release(output)
//! ```
//!
//! Every buffer the coordinator acquires is released on every path,
//! including the failure paths.
//!
//! # Devices
//!
//! | Type                | Backend                                               |
//! |---------------------|-------------------------------------------------------|
//! | [`HostDevice`]      | Runs a [`HostKernel`] on the CPU (tests, headless).   |
//! | `WgpuDevice`        | wgpu compute pipeline (`gpu` feature).                |
//!
//! # Cargo features
//!
//! | Feature | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `gpu`   | Compiles `WgpuDevice` (pulls in `wgpu` and `pollster`).    |

pub mod coordinator;
pub mod device;
pub mod error;
pub mod host;
pub mod params;
pub mod result;

#[cfg(feature = "gpu")]
pub mod gpu;

#[cfg(test)]
mod tests;

pub use coordinator::DispatchCoordinator;
pub use device::{ComputeDevice, THREADS_PER_GROUP, thread_groups};
pub use error::{DeviceError, DispatchError, DispatchResult};
pub use host::{DeviceCall, DeviceStats, HostBuffer, HostDevice, HostKernel, IdentityKernel};
pub use params::KernelParams;
pub use result::FrameResultBuffer;

#[cfg(feature = "gpu")]
pub use gpu::{IDENTITY_KERNEL_WGSL, WgpuBuffer, WgpuDevice};

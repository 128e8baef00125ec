//! The per-agent record uploaded to the compute kernel every frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use fl_core::FORWARD;

/// Simulation-side mirror of one agent: where it is and where it is going.
///
/// The layout is two tightly packed `vec3<f32>`s (24 bytes, no padding),
/// which is what the kernel's read-only agent binding declares.  Because the
/// type is `Pod`, a `&[AgentRecord]` is uploaded with `bytemuck::cast_slice`
/// and no per-element marshaling.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentRecord {
    pub position: Vec3,
    pub heading:  Vec3,
}

const _: () = assert!(
    std::mem::size_of::<AgentRecord>() == 24,
    "size of AgentRecord does not match the kernel binding"
);
const _: () = assert!(
    std::mem::offset_of!(AgentRecord, position) == 0,
    "offset of AgentRecord.position does not match the kernel binding"
);
const _: () = assert!(
    std::mem::offset_of!(AgentRecord, heading) == 12,
    "offset of AgentRecord.heading does not match the kernel binding"
);

impl AgentRecord {
    #[inline]
    pub fn new(position: Vec3, heading: Vec3) -> Self {
        Self { position, heading }
    }

    /// A freshly spawned agent at `position`, facing world forward.
    #[inline]
    pub fn spawned_at(position: Vec3) -> Self {
        Self { position, heading: FORWARD }
    }
}

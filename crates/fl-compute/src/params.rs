//! Uniform block bound alongside the agent buffer on every dispatch.

use bytemuck::{Pod, Zeroable};

use fl_core::FlockParams;

/// Kernel-facing parameter block.
///
/// Field order and padding follow WGSL uniform layout rules: `flock_origin`
/// is a `vec3<f32>` (16-byte aligned), `agent_count` fills its fourth lane,
/// and the struct is padded to a multiple of 16 bytes.
///
/// ```wgsl
/// struct KernelParams {
///     flock_origin:                vec3<f32>,
///     agent_count:                 u32,
///     alignment_coefficient:       f32,
///     cohesion_coefficient:        f32,
///     separation_coefficient:      f32,
///     max_view_distance_squared:   f32,
///     max_wander_distance_squared: f32,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct KernelParams {
    pub flock_origin:                [f32; 3],
    pub agent_count:                 u32,
    pub alignment_coefficient:       f32,
    pub cohesion_coefficient:        f32,
    pub separation_coefficient:      f32,
    pub max_view_distance_squared:   f32,
    pub max_wander_distance_squared: f32,
    pub _pad:                        [f32; 3],
}

const _: () = assert!(
    std::mem::size_of::<KernelParams>() == 48,
    "size of KernelParams does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(KernelParams, agent_count) == 12,
    "offset of KernelParams.agent_count does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(KernelParams, alignment_coefficient) == 16,
    "offset of KernelParams.alignment_coefficient does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(KernelParams, max_wander_distance_squared) == 32,
    "offset of KernelParams.max_wander_distance_squared does not match WGSL"
);

impl KernelParams {
    /// Build the block for a frame with `agent_count` live agents.
    pub fn new(params: &FlockParams, agent_count: u32) -> Self {
        Self {
            flock_origin:                params.origin.to_array(),
            agent_count,
            alignment_coefficient:       params.alignment_coefficient,
            cohesion_coefficient:        params.cohesion_coefficient,
            separation_coefficient:      params.separation_coefficient,
            max_view_distance_squared:   params.view_distance_squared(),
            max_wander_distance_squared: params.max_wander_distance_squared(),
            _pad:                        [0.0; 3],
        }
    }

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.agent_count as usize
    }
}

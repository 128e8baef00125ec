//! CPU boids kernel for the host device.
//!
//! Brute-force neighbour scan: every agent looks at every other agent.
//! Fine for a few thousand agents; the wgpu kernel in `kernels/boids.wgsl`
//! implements the same rules.

use fl_agent::AgentRecord;
use fl_compute::{HostKernel, KernelParams};
use glam::Vec3;

const EPSILON: f32 = 1e-6;

#[derive(Copy, Clone, Debug, Default)]
pub struct BoidsKernel;

impl HostKernel for BoidsKernel {
    fn heading(&self, index: usize, agents: &[AgentRecord], params: &KernelParams) -> Vec3 {
        let me = agents[index];

        let mut align = Vec3::ZERO;
        let mut centre = Vec3::ZERO;
        let mut separation = Vec3::ZERO;
        let mut neighbours = 0u32;

        for (j, other) in agents.iter().enumerate() {
            if j == index {
                continue;
            }
            let d = other.position - me.position;
            let dist_sq = d.length_squared();
            if dist_sq <= EPSILON || dist_sq > params.max_view_distance_squared {
                continue;
            }
            neighbours += 1;
            align += other.heading;
            centre += d;
            separation -= d / dist_sq;
        }

        let mut heading = me.heading;
        if neighbours > 0 {
            let n = neighbours as f32;
            heading += (align / n).normalize_or_zero() * params.alignment_coefficient
                + (centre / n).normalize_or_zero() * params.cohesion_coefficient
                + separation.normalize_or_zero() * params.separation_coefficient;
        }

        // Turn back once outside the wander radius.
        let home = Vec3::from_array(params.flock_origin) - me.position;
        if home.length_squared() > params.max_wander_distance_squared {
            heading += home.normalize_or_zero();
        }

        heading.try_normalize().unwrap_or(me.heading)
    }
}

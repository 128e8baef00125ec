//! Flocking parameters and top-level flock configuration.
//!
//! `FlockParams` is what the compute kernel sees every frame; `FlockConfig`
//! adds the CPU-side knobs (speed, spawn scatter, pool size, seed).  Both are
//! plain data so applications can load them from JSON/TOML with the `serde`
//! feature and tweak them between frames.

use glam::Vec3;

use crate::{CoreError, CoreResult};

// ── FlockParams ───────────────────────────────────────────────────────────────

/// Per-frame inputs to the heading kernel.
///
/// Distances are stored unsquared for readability; the kernel receives the
/// squared forms via [`view_distance_squared`](Self::view_distance_squared)
/// and [`max_wander_distance_squared`](Self::max_wander_distance_squared).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlockParams {
    /// Radius within which neighbours influence an agent.  Default: 3.
    pub view_distance: f32,
    /// Weight of the steer-to-average-heading term.  Default: 1.
    pub alignment_coefficient: f32,
    /// Weight of the steer-to-centre-of-neighbours term.  Default: 1.
    pub cohesion_coefficient: f32,
    /// Weight of the steer-away-from-crowding term.  Default: 1.
    pub separation_coefficient: f32,
    /// Distance from `origin` agents may wander before being pulled back.
    /// Default: 32.
    pub max_wander_range: f32,
    /// World-space centre of the flock.
    pub origin: Vec3,
}

impl FlockParams {
    #[inline]
    pub fn view_distance_squared(&self) -> f32 {
        self.view_distance * self.view_distance
    }

    #[inline]
    pub fn max_wander_distance_squared(&self) -> f32 {
        self.max_wander_range * self.max_wander_range
    }

    /// Reject non-finite values and negative distances.
    pub fn validate(&self) -> CoreResult<()> {
        let scalars = [
            ("view_distance", self.view_distance),
            ("alignment_coefficient", self.alignment_coefficient),
            ("cohesion_coefficient", self.cohesion_coefficient),
            ("separation_coefficient", self.separation_coefficient),
            ("max_wander_range", self.max_wander_range),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(CoreError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.view_distance < 0.0 {
            return Err(CoreError::Config(format!(
                "view_distance must be >= 0, got {}",
                self.view_distance
            )));
        }
        if self.max_wander_range < 0.0 {
            return Err(CoreError::Config(format!(
                "max_wander_range must be >= 0, got {}",
                self.max_wander_range
            )));
        }
        if !self.origin.is_finite() {
            return Err(CoreError::Config(format!("origin must be finite, got {}", self.origin)));
        }
        Ok(())
    }
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            view_distance:          3.0,
            alignment_coefficient:  1.0,
            cohesion_coefficient:   1.0,
            separation_coefficient: 1.0,
            max_wander_range:       32.0,
            origin:                 Vec3::ZERO,
        }
    }
}

// ── FlockConfig ───────────────────────────────────────────────────────────────

/// Top-level flock configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// `FlockBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlockConfig {
    /// Kernel parameters, re-read every frame.
    pub params: FlockParams,

    /// World units per simulated second.  Default: 3.
    pub agent_speed: f32,

    /// Agents spawned when the flock is built.  Default: 256.
    pub initial_agent_count: usize,

    /// Half-extent of the cube around `params.origin` that new agents are
    /// scattered in.  Default: 20.
    pub spawn_radius: f32,

    /// Initial slot capacity of the agent store.  `None` sizes it to
    /// `initial_agent_count` (or the store default when that is zero).
    pub initial_capacity: Option<usize>,

    /// Master RNG seed.  The same seed always produces identical spawns.
    pub seed: u64,

    /// Worker thread count for the transform job.  `None` uses Rayon's
    /// global pool (all logical cores).
    pub num_threads: Option<usize>,
}

impl FlockConfig {
    /// Check every field and return the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        self.params.validate()?;
        if !self.agent_speed.is_finite() {
            return Err(CoreError::Config(format!(
                "agent_speed must be finite, got {}",
                self.agent_speed
            )));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(CoreError::Config(format!(
                "spawn_radius must be finite and >= 0, got {}",
                self.spawn_radius
            )));
        }
        if self.initial_capacity == Some(0) {
            return Err(CoreError::Config("initial_capacity must be non-zero".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be non-zero".into()));
        }
        Ok(())
    }

    /// The per-frame translation scale: `agent_speed * delta_secs`.
    #[inline]
    pub fn delta_speed(&self, delta_secs: f32) -> f32 {
        self.agent_speed * delta_secs
    }
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            params:              FlockParams::default(),
            agent_speed:         3.0,
            initial_agent_count: 256,
            spawn_radius:        20.0,
            initial_capacity:    None,
            seed:                0,
            num_threads:         None,
        }
    }
}

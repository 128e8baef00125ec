//! Deterministic simulation-level RNG.
//!
//! The flock draws randomness in exactly one place: scattering new agents
//! around the flock origin at spawn time.  Spawning runs on the simulation
//! thread only, so a single seeded `SmallRng` is enough and makes every run
//! with the same seed place agents identically.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG used on the simulation thread.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A point drawn uniformly from the axis-aligned cube of half-extent
    /// `radius` centred on `origin`.
    ///
    /// `radius <= 0.0` returns `origin` exactly, which lets tests spawn a
    /// whole flock on one point.
    pub fn scatter(&mut self, origin: Vec3, radius: f32) -> Vec3 {
        if radius <= 0.0 {
            return origin;
        }
        origin
            + Vec3::new(
                self.gen_range(-radius..=radius),
                self.gen_range(-radius..=radius),
                self.gen_range(-radius..=radius),
            )
    }
}

//! Creating transform handles for newly spawned agents.

use glam::{Quat, Vec3};

use crate::{SimTransform, SpawnError, TransformHandle};

/// Produces one engine transform per spawned agent.
///
/// The flock calls [`spawn`](Self::spawn) on the simulation thread and
/// appends the matching agent record immediately afterwards, so handle `i`
/// always belongs to agent `i`.
pub trait TransformFactory {
    type Handle: TransformHandle;

    fn spawn(&mut self, position: Vec3, orientation: Quat) -> Result<Self::Handle, SpawnError>;
}

/// Factory for headless [`SimTransform`]s.
#[derive(Debug, Default)]
pub struct SimTransformFactory {
    spawned: usize,
}

impl SimTransformFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transforms created so far.
    pub fn spawned(&self) -> usize {
        self.spawned
    }
}

impl TransformFactory for SimTransformFactory {
    type Handle = SimTransform;

    fn spawn(&mut self, position: Vec3, orientation: Quat) -> Result<SimTransform, SpawnError> {
        if !position.is_finite() {
            return Err(SpawnError::Rejected(format!("non-finite spawn position {position}")));
        }
        self.spawned += 1;
        Ok(SimTransform::new(position, orientation))
    }
}

//! The engine-side transform interface and a headless implementation.

use fl_core::{FORWARD, WORLD_UP};
use glam::{Mat3, Quat, Vec3};

/// Per-agent spatial transform owned by the host engine.
///
/// The transform job calls these from worker threads, one handle per
/// worker at a time, so implementations must be `Send` but need not be
/// `Sync`.
pub trait TransformHandle: Send {
    /// Rotate to look along `look`, keeping world up as the roll reference.
    fn set_orientation(&mut self, look: Vec3);

    /// Move by `delta` in the transform's local (parent) space.
    fn translate(&mut self, delta: Vec3);

    /// World-space position after any engine-side constraints.
    fn position(&self) -> Vec3;
}

/// Rotation whose local +Z points along `forward` and whose local +Y is as
/// close to `up` as possible.
///
/// Returns `None` for a zero (or non-finite) `forward`.  When `forward` is
/// parallel to `up` the shortest arc from +Z is used instead.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let Some(r) = up.cross(f).try_normalize() else {
        return Some(Quat::from_rotation_arc(FORWARD, f));
    };
    let u = f.cross(r);
    Some(Quat::from_mat3(&Mat3::from_cols(r, u, f)).normalize())
}

// ── SimTransform ──────────────────────────────────────────────────────────────

/// Headless transform: a position and a rotation, no parent, no collision.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl SimTransform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// The direction the transform currently faces.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }
}

impl Default for SimTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl TransformHandle for SimTransform {
    /// A zero heading leaves the rotation unchanged.
    fn set_orientation(&mut self, look: Vec3) {
        if let Some(rotation) = look_rotation(look, WORLD_UP) {
            self.rotation = rotation;
        }
    }

    #[inline]
    fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }
}

//! The transient heading array produced by one dispatch.

use std::ops::Index;

use glam::Vec3;

/// One heading per live agent, in the same index order as the uploaded
/// snapshot.
///
/// Lives from readback until the transform job has consumed it; the job
/// takes it by value and drops it once every index is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameResultBuffer {
    headings: Vec<Vec3>,
}

impl FrameResultBuffer {
    /// The result of a zero-agent step.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap headings obtained from a readback (or built by hand in tests).
    pub fn from_headings(headings: Vec<Vec3>) -> Self {
        Self { headings }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vec3] {
        &self.headings
    }

    pub fn into_vec(self) -> Vec<Vec3> {
        self.headings
    }
}

impl Index<usize> for FrameResultBuffer {
    type Output = Vec3;

    #[inline]
    fn index(&self, i: usize) -> &Vec3 {
        &self.headings[i]
    }
}

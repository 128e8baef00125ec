//! Frame-based simulation time.
//!
//! # Design
//!
//! The flock advances once per rendered frame.  A monotonically increasing
//! `Frame` counter identifies each step; the variable frame duration passed
//! to `Flock::step` is accumulated in `FrameClock` so callers can report
//! simulated time without tracking it themselves.

use std::fmt;

// ── Frame ─────────────────────────────────────────────────────────────────────

/// An absolute frame counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame(pub u64);

impl Frame {
    pub const ZERO: Frame = Frame(0);

    /// The frame after `self`.
    #[inline]
    pub fn next(self) -> Frame {
        Frame(self.0 + 1)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

// ── FrameClock ────────────────────────────────────────────────────────────────

/// Tracks the current frame and the simulated seconds elapsed since frame 0.
///
/// Elapsed time is accumulated in `f64` so long runs at small frame
/// durations don't drift the way an `f32` accumulator would.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameClock {
    /// The current frame, advanced by [`FrameClock::advance`] each step.
    pub current_frame: Frame,
    /// Simulated seconds elapsed since frame 0.
    pub elapsed_secs: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame lasting `delta_secs`.
    #[inline]
    pub fn advance(&mut self, delta_secs: f32) {
        self.current_frame = self.current_frame.next();
        self.elapsed_secs += f64::from(delta_secs);
    }

    /// Mean frame duration so far, or `0.0` before the first frame.
    pub fn mean_frame_secs(&self) -> f64 {
        if self.current_frame.0 == 0 {
            0.0
        } else {
            self.elapsed_secs / self.current_frame.0 as f64
        }
    }
}

impl fmt::Display for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3}s)", self.current_frame, self.elapsed_secs)
    }
}

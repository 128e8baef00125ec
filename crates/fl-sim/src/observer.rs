//! Flock observer trait for progress reporting and data collection.

use fl_agent::AgentView;
use fl_core::{AgentId, Frame};

/// Callbacks invoked by [`Flock`][crate::Flock] around each step and spawn.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — centroid printer
///
/// ```rust,ignore
/// struct Centroid;
///
/// impl FlockObserver for Centroid {
///     fn on_step_end(&mut self, frame: Frame, agents: AgentView<'_>) {
///         let sum: Vec3 = agents.iter().map(|a| a.position).sum();
///         println!("{frame}: centroid {}", sum / agents.len() as f32);
///     }
/// }
/// ```
pub trait FlockObserver {
    /// Called before the dispatch of each step, including empty steps.
    fn on_step_start(&mut self, _frame: Frame, _agent_count: usize) {}

    /// Called after a successful step with read-only access to the updated
    /// agent records.  Not called when the step fails.
    fn on_step_end(&mut self, _frame: Frame, _agents: AgentView<'_>) {}

    /// Called once per spawn batch with the first new id and the batch size.
    fn on_spawn(&mut self, _first: AgentId, _count: usize) {}
}

/// A [`FlockObserver`] that does nothing.
pub struct NoopObserver;

impl FlockObserver for NoopObserver {}

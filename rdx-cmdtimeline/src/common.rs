//! Contains common, primitive types shared across the engine.
//!
//! Identifiers and the run state enum live here so that the host boundary,
//! the scheduler and the registry can all refer to them without depending
//! on each other.

use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a command registered with a `CommandRegistry`.
    pub struct CommandId;
}

/// The run state of a `Timeline`.
///
/// `Finished` and `Cancelled` are terminal for a run but not for the timeline:
/// both are valid starting points for the next `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Never started.
    Idle,
    /// A worker is draining the action queue.
    Running,
    /// The last run drained its whole queue.
    Finished,
    /// The last run was stopped before its queue was drained.
    Cancelled,
}

impl RunState {
    /// Returns `true` if a new run may be started from this state.
    pub fn is_restartable(self) -> bool {
        !matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

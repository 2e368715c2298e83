//! Defines the public event types broadcast by the timeline registry.
//!
//! Observers (the shell, the dev runner, tests) subscribe to these events
//! instead of registering callbacks on individual timelines.

use chrono::{DateTime, Utc};

/// Something that happened to a timeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A run was compiled and its worker spawned.
    Started {
        name: String,
        actions: usize,
        at: DateTime<Utc>,
    },
    /// One action of a run failed. The run continues with the next action.
    StepFailed {
        name: String,
        line: usize,
        error: String,
    },
    /// A run ended. Published exactly once per run.
    Finished {
        name: String,
        /// `true` if the run was stopped before draining its queue.
        cancelled: bool,
        at: DateTime<Utc>,
    },
}

impl TimelineEvent {
    /// The timeline identifier this event belongs to.
    pub fn name(&self) -> &str {
        match self {
            TimelineEvent::Started { name, .. }
            | TimelineEvent::StepFailed { name, .. }
            | TimelineEvent::Finished { name, .. } => name,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TimelineEvent::Finished { .. })
    }
}

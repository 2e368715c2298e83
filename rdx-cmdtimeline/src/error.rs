//! Error types used by the timeline engine.
//!
//! - [`TimelineError`]: raised while starting, compiling or stopping a timeline.
//!   A compile-time error aborts the start: no action of the run executes.
//! - [`StepError`]: raised by a single deferred action while a run is being
//!   drained. Step errors are reported and the run continues.

use crate::script::binder::BindError;
use thiserror::Error;

/// # Errors produced before a timeline run begins executing.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The file contains nothing but comments.
    #[error("{0} has no commands to run")]
    EmptyTimeline(String),

    /// Fewer arguments were passed than the `#req` directive declares.
    /// Carries the formatted list of required parameters, e.g. `<x> <y>`.
    #[error("missing parameters: {0}")]
    MissingParameters(String),

    /// A `#wait` directive whose interval is not a non-negative integer.
    #[error("invalid interval '{value}' for #wait action on line {line}")]
    InvalidWaitInterval { line: usize, value: String },

    /// A matched command refuses to run from the console.
    #[error("{name} had an error at line {line}: /{command} cannot be run from the console")]
    CannotRunFromConsole {
        name: String,
        command: String,
        line: usize,
    },

    /// Parameter substitution failed on a line.
    #[error("could not bind parameters on line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: BindError,
    },

    #[error("{0} is already running")]
    AlreadyRunning(String),

    #[error("{0} isn't running")]
    NotRunning(String),

    #[error("{0} doesn't exist")]
    FileNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything that does not fit a more specific variant.
    #[error("{0}")]
    Other(String),
}

impl TimelineError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TimelineError::EmptyTimeline(_) => "timeline_empty",
            TimelineError::MissingParameters(_) => "timeline_missing_parameters",
            TimelineError::InvalidWaitInterval { .. } => "timeline_invalid_wait",
            TimelineError::CannotRunFromConsole { .. } => "timeline_console_forbidden",
            TimelineError::Format { .. } => "timeline_format",
            TimelineError::AlreadyRunning(_) => "timeline_already_running",
            TimelineError::NotRunning(_) => "timeline_not_running",
            TimelineError::FileNotFound(_) => "timeline_not_found",
            TimelineError::Io(_) => "timeline_io",
            TimelineError::Other(_) => "timeline_error",
        }
    }

    /// Returns the offending line for errors tied to one line of the file.
    pub fn line(&self) -> Option<usize> {
        match self {
            TimelineError::InvalidWaitInterval { line, .. }
            | TimelineError::CannotRunFromConsole { line, .. }
            | TimelineError::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// # Errors produced by a single deferred action during a run.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum StepError {
    /// The command handler returned an error.
    #[error("/{command} failed: {error}")]
    Command { command: String, error: String },

    /// An awaiting-response handler returned an error.
    #[error("response '{key}' failed: {error}")]
    Response { key: String, error: String },

    /// The blocking task running the action panicked or was aborted.
    #[error("step panicked: {0}")]
    Panicked(String),
}

impl StepError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StepError::Command { .. } => "step_command_failed",
            StepError::Response { .. } => "step_response_failed",
            StepError::Panicked(_) => "step_panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_reported_for_line_errors_only() {
        let wait = TimelineError::InvalidWaitInterval {
            line: 4,
            value: "soon".into(),
        };
        assert_eq!(wait.line(), Some(4));
        assert_eq!(wait.as_label(), "timeline_invalid_wait");

        let empty = TimelineError::EmptyTimeline("a.txt".into());
        assert_eq!(empty.line(), None);
        assert_eq!(empty.to_string(), "a.txt has no commands to run");
    }

    #[test]
    fn console_error_names_file_line_and_command() {
        let err = TimelineError::CannotRunFromConsole {
            name: "events/boss.txt".into(),
            command: "home".into(),
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "events/boss.txt had an error at line 7: /home cannot be run from the console"
        );
    }
}

//! The operator-facing `/timeline` command.
//!
//! Maps `start`, `stop` and `show` onto the registry and turns every outcome
//! into a chat-style [`Feedback`] message for the invoking actor.

use crate::error::TimelineError;
use crate::host::Actor;
use crate::permissions::can_use_timeline;
use crate::registry::TimelineRegistry;
use std::fmt;
use tracing::debug;

pub const USAGE: &str = "Invalid syntax! Commands: /timeline start <file> [arguments], /timeline stop <file>, /timeline show";
pub const NO_ACCESS: &str = "You do not have access to this command.";

/// A message for the actor who issued the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Info(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Success(m) | Feedback::Info(m) | Feedback::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error(_))
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Handler for `/timeline` (alias `/tl`).
#[derive(Clone)]
pub struct TimelineCommand {
    registry: TimelineRegistry,
}

impl TimelineCommand {
    pub const NAMES: [&'static str; 2] = ["timeline", "tl"];

    pub fn new(registry: TimelineRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TimelineRegistry {
        &self.registry
    }

    /// Whether `name` addresses this command.
    pub fn answers_to(name: &str) -> bool {
        Self::NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Runs the command with the arguments after its name.
    pub async fn execute(&self, actor: &Actor, args: &[String]) -> Feedback {
        let Some(sub) = args.first().map(|s| s.to_lowercase()) else {
            return Feedback::Error(USAGE.to_string());
        };
        if sub != "show" {
            if let Some(file) = args.get(1) {
                if !can_use_timeline(actor, file) {
                    debug!("{} was denied access to timeline {}.", actor.name(), file);
                    return Feedback::Error(NO_ACCESS.to_string());
                }
            }
        }

        match (sub.as_str(), args.get(1)) {
            ("start", Some(file)) => {
                let params = args[2..].to_vec();
                match self.registry.start(file, params).await {
                    Ok(_) => Feedback::Success(format!("{file} started.")),
                    Err(e) => Feedback::Error(describe(file, &e)),
                }
            }
            ("stop", Some(file)) => match self.registry.stop(file).await {
                Ok(()) => Feedback::Success(format!("{file} was stopped.")),
                Err(e) => Feedback::Error(describe(file, &e)),
            },
            ("show", _) => {
                let running = self.registry.show().await;
                if running.is_empty() {
                    Feedback::Info("No timelines are currently running.".to_string())
                } else {
                    Feedback::Info(format!("Currently running timelines: {running}"))
                }
            }
            _ => Feedback::Error(USAGE.to_string()),
        }
    }
}

/// The chat message for a failed `start` or `stop`.
fn describe(file: &str, error: &TimelineError) -> String {
    match error {
        TimelineError::FileNotFound(_) => format!("{file} doesn't exist!"),
        TimelineError::AlreadyRunning(_) => format!("{file} is already running."),
        TimelineError::NotRunning(_) => format!("{file} isn't running."),
        TimelineError::EmptyTimeline(_) => format!("{file} has no commands to run."),
        TimelineError::MissingParameters(list) => {
            format!("Missing parameters! Proper syntax: /timeline start {file} {list}")
        }
        TimelineError::InvalidWaitInterval { line, .. } => {
            format!("Invalid interval for #wait action on line {line} of {file}.")
        }
        TimelineError::CannotRunFromConsole { command, line, .. } => {
            format!("Cannot run /{command} from the console ({file}, line {line}).")
        }
        TimelineError::Format { line, source } => {
            format!("Could not apply parameters on line {line} of {file}: {source}.")
        }
        other => format!("{file} could not be run: {other}"),
    }
}

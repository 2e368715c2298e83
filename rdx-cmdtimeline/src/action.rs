//! Deferred actions: the compiled, queued units of work of a timeline run.
//!
//! Every action remembers the line it came from so that failures can be
//! reported against the file. Actions capture their text and arguments at
//! compile time; nothing is re-read when they execute.

use crate::error::StepError;
use crate::host::{Actor, CommandHandler, CommandHost, Invocation};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// The ordered queue a run drains.
pub type ActionQueue = VecDeque<Action>;

pub enum Action {
    /// Suspends the run. Interrupted by cancellation.
    Delay { line: usize, duration: Duration },
    /// Runs one registered command as the console, without audit logging.
    Invoke {
        line: usize,
        command: String,
        handler: Arc<dyn CommandHandler>,
        raw: String,
        silent: bool,
        args: Vec<String>,
    },
    /// Hands the line to a pending awaiting-response handler, if one exists
    /// when the action runs.
    ResponseDelivery {
        line: usize,
        key: String,
        raw: String,
        args: Vec<String>,
    },
}

impl Action {
    /// The 1-based line of the timeline file this action was compiled from.
    pub fn line(&self) -> usize {
        match self {
            Action::Delay { line, .. }
            | Action::Invoke { line, .. }
            | Action::ResponseDelivery { line, .. } => *line,
        }
    }

    /// Executes the action to completion.
    ///
    /// Command and response work runs on the blocking pool, so a slow or
    /// blocking handler never stalls the runtime. `cancel` only affects delays:
    /// a command that has started is never cut off.
    pub async fn execute(
        self,
        host: &Arc<dyn CommandHost>,
        cancel: &CancellationToken,
    ) -> Result<(), StepError> {
        match self {
            Action::Delay { duration, .. } => {
                let sleep = tokio::time::sleep(duration);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = cancel.cancelled() => {
                        trace!("Wait of {:?} interrupted by cancellation.", duration);
                    }
                }
                Ok(())
            }
            Action::Invoke {
                command,
                handler,
                raw,
                silent,
                args,
                ..
            } => {
                let invocation = Invocation {
                    raw,
                    silent,
                    actor: Actor::console(),
                    args,
                    log: false,
                };
                let outcome = tokio::task::spawn_blocking(move || handler.run(invocation)).await;
                match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(error)) => Err(StepError::Command {
                        command,
                        error: format!("{error:#}"),
                    }),
                    Err(join) => Err(StepError::Panicked(join.to_string())),
                }
            }
            Action::ResponseDelivery {
                key, raw, args, ..
            } => {
                let host = host.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    let Some(respond) = host.take_response(&key) else {
                        debug!("No response is awaiting '{}'; skipping.", key);
                        return Ok(());
                    };
                    let invocation = Invocation {
                        raw,
                        silent: false,
                        actor: Actor::console(),
                        args,
                        log: false,
                    };
                    respond(invocation).map_err(|error| StepError::Response {
                        key,
                        error: format!("{error:#}"),
                    })
                })
                .await;
                match outcome {
                    Ok(result) => result,
                    Err(join) => Err(StepError::Panicked(join.to_string())),
                }
            }
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delay { line, duration } => f
                .debug_struct("Delay")
                .field("line", line)
                .field("duration", duration)
                .finish(),
            Action::Invoke {
                line,
                command,
                silent,
                args,
                ..
            } => f
                .debug_struct("Invoke")
                .field("line", line)
                .field("command", command)
                .field("silent", silent)
                .field("args", args)
                .finish_non_exhaustive(),
            Action::ResponseDelivery {
                line, key, args, ..
            } => f
                .debug_struct("ResponseDelivery")
                .field("line", line)
                .field("key", key)
                .field("args", args)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delay { duration, .. } => write!(f, "wait {}ms", duration.as_millis()),
            Action::Invoke { raw, .. } => write!(f, "/{raw}"),
            Action::ResponseDelivery { key, .. } => write!(f, "response '{key}'"),
        }
    }
}

//! A single timeline: its lifecycle state machine and the worker that drains
//! one run's action queue.
//!
//! ```text
//! Idle ──start──► Running ──queue drained──► Finished ──start──► Running ...
//!                    │
//!                    └──────stop──────────► Cancelled ──start──► Running ...
//! ```
//!
//! Every `start` creates a fresh `Run` holding its own cancellation token,
//! queue and clean-up actions, so nothing of a previous run can execute after
//! a restart. The worker alone ends a run: it drains the queue (or stops early
//! once a stop has claimed the run), runs clean-up, records the final state
//! and publishes the one `Finished` event. Until then the run reads as
//! `Running`, so a new start cannot overlap an action still in flight.

use crate::action::ActionQueue;
use crate::common::RunState;
use crate::error::TimelineError;
use crate::events::TimelineEvent;
use crate::host::CommandHost;
use crate::script::directive::Specifiers;
use crate::script::Compiler;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// What a run's worker shares with the registry that spawned it.
#[derive(Clone)]
pub(crate) struct RunContext {
    pub host: Arc<dyn CommandHost>,
    pub events: broadcast::Sender<TimelineEvent>,
}

/// State of one run, shared between its worker and any `RunHandle`.
#[derive(Debug)]
struct Run {
    state: watch::Sender<RunState>,
    done: watch::Sender<bool>,
    cancel: CancellationToken,
    /// Set once by whoever decides how the run ends: `stop`, or the worker
    /// after draining its queue.
    ending: AtomicBool,
}

impl Run {
    fn new() -> Self {
        Self {
            state: watch::Sender::new(RunState::Running),
            done: watch::Sender::new(false),
            cancel: CancellationToken::new(),
            ending: AtomicBool::new(false),
        }
    }

    fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Claims the end of the run. Returns `true` for exactly one caller.
    fn claim_end(&self) -> bool {
        self.ending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_ending(&self) -> bool {
        self.ending.load(Ordering::Acquire)
    }
}

/// One timeline file and its current (or last) run.
pub struct Timeline {
    name: String,
    raw: String,
    params: Vec<String>,
    steps: Arc<AtomicUsize>,
    run: Option<Arc<Run>>,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: String::new(),
            params: Vec::new(),
            steps: Arc::new(AtomicUsize::new(0)),
            run: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.run.as_ref().map_or(RunState::Idle, |run| run.state())
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Number of actions this timeline has begun executing, over all runs.
    pub fn current(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    /// A handle to the current (or last) run.
    pub fn handle(&self) -> Option<RunHandle> {
        self.run.as_ref().map(|run| RunHandle {
            name: self.name.clone(),
            run: run.clone(),
        })
    }

    /// Loads new text and arguments for the next run.
    pub(crate) fn arm(&mut self, raw: String, params: Vec<String>) {
        self.raw = raw;
        self.params = params;
    }

    /// Compiles the armed text and spawns the worker for a new run.
    ///
    /// Compilation errors are returned before anything executes and leave the
    /// previous run state untouched.
    pub(crate) fn start(
        &mut self,
        ctx: &RunContext,
        specifiers: Specifiers<'_>,
        cleanup_lines: &[String],
    ) -> Result<RunHandle, TimelineError> {
        if !self.state().is_restartable() {
            return Err(TimelineError::AlreadyRunning(self.name.clone()));
        }

        let host = ctx.host.as_ref();
        let queue = Compiler::new(&self.name, &self.params, host, specifiers).compile(&self.raw)?;
        let cleanup = Compiler::new(&self.name, &[], host, specifiers)
            .compile_body(&cleanup_lines.join("\n"))?;

        let run = Arc::new(Run::new());
        self.run = Some(run.clone());

        info!(
            "Starting timeline {} with {} action(s) and {} argument(s).",
            self.name,
            queue.len(),
            self.params.len()
        );
        ctx.events
            .send(TimelineEvent::Started {
                name: self.name.clone(),
                actions: queue.len(),
                at: Utc::now(),
            })
            .ok();

        tokio::spawn(update(
            self.name.clone(),
            queue,
            cleanup,
            run.clone(),
            self.steps.clone(),
            ctx.clone(),
        ));

        Ok(RunHandle {
            name: self.name.clone(),
            run,
        })
    }
}

/// A cheap, cloneable view of one run.
#[derive(Clone, Debug)]
pub struct RunHandle {
    name: String,
    run: Arc<Run>,
}

impl RunHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.run.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Waits until the run has ended and its completion event was published.
    /// Returns the final state, `Finished` or `Cancelled`.
    pub async fn finished(&self) -> RunState {
        let mut done = self.run.done.subscribe();
        // The sender lives in `self.run`, so the channel cannot close here.
        let _ = done.wait_for(|done| *done).await;
        self.run.state()
    }

    /// Cancels the run and waits until its worker has exited, after the
    /// clean-up ran and the cancelled completion was published.
    ///
    /// An action already executing is finished first. Returns `false` if the
    /// run had already ended or is ending.
    pub(crate) async fn stop(&self) -> bool {
        if !self.run.claim_end() {
            return false;
        }
        self.run.cancel.cancel();
        info!("Stopping timeline {}...", self.name);
        self.finished().await;
        info!("Timeline {} was stopped.", self.name);
        true
    }
}

/// Drains one run's queue, one action at a time, then ends the run.
async fn update(
    name: String,
    mut queue: ActionQueue,
    cleanup: ActionQueue,
    run: Arc<Run>,
    steps: Arc<AtomicUsize>,
    ctx: RunContext,
) {
    while let Some(action) = queue.pop_front() {
        if run.is_ending() {
            debug!(
                "Timeline {} cancelled with {} action(s) left.",
                name,
                queue.len() + 1
            );
            break;
        }
        steps.fetch_add(1, Ordering::Relaxed);
        let line = action.line();
        trace!("Timeline {} line {}: {}", name, line, action);

        if let Err(error) = action.execute(&ctx.host, &run.cancel).await {
            warn!(
                "Timeline {} had an error at line {}: {} [{}]",
                name,
                line,
                error,
                error.as_label()
            );
            ctx.events
                .send(TimelineEvent::StepFailed {
                    name: name.clone(),
                    line,
                    error: error.to_string(),
                })
                .ok();
        }
    }

    // Losing the claim means a stop got there first.
    let cancelled = !run.claim_end();
    if !cancelled {
        info!("Timeline {} finished.", name);
    }
    complete(&name, cleanup, &run, &ctx, cancelled).await;
}

/// Runs clean-up actions, records the final state, then publishes the
/// completion event.
async fn complete(
    name: &str,
    cleanup: ActionQueue,
    run: &Run,
    ctx: &RunContext,
    cancelled: bool,
) {
    if !cleanup.is_empty() {
        // The run's own token may already be cancelled; clean-up waits must still elapse.
        let token = CancellationToken::new();
        for action in cleanup {
            let line = action.line();
            if let Err(error) = action.execute(&ctx.host, &token).await {
                warn!(
                    "Clean-up of timeline {} failed at line {}: {}",
                    name, line, error
                );
            }
        }
    }

    let outcome = if cancelled {
        RunState::Cancelled
    } else {
        RunState::Finished
    };
    run.state.send_replace(outcome);
    ctx.events
        .send(TimelineEvent::Finished {
            name: name.to_string(),
            cancelled,
            at: Utc::now(),
        })
        .ok();
    run.done.send_replace(true);
}

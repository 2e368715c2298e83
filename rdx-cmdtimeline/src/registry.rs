//! The process-wide table of timelines.
//!
//! The registry maps a file identifier (a path relative to the configured
//! root) to its [`Timeline`] and is the only way to start or stop one. All
//! map access goes through one `RwLock`; a start holds the write lock from the
//! running check until its worker is spawned, so at most one run per file can
//! exist. Execution never holds the lock.
//!
//! Identifiers are normalized before use, so `./boss.txt` and `boss.txt` name
//! the same timeline in the map, in events and in `show`.

use crate::common::RunState;
use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::events::TimelineEvent;
use crate::host::CommandHost;
use crate::script::directive::Specifiers;
use crate::timeline::{RunContext, RunHandle, Timeline};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

/// Registry of timelines. Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct TimelineRegistry {
    config: Arc<TimelineConfig>,
    ctx: RunContext,
    timelines: Arc<RwLock<HashMap<String, Timeline>>>,
}

impl TimelineRegistry {
    pub fn new(config: TimelineConfig, host: Arc<dyn CommandHost>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config: Arc::new(config),
            ctx: RunContext { host, events },
            timelines: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn CommandHost> {
        &self.ctx.host
    }

    /// Subscribes to the `TimelineEvent` stream.
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.ctx.events.subscribe()
    }

    /// Reads `file` from the timeline root, compiles it with `args` and starts
    /// running it.
    ///
    /// An existing, idle timeline for the same file is re-armed rather than
    /// replaced.
    pub async fn start(&self, file: &str, args: Vec<String>) -> Result<RunHandle, TimelineError> {
        let key = identifier(file)?;
        let path = self.config.resolve(&key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TimelineError::FileNotFound(key))
            }
            Err(e) => return Err(TimelineError::Io(e)),
        };

        let mut timelines = self.timelines.write().await;
        if timelines.get(&key).is_some_and(Timeline::is_running) {
            return Err(TimelineError::AlreadyRunning(key));
        }
        let timeline = timelines
            .entry(key.clone())
            .or_insert_with(|| Timeline::new(key.as_str()));
        timeline.arm(raw, args);

        let specifiers = Specifiers {
            normal: &self.config.specifier,
            silent: &self.config.silent_specifier,
        };
        timeline
            .start(&self.ctx, specifiers, &self.config.cleanup)
            .inspect_err(|e| warn!("Could not start timeline {}: {} [{}]", key, e, e.as_label()))
    }

    /// Stops the running timeline for `file`, waiting for its clean-up.
    pub async fn stop(&self, file: &str) -> Result<(), TimelineError> {
        let key = identifier(file)?;
        let handle = {
            let timelines = self.timelines.read().await;
            timelines
                .get(&key)
                .filter(|t| t.is_running())
                .and_then(Timeline::handle)
        };
        let Some(handle) = handle else {
            return Err(TimelineError::NotRunning(key));
        };
        if handle.stop().await {
            Ok(())
        } else {
            Err(TimelineError::NotRunning(key))
        }
    }

    /// Stops every running timeline. Returns how many were stopped.
    pub async fn stop_all(&self) -> usize {
        let handles: Vec<RunHandle> = {
            let timelines = self.timelines.read().await;
            timelines.values().filter_map(Timeline::handle).collect()
        };
        let mut stopped = 0;
        for handle in handles {
            if handle.stop().await {
                stopped += 1;
            }
        }
        if stopped > 0 {
            info!("Stopped {} running timeline(s).", stopped);
        }
        stopped
    }

    /// Sorted identifiers of all running timelines.
    pub async fn running(&self) -> Vec<String> {
        let timelines = self.timelines.read().await;
        let mut names: Vec<String> = timelines
            .values()
            .filter(|t| t.is_running())
            .map(|t| t.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// The running identifiers joined with `", "`. Empty if none are running.
    pub async fn show(&self) -> String {
        self.running().await.join(", ")
    }

    /// The state of `file`'s timeline, if it was ever started.
    pub async fn state(&self, file: &str) -> Option<RunState> {
        let key = identifier(file).ok()?;
        self.timelines.read().await.get(&key).map(Timeline::state)
    }

    /// A handle to the current (or last) run of `file`.
    pub async fn handle(&self, file: &str) -> Option<RunHandle> {
        let key = identifier(file).ok()?;
        self.timelines.read().await.get(&key).and_then(Timeline::handle)
    }

    /// Actions begun by `file`'s timeline over all of its runs.
    pub async fn current_step(&self, file: &str) -> Option<usize> {
        let key = identifier(file).ok()?;
        self.timelines.read().await.get(&key).map(Timeline::current)
    }
}

/// Normalizes a timeline identifier to its registry key: the path's
/// components relative to the root, joined with `/`.
///
/// `./a.txt`, `a.txt` and `sub//a.txt`-style spellings of one file map to one
/// key. Absolute paths and `..` are rejected so files stay inside the root.
fn identifier(file: &str) -> Result<String, TimelineError> {
    let mut parts = Vec::new();
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            _ => return Err(invalid(file)),
        }
    }
    if parts.is_empty() {
        return Err(invalid(file));
    }
    Ok(parts.join("/"))
}

fn invalid(file: &str) -> TimelineError {
    TimelineError::Other(format!(
        "invalid timeline path '{file}': must be relative to the timeline folder"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_must_stay_inside_the_root() {
        assert!(identifier("").is_err());
        assert!(identifier(".").is_err());
        assert!(identifier("../secret.txt").is_err());
        assert!(identifier("events/../boss.txt").is_err());
        assert!(identifier("/etc/passwd").is_err());
    }

    #[test]
    fn equivalent_spellings_share_one_key() {
        assert_eq!(identifier("boss.txt").unwrap(), "boss.txt");
        assert_eq!(identifier("./boss.txt").unwrap(), "boss.txt");
        assert_eq!(identifier("events//./boss.txt").unwrap(), "events/boss.txt");
    }
}

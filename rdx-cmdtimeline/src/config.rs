//! Defines the configuration for the timeline engine.
//!
//! The struct is deserialized with `serde`, so every field can come from a
//! TOML file (`Timelines.toml` by default) and be overridden through
//! `TIMELINE_*` environment variables. Missing fields fall back to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "Timelines.toml";

/// Top-level settings for a `TimelineRegistry`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    /// Directory timeline files are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Prefix of a normally executed command line, e.g. `/say hi`.
    #[serde(default = "default_specifier")]
    pub specifier: String,

    /// Prefix of a command line whose feedback is suppressed, e.g. `.say hi`.
    #[serde(default = "default_silent_specifier")]
    pub silent_specifier: String,

    /// Command lines run after every run, finished or stopped, before the
    /// completion event is published.
    #[serde(default)]
    pub cleanup: Vec<String>,

    /// Capacity of the broadcast channel carrying `TimelineEvent`s.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl TimelineConfig {
    /// Loads the configuration from `path` (or [`DEFAULT_CONFIG_FILE`]) and
    /// the environment. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix("TIMELINE")
                    .try_parsing(true)
                    .list_separator(";")
                    .with_list_parse_key("cleanup"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Resolves a timeline identifier against [`root`](Self::root).
    pub fn resolve(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            specifier: default_specifier(),
            silent_specifier: default_silent_specifier(),
            cleanup: Vec::new(),
            event_capacity: default_event_capacity(),
        }
    }
}

// --- Default value functions for serde ---

fn default_root() -> PathBuf {
    PathBuf::from("timelines")
}

fn default_specifier() -> String {
    "/".to_string()
}

fn default_silent_specifier() -> String {
    ".".to_string()
}

fn default_event_capacity() -> usize {
    64
}

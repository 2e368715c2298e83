//! # Command Timelines
//!
//! A macro engine for game servers: a timeline is a text file listing server
//! commands, one per line, with positional placeholders, waits and comments.
//! The engine compiles a file into a queue of deferred actions and drains it
//! in order, one action at a time, with a cancellable run/stop lifecycle.
//!
//! ## Core Concepts
//!
//! - **Compiler**: Turns file text into an action queue up front. Malformed
//!   directives, missing `#req` parameters and console-forbidden commands are
//!   reported before anything runs.
//! - **Timeline**: One file and its current run. Each run owns its queue and
//!   cancellation token; actions never overlap within a run.
//! - **Registry**: Maps file identifiers to timelines and guarantees at most
//!   one concurrent run per file.
//! - **Host**: The boundary to the game server. The engine resolves command
//!   names, delivers awaiting responses and tokenizes lines through a
//!   `CommandHost`.
//! - **Event-Driven**: Starts, step failures and completions are broadcast as
//!   `TimelineEvent`s. Exactly one `Finished` event is sent per run.
//!
//! ## File Format
//!
//! ```text
//! // Spawns a boss for a player.
//! #req player, boss
//! say {0} has summoned {1}!
//! #wait 3000
//! .spawnmob {1} 1 // silent: no feedback
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cmdtimeline::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Describe the host's commands.
//!     let host = Arc::new(LocalHost::new());
//!     host.commands().register(Command::new(["say"], |inv| {
//!         println!("[Server] {}", inv.args.join(" "));
//!         Ok(())
//!     }));
//!
//!     // 2. Create the registry.
//!     let registry = TimelineRegistry::new(TimelineConfig::load(None)?, host);
//!
//!     // 3. Start a timeline file from the configured root and wait for it.
//!     let run = registry.start("greet.txt", vec!["world".into()]).await?;
//!     run.finished().await;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Command Timelines";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod action;
pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod host;
pub mod permissions;
pub mod registry;
pub mod script;
pub mod timeline;

/// A prelude module for easy importing of the most common types.
pub mod prelude {
    pub use crate::common::{CommandId, RunState};
    pub use crate::config::TimelineConfig;
    pub use crate::control::{Feedback, TimelineCommand};
    pub use crate::error::{StepError, TimelineError};
    pub use crate::events::TimelineEvent;
    pub use crate::host::{
        Actor, AwaitingResponses, Command, CommandHandler, CommandHost, CommandRegistry,
        Invocation, LocalHost,
    };
    pub use crate::registry::TimelineRegistry;
    pub use crate::timeline::{RunHandle, Timeline};
}

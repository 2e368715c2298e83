//! The boundary between the engine and the game server hosting it.
//!
//! The engine only needs three things from its host: resolving a typed command
//! name to handlers, taking one-shot handlers out of the awaiting-response
//! table, and splitting text into arguments the way the host's own chat
//! parser does. [`CommandHost`] captures that; [`LocalHost`] is the in-process
//! implementation used by the shell and the tests.

pub mod command;
pub mod responses;
pub mod tokenizer;

pub use command::{Command, CommandHandler, CommandRegistry, Invocation};
pub use responses::{AwaitingResponses, ResponseHandler};
pub use tokenizer::tokenize;

use std::collections::HashSet;
use std::sync::Arc;

/// What the engine requires from the hosting server.
pub trait CommandHost: Send + Sync + 'static {
    /// Every registered command answering to `name` (already lower-cased).
    fn find_commands(&self, name: &str) -> Vec<Arc<dyn CommandHandler>>;

    /// Removes and returns the pending response handler for `key`, if any.
    fn take_response(&self, key: &str) -> Option<ResponseHandler>;

    /// Splits a command line into arguments.
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }
}

/// Whoever issues a command: a player or the server console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    name: String,
    permissions: HashSet<String>,
    console: bool,
}

impl Actor {
    /// The server console. Holds every permission.
    pub fn console() -> Self {
        Self {
            name: "Server".to_string(),
            permissions: HashSet::new(),
            console: true,
        }
    }

    /// A player with the given permission nodes. Nodes are matched case-insensitively.
    pub fn player<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            permissions: permissions
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
            console: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_console(&self) -> bool {
        self.console
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.console || self.permissions.contains(&permission.to_lowercase())
    }
}

/// A [`CommandHost`] backed by an in-process registry and response table.
#[derive(Default)]
pub struct LocalHost {
    commands: CommandRegistry,
    responses: AwaitingResponses,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn responses(&self) -> &AwaitingResponses {
        &self.responses
    }
}

impl CommandHost for LocalHost {
    fn find_commands(&self, name: &str) -> Vec<Arc<dyn CommandHandler>> {
        self.commands.find(name)
    }

    fn take_response(&self, key: &str) -> Option<ResponseHandler> {
        self.responses.take(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_holds_every_permission() {
        let console = Actor::console();
        assert!(console.is_console());
        assert!(console.has_permission("timeline.admin.useall"));
    }

    #[test]
    fn player_permissions_ignore_case() {
        let player = Actor::player("steve", ["Timeline.Use-Boss"]);
        assert!(player.has_permission("timeline.use-boss"));
        assert!(!player.has_permission("timeline.use-other"));
    }
}

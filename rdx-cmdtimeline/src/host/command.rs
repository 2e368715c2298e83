//! Registered server commands and the registry that resolves them by alias.

use super::Actor;
use crate::common::CommandId;
use slotmap::SlotMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Everything a command handler receives when it is run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The command text as typed, without its leading specifier.
    pub raw: String,
    /// Suppress feedback messages to the actor.
    pub silent: bool,
    pub actor: Actor,
    /// Arguments after the command name.
    pub args: Vec<String>,
    /// Whether the invocation should appear in the command audit log.
    pub log: bool,
}

/// A command as seen by the engine.
pub trait CommandHandler: Send + Sync {
    /// The primary name followed by any aliases.
    fn names(&self) -> &[String];

    /// Whether the console (and therefore a timeline) may run this command.
    fn allow_server(&self) -> bool;

    fn run(&self, invocation: Invocation) -> anyhow::Result<()>;

    fn name(&self) -> &str {
        self.names().first().map(String::as_str).unwrap_or_default()
    }

    fn has_alias(&self, name: &str) -> bool {
        self.names().iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

type CommandFn = Arc<dyn Fn(&Invocation) -> anyhow::Result<()> + Send + Sync>;

/// A command backed by a closure.
#[derive(Clone)]
pub struct Command {
    names: Vec<String>,
    allow_server: bool,
    do_log: bool,
    help: Option<String>,
    handler: CommandFn,
}

impl Command {
    /// Creates a command answering to every name in `names`.
    ///
    /// Commands allow console use and audit logging unless told otherwise.
    pub fn new<I, S>(
        names: I,
        handler: impl Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.into().to_lowercase())
                .collect(),
            allow_server: true,
            do_log: true,
            help: None,
            handler: Arc::new(handler),
        }
    }

    pub fn allow_console(mut self, allow: bool) -> Self {
        self.allow_server = allow;
        self
    }

    pub fn do_log(mut self, log: bool) -> Self {
        self.do_log = log;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("names", &self.names)
            .field("allow_server", &self.allow_server)
            .field("do_log", &self.do_log)
            .finish_non_exhaustive()
    }
}

impl CommandHandler for Command {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn allow_server(&self) -> bool {
        self.allow_server
    }

    fn run(&self, invocation: Invocation) -> anyhow::Result<()> {
        if self.do_log && invocation.log {
            info!("{} executed: /{}", invocation.actor.name(), invocation.raw);
        }
        (self.handler)(&invocation)
    }
}

/// All commands known to a host, addressable by id and by alias.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<SlotMap<CommandId, Arc<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, command: Command) -> CommandId {
        self.commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::new(command))
    }

    /// Every command answering to `name`, compared case-insensitively.
    pub fn find(&self, name: &str) -> Vec<Arc<dyn CommandHandler>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|c| c.has_alias(name))
            .map(|c| c.clone() as Arc<dyn CommandHandler>)
            .collect()
    }

    /// Primary names of all commands, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|c| c.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Every registered command, sorted by primary name.
    pub fn list(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        commands.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        commands
    }
}

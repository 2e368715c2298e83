use anyhow::Result;
use cmdtimeline::host::tokenize;
use cmdtimeline::prelude::*;
use cmdtimeline::{ENGINE_NAME, VERSION as LIB_VERSION};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tracing::{info, warn};

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that highlights the command name.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    println!("{}", ENGINE_NAME.cyan().bold());
    println!("{}", rule.dimmed());
    println!("          Shell   v{:<8} Library   v{:<8}", SHELL_VERSION, LIB_VERSION);
    println!(
        "{}",
        "\n    This software is provided 'as is', without warranty of any kind.\n    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.\n"
            .dimmed()
    );
    println!("{}", rule.dimmed());
}

fn print_help(host: &LocalHost) {
    println!("\n{}", "Shell commands:".bold());
    println!("  timeline start <file> [args]  Start a timeline (alias: tl)");
    println!("  timeline stop <file>          Stop a running timeline");
    println!("  timeline show                 List running timelines");
    println!("  help                          Show this message");
    println!("  exit                          Stop all timelines and quit");
    println!("\n{}", "Server commands:".bold());
    for command in host.commands().list() {
        let names = command.names().join(", ");
        match command.help_text() {
            Some(text) => println!("  {:<30}{}", names, text),
            None => println!("  {}", names),
        }
    }
    println!();
}

/// Prints timeline events above the prompt.
fn spawn_event_listener(registry: &TimelineRegistry) {
    let mut rx = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match &event {
                TimelineEvent::Started { name, actions, .. } => {
                    println!("<-- [TIMELINE] {} started with {} action(s)", name.cyan(), actions);
                }
                TimelineEvent::StepFailed { name, line, error } => {
                    println!("<-- [TIMELINE] {} line {}: {}", name.cyan(), line, error.red());
                }
                TimelineEvent::Finished { name, cancelled, .. } => {
                    let how = if *cancelled { "was cancelled" } else { "finished" };
                    println!("<-- [TIMELINE] {} {}", name.cyan(), how);
                }
            }
        }
    });
}

/// Registers the demo server commands a timeline can call.
fn register_demo_commands(host: &Arc<LocalHost>) {
    let commands = host.commands();
    commands.register(
        Command::new(["say"], |inv| {
            println!("{} {}", format!("[{}]", inv.actor.name()).cyan(), inv.args.join(" "));
            Ok(())
        })
        .do_log(false)
        .help("Says a message to everyone."),
    );
    commands.register(
        Command::new(["broadcast", "bc"], |inv| {
            println!("{}", inv.args.join(" ").yellow().bold());
            Ok(())
        })
        .help("Broadcasts a message in the server color."),
    );

    // Holds a weak handle so the command does not keep its own host alive.
    let weak: Weak<LocalHost> = Arc::downgrade(host);
    commands.register(
        Command::new(["confirm"], move |inv| {
            let Some(host) = weak.upgrade() else {
                anyhow::bail!("the server is shutting down");
            };
            let what = if inv.args.is_empty() {
                "the action".to_string()
            } else {
                inv.args.join(" ")
            };
            host.responses().register("yes", move |reply| {
                println!("{} confirmed {}.", reply.actor.name().green(), what);
                Ok(())
            });
            if !inv.silent {
                println!("Type /yes to confirm.");
            }
            Ok(())
        })
        .help("Asks for a /yes confirmation."),
    );
    commands.register(
        Command::new(["home"], |inv| {
            println!("Teleporting {} home.", inv.actor.name());
            Ok(())
        })
        .allow_console(false)
        .help("Teleports a player to spawn. Players only."),
    );
}

/// Runs a line that is not a shell builtin against the host.
fn run_server_command(host: &LocalHost, actor: &Actor, text: &str) {
    let silent = text.starts_with('.');
    let text = text.trim_start_matches(['/', '.']);
    let mut args = tokenize(text);
    if args.is_empty() {
        return;
    }
    let name = args.remove(0).to_lowercase();
    let invocation = Invocation {
        raw: text.to_string(),
        silent,
        actor: actor.clone(),
        args,
        log: true,
    };

    let handlers = host.find_commands(&name);
    if handlers.is_empty() {
        match host.take_response(&name) {
            Some(respond) => {
                if let Err(e) = respond(invocation) {
                    println!("{}", format!("Error: {}", e).red());
                }
            }
            None => println!("{}", "Invalid command entered. Type 'help' for a list.".red()),
        }
        return;
    }
    for handler in handlers {
        if let Err(e) = handler.run(invocation.clone()) {
            println!("{}", format!("Error: /{} failed: {}", name, e).red());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config_path = env::var_os("TLSHELL_CONFIG").map(PathBuf::from);
    let config = TimelineConfig::load(config_path.as_deref())?;
    info!("Timeline root is {}", config.root.display());

    let host = Arc::new(LocalHost::new());
    register_demo_commands(&host);

    let registry = TimelineRegistry::new(config, host.clone());
    let timeline = TimelineCommand::new(registry.clone());
    spawn_event_listener(&registry);

    let console = Actor::console();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("{} is running. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                let mut args = tokenize(line.trim_start_matches('/'));
                if args.is_empty() {
                    continue;
                }
                let command = args.remove(0).to_lowercase();
                match command.as_str() {
                    "exit" | "quit" => break,
                    "help" => print_help(&host),
                    name if TimelineCommand::answers_to(name) => {
                        match timeline.execute(&console, &args).await {
                            Feedback::Success(m) => println!("{}", m.green()),
                            Feedback::Info(m) => println!("{}", m.yellow()),
                            Feedback::Error(m) => println!("{}", m.red()),
                        }
                    }
                    _ => run_server_command(&host, &console, line),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let stopped = registry.stop_all().await;
    if stopped > 0 {
        warn!("Stopped {} running timeline(s).", stopped);
    }
    println!("Shutting down. Goodbye!");
    Ok(())
}

use anyhow::{bail, Result};
use cmdtimeline::prelude::*;
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 2. Parse `tldev [--config <path>] <file> [arguments...]`.
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Some(path)
        }
        Some(_) => bail!("--config needs a path"),
        None => None,
    };
    if args.is_empty() {
        bail!("usage: tldev [--config <path>] <file> [arguments...]");
    }
    let file = args.remove(0);

    // 3. Load configuration and build an in-process host.
    let config = TimelineConfig::load(config_path.as_deref())?;
    info!("Timeline root is {}", config.root.display());
    let host = Arc::new(LocalHost::new());
    register_demo_commands(&host);

    // 4. Create the registry and print its events.
    let registry = TimelineRegistry::new(config, host.clone());
    spawn_event_listener(&registry);

    // 5. Run the timeline until it finishes or Ctrl+C is pressed.
    let run = registry.start(&file, args).await?;
    tokio::select! {
        state = run.finished() => {
            info!("{} ended: {}", file, state);
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping {} timeline(s)...", registry.stop_all().await);
            run.finished().await;
        }
    }

    Ok(())
}

/// Prints every timeline event as it arrives.
fn spawn_event_listener(registry: &TimelineRegistry) {
    let mut rx = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                TimelineEvent::StepFailed { .. } => warn!("[TIMELINE] => {:?}", event),
                _ => info!("[TIMELINE] => {:?}", event),
            }
        }
    });
}

/// Registers a handful of commands a timeline can call.
fn register_demo_commands(host: &LocalHost) {
    host.commands().register(
        Command::new(["say"], |inv| {
            println!("{} {}", format!("[{}]", inv.actor.name()).cyan(), inv.args.join(" "));
            Ok(())
        })
        .do_log(false)
        .help("Says a message to everyone."),
    );
    host.commands().register(
        Command::new(["broadcast", "bc"], |inv| {
            println!("{}", inv.args.join(" ").yellow().bold());
            Ok(())
        })
        .help("Broadcasts a message in the server color."),
    );
    host.commands().register(
        Command::new(["fail"], |inv| bail!("{} asked to fail", inv.actor.name()))
            .help("Always fails. Useful for testing step errors."),
    );
}

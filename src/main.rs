use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use panebridge::commands::{Bridge, KillOutcome, PaneStatus};
use panebridge::data::Provider;
use panebridge::{config, BridgeError};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "panebridge")]
#[command(about = "Drive AI coding assistants running in terminal panes")]
#[command(version)]
struct Args {
    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Overwrite an existing config file (with --init)
    #[arg(long, requires = "init")]
    force: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start assistant panes (claude is always started)
    Up {
        #[arg(value_enum, required = true)]
        providers: Vec<Provider>,
    },
    /// Close assistant panes (all of them if none given)
    Kill {
        #[arg(value_enum)]
        providers: Vec<Provider>,
    },
    /// Show every provider's pane status
    Status,
    /// Send a message without waiting for the reply
    Send {
        #[arg(value_enum)]
        provider: Provider,
        /// Message words; read from stdin when omitted
        message: Vec<String>,
    },
    /// Send a message and wait for the reply
    Ask {
        #[arg(value_enum)]
        provider: Provider,
        /// Seconds to wait before giving up
        #[arg(long, short)]
        timeout: Option<u64>,
        /// Write the reply to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Message words; read from stdin when omitted
        message: Vec<String>,
    },
    /// Print the last N conversation turns
    Pend {
        #[arg(value_enum)]
        provider: Provider,
        #[arg(default_value_t = 1)]
        count: usize,
    },
    /// Check that a provider's pane is alive
    Ping {
        #[arg(value_enum)]
        provider: Provider,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries replies and history
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("panebridge=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    }
}

/// 2 for timeouts and missing logs, 1 for everything else
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BridgeError>())
        .map(|e| ExitCode::from(e.exit_code()))
        .unwrap_or(ExitCode::FAILURE)
}

fn run(args: Args) -> Result<ExitCode> {
    if args.init {
        let path = config::write_default(args.force)?;
        println!("Config saved to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = config::load(args.config.as_deref())?;
    let default_timeout = config.timeout();
    let bridge = Bridge::from_config(config)?;

    match command {
        Command::Up { providers } => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            let launches = bridge.up(&providers, &cwd);
            let mut any_started = false;
            for launch in &launches {
                match &launch.pane {
                    Ok(pane) => {
                        any_started = true;
                        println!("{} started (pane: {})", launch.provider, pane);
                    }
                    Err(e) => eprintln!("Error starting {}: {}", launch.provider, e),
                }
            }
            if !any_started {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Kill { providers } => {
            let providers = if providers.is_empty() {
                Provider::ALL.to_vec()
            } else {
                providers
            };
            for (provider, outcome) in bridge.kill(&providers) {
                match outcome {
                    KillOutcome::NotRunning => {
                        println!("Info: {} session not found or inactive.", provider)
                    }
                    KillOutcome::Killed => println!("Killed {}", provider),
                    KillOutcome::KillFailed(e) => {
                        eprintln!("Warning: failed to kill pane for {}: {}", provider, e);
                        println!("Killed {}", provider);
                    }
                    KillOutcome::RecordNotSaved(e) => {
                        eprintln!("Warning: failed to update {} session record: {}", provider, e);
                    }
                }
            }
        }
        Command::Status => {
            for (provider, status) in bridge.status() {
                println!("{:<10}: {}", provider.name(), status);
            }
        }
        Command::Send { provider, message } => {
            let message = read_message(message)?;
            bridge.send(provider, &message)?;
            println!("Sent.");
        }
        Command::Ask {
            provider,
            timeout,
            output,
            message,
        } => {
            let message = read_message(message)?;
            let timeout = timeout
                .map(std::time::Duration::from_secs)
                .unwrap_or(default_timeout);
            let reply = bridge.ask(provider, &message, timeout)?;
            match output {
                Some(path) => std::fs::write(&path, &reply)
                    .with_context(|| format!("Failed to write reply to {}", path.display()))?,
                None => println!("{}", reply),
            }
        }
        Command::Pend { provider, count } => {
            let items = bridge.pend(provider, count)?;
            let rendered: Vec<String> = items.iter().map(|i| i.to_string()).collect();
            if !rendered.is_empty() {
                println!("{}", rendered.join("\n---\n"));
            }
        }
        Command::Ping { provider } => match bridge.ping(provider)? {
            PaneStatus::Running(pane) => println!("{} connection OK (pane: {})", provider, pane),
            _ => {
                println!("{}: process dead but session file exists", provider);
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Message from command-line words, or from piped stdin when there are none
fn read_message(words: Vec<String>) -> Result<String> {
    let mut message = words.join(" ");
    if message.trim().is_empty() && !atty::is(atty::Stream::Stdin) {
        std::io::stdin()
            .read_to_string(&mut message)
            .context("Failed to read message from stdin")?;
    }
    if message.trim().is_empty() {
        anyhow::bail!("No message given");
    }
    Ok(message)
}

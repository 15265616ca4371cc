/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: TUI session, one-shot task commands, headless watcher or deployment
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;
mod tui;

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use task_reward_app::dispatcher::CreateTaskForm;
use task_reward_app::{AppConfig, TaskAction, ViewMode};

use crate::tui::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory};

#[derive(Parser, Debug)]
#[command(name = "task-reward", version, about = "TaskRewardPlatform client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Load and validate configuration, then exit
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Print the task list
    List {
        #[arg(long, value_name = "MODE", default_value_t = ViewMode::All)]
        view: ViewMode,
    },
    /// Create a task, attaching the reward
    Create {
        #[arg(long)]
        title: String,
        /// Reward in ETH, e.g. 0.5
        #[arg(long)]
        reward: String,
        /// RFC 3339, "YYYY-MM-DD HH:MM" (local) or unix seconds
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Take an open task
    Take { id: u64 },
    /// Submit a task you are solving
    Submit { id: u64 },
    /// Cancel an open task you created
    Cancel { id: u64 },
    /// Follow account changes and refresh periodically until interrupted
    Watch,
    /// Deploy the contract from a compiler artifact
    Deploy {
        #[arg(long, value_name = "PATH")]
        artifact: PathBuf,
    },
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn needs_contract(&self) -> bool {
        !matches!(self, Command::Deploy { .. } | Command::Init { .. })
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Tui);

    if let Command::Init { output } = &command {
        let output = match output.clone() {
            Some(path) => path,
            None => AppConfig::default_path().context("no config directory on this platform")?,
        };
        return cli::init::run_init(output);
    }

    let log_buffer = match command {
        Command::Tui if !args.dry_run => {
            let buffer: LogBufferHandle = Arc::new(StdMutex::new(LogBuffer::new(LOG_BUFFER_CAPACITY)));
            init_tracing_with_buffer(&args.log_level, buffer.clone())?;
            Some(buffer)
        }
        _ => {
            init_tracing(&args.log_level)?;
            None
        }
    };

    let config_path = args.config_path.clone().or_else(AppConfig::default_path);
    info!(
        config_path = ?config_path,
        dry_run = args.dry_run,
        "starting task-reward"
    );

    let config = load_config(args.config_path.is_some(), config_path)?;
    if command.needs_contract() {
        let address = config.contract_address()?;
        info!(rpc_url = %config.rpc_url, contract = %address, "configuration loaded");
    }

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    runtime.block_on(async move {
        match command {
            Command::Tui => {
                let log_buffer = log_buffer.ok_or_else(|| anyhow!("log buffer missing"))?;
                tui::run_tui_with_log(config, log_buffer).await
            }
            Command::List { view } => cli::commands::run_list(&config, view).await,
            Command::Create {
                title,
                reward,
                deadline,
                description,
            } => {
                let form = CreateTaskForm {
                    title,
                    reward,
                    description,
                    deadline,
                };
                cli::commands::run_create(&config, form).await
            }
            Command::Take { id } => cli::commands::run_task_action(&config, TaskAction::Take, id).await,
            Command::Submit { id } => {
                cli::commands::run_task_action(&config, TaskAction::Submit, id).await
            }
            Command::Cancel { id } => {
                cli::commands::run_task_action(&config, TaskAction::Cancel, id).await
            }
            Command::Watch => {
                let shutdown = CancellationToken::new();
                setup_signal_handlers(shutdown.clone());
                cli::commands::run_watch(&config, shutdown).await
            }
            Command::Deploy { artifact } => cli::commands::run_deploy(&config, &artifact).await,
            Command::Init { .. } => Ok(()),
        }
    })
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn init_tracing_with_buffer(log_level: &str, buffer: LogBufferHandle) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(LogWriterFactory::new(buffer))
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(explicit: bool, path: Option<PathBuf>) -> Result<AppConfig> {
    AppConfig::load(path.as_deref(), explicit).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}

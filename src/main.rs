//! Pomobar - a menu bar Pomodoro timer
//!
//! `pomobar daemon` runs the timer with its menu bar icon. Every other
//! subcommand talks to the running daemon over a Unix socket:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after 4 focus phases

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomobar::cli::{Cli, Commands, ConfigArgs, DaemonArgs, Display, IpcClient};
use pomobar::daemon::{self, ipc::default_socket_path, DaemonOptions};
use pomobar::settings::default_settings_path;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    tracing::debug!(command = ?cli.command, "Executing");

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => run_daemon(cli.socket, args).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
        Commands::Config(args) => configure(IpcClient::from_option(cli.socket)?, args).await,
        Commands::Status => {
            let response = IpcClient::from_option(cli.socket)?.status().await?;
            Display::show_status(&response);
            Ok(())
        }
        command => {
            let client = IpcClient::from_option(cli.socket)?;
            let response = match command {
                Commands::Start => client.start().await?,
                Commands::Pause => client.pause().await?,
                Commands::Stop => client.stop().await?,
                Commands::Skip => client.skip().await?,
                Commands::Reset => client.reset().await?,
                _ => client.toggle().await?,
            };
            Display::show_action(&response);
            Ok(())
        }
    }
}

/// Shows the configuration, or updates it when options are given.
async fn configure(client: IpcClient, args: ConfigArgs) -> Result<()> {
    let response = if args.is_empty() {
        client.status().await?
    } else {
        let response = client.configure(args.to_params()).await?;
        println!("✓ {}", response.message);
        response
    };
    Display::show_configuration(&response);
    Ok(())
}

/// Resolves default paths and runs the daemon in the foreground.
async fn run_daemon(socket: Option<std::path::PathBuf>, args: DaemonArgs) -> Result<()> {
    let socket_path = match socket {
        Some(path) => path,
        None => default_socket_path()?,
    };
    let settings_path = match args.settings {
        Some(path) => path,
        None => default_settings_path()?,
    };

    daemon::run(DaemonOptions {
        socket_path,
        settings_path,
        sound: !args.no_sound,
        notifications: !args.no_notifications,
        tray: !args.no_tray,
    })
    .await
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

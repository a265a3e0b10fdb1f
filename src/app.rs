//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config::VoxlogConfig;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal voice recorder with real-time spectrum visualization
#[derive(Parser)]
#[command(name = "voxlog")]
#[command(version)]
#[command(about = "A terminal voice recorder with real-time spectrum visualization")]
#[command(
    long_about = "A terminal voice recorder with real-time spectrum visualization.\n\nRecordings are transcribed through a workflow webhook and stored in a local\nhistory with a running word total.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Record, transcribe, and pipe the result\n    $ voxlog | wc -w\n\n    # Transcribe an existing audio file\n    $ voxlog transcribe memo.wav\n\n    # Show the history and the running word total\n    $ voxlog history\n\n    # Edit configuration file\n    $ voxlog config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxlog/voxlog.toml\n    History database:   ~/.local/share/voxlog/history.db\n    Logs:               ~/.local/state/voxlog/voxlog.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record audio with real-time spectrum visualization (default)
    ///
    /// Press Enter to transcribe, Escape/q to cancel. The transcription is
    /// revealed with a typewriter animation, saved to history, and printed
    /// to stdout on exit. An external `kill -USR1` also stops the recording.
    #[command(visible_alias = "r")]
    Record,

    /// Transcribe a pre-recorded audio file
    ///
    /// Uploads an existing audio file to the configured webhook and prints
    /// the transcription to stdout.
    ///
    /// Examples:
    ///   voxlog transcribe recording.wav
    ///   voxlog transcribe memo.wav | grep keyword
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print transcription history and the running word total
    #[command(visible_alias = "h")]
    History,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio, webhook, and interface settings.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in voxlog.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   voxlog completions bash > voxlog.bash
    ///   voxlog completions zsh > _voxlog
    ///   voxlog completions fish > voxlog.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If configuration cannot be loaded
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxlog", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    let config = VoxlogConfig::load_or_create().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow!("Configuration error: {e}. Check your ~/.config/voxlog/voxlog.toml file.")
    })?;
    let data_dir = data_dir()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record(&config, &data_dir).await?;
        }
        Some(Commands::Transcribe { file }) => {
            commands::handle_transcribe(file, &config, &data_dir).await?;
        }
        Some(Commands::History) => {
            commands::handle_history(&data_dir)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

/// Determines the data directory that holds the history database.
///
/// # Errors
/// - If the home directory cannot be determined
fn data_dir() -> Result<PathBuf, anyhow::Error> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local").join("share").join("voxlog"))
}

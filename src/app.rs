//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("medscribe")
        .join("medscribe.toml");

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal dictation tool: record, transcribe, and review with time-synced highlighting
#[derive(Parser)]
#[command(name = "medscribe")]
#[command(version)]
#[command(about = "Terminal medical dictation with time-synced transcript review")]
#[command(
    long_about = "Terminal medical dictation: record or upload audio, transcribe via a\nspeech-to-text provider, and review the transcript in an interactive playback\nview with time-synced word highlighting.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n    Record options (-c, -o) can be used without explicitly saying 'record'.\n\nEXAMPLES:\n    # Record, transcribe, and review\n    $ medscribe\n    \n    # Record and copy the transcript to the clipboard instead\n    $ medscribe -c\n    \n    # Transcribe an existing audio file and review it\n    $ medscribe transcribe visit-2026-08-01.mp3\n    \n    # Re-open the most recent transcription for review\n    $ medscribe review\n    \n    # Retry transcription of the most recent recording\n    $ medscribe retry\n    \n    # Set up authentication and select a model\n    $ medscribe auth\n    \n    # Manage clinical vocabulary terms\n    $ medscribe vocabulary"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/medscribe/medscribe.toml\n    Logs:               ~/.local/state/medscribe/medscribe.log.*"
)]
struct Cli {
    /// Copy transcription to clipboard instead of opening review (record default command)
    #[arg(short, long)]
    clipboard: bool,

    /// Write transcription to file instead of opening review (record default command)
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record audio with live visualization, then transcribe and review (default)
    ///
    /// Press Enter to transcribe, Space to pause/resume, Escape/q to cancel.
    /// After transcription the playback review view opens with time-synced
    /// highlighting; use -c or -o to skip review and route the text instead.
    #[command(visible_alias = "r")]
    Record {
        /// Copy transcription to clipboard instead of opening review
        #[arg(short, long)]
        clipboard: bool,

        /// Write transcription to file instead of opening review
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,
    },

    /// Transcribe a pre-recorded audio file
    ///
    /// Transcribe an existing audio file using the configured provider/model.
    /// Supports the same output options as record.
    ///
    /// Examples:
    ///   medscribe transcribe visit.ogg
    ///   medscribe transcribe ward-round.mp3 -c
    ///   medscribe transcribe consult.wav -o note.txt
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Copy transcription to clipboard instead of opening review
        #[arg(short, long)]
        clipboard: bool,

        /// Write transcription to file instead of opening review
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<String>,
    },

    /// Re-open a saved transcription in the playback review view
    ///
    /// Opens a past dictation with its audio for time-synced review.
    /// Requires the recording to still be retained.
    #[command(visible_alias = "rv")]
    Review {
        /// Transcription index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// Retry transcription of a previous recording
    ///
    /// Re-transcribe a recording using the current model/provider settings.
    /// Useful when transcription failed or you want to try a different model.
    Retry {
        /// Recording index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Copy transcription to clipboard instead of opening review
        #[arg(short, long)]
        clipboard: bool,

        /// Write transcription to file instead of opening review
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,
    },

    /// Authenticate with a transcription provider and select model
    ///
    /// Configure your provider credentials and choose which model to use.
    /// Handles both provider selection and API key management in one flow.
    #[command(visible_alias = "a")]
    Auth,

    /// View and browse transcription history
    ///
    /// Browse previous transcriptions; Enter copies one to the clipboard,
    /// 'r' re-opens a reviewable entry in the playback view.
    #[command(visible_alias = "h")]
    History,

    /// Manage clinical vocabulary for improved transcription accuracy
    ///
    /// Add drug names, anatomy, and other domain-specific terms to help
    /// the provider transcribe them accurately.
    #[command(visible_alias = "v")]
    Vocabulary,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, provider options, and other configuration.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in medscribe.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   medscribe completions bash > medscribe.bash
    ///   medscribe completions zsh > _medscribe
    ///   medscribe completions fish > medscribe.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "medscribe", &mut io::stdout());
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

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record { .. }) => {
            // Default command is record
            // Explicit record command options take precedence over top-level ones
            let (clipboard, output) = match cli.command {
                Some(Commands::Record { clipboard, output }) => (clipboard, output),
                None => (cli.clipboard, cli.output),
                _ => unreachable!(),
            };
            commands::handle_record(clipboard, output).await?;
        }
        Some(Commands::Transcribe {
            file,
            clipboard,
            output,
        }) => {
            commands::handle_transcribe(file, clipboard, output).await?;
        }
        Some(Commands::Review { index }) => {
            commands::handle_review(index).await?;
        }
        Some(Commands::Retry {
            index,
            clipboard,
            output,
        }) => {
            commands::handle_retry(index, clipboard, output).await?;
        }
        Some(Commands::Auth) => {
            if let Err(e) = commands::handle_auth().await {
                // Cancellation already printed its own message via cliclack
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::History) => {
            commands::handle_history().await?;
        }
        Some(Commands::Vocabulary) => {
            commands::handle_vocabulary().await?;
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

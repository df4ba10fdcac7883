//! Clipboard utilities for medscribe.
//!
//! Copies transcribed text to the system clipboard via pbcopy (macOS),
//! wl-copy (Wayland), or xclip (X11). Clipboard failures never fail the
//! transcription itself.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Copies text to the system clipboard.
///
/// Attempts pbcopy first on macOS, wl-copy for Wayland environments, then
/// falls back to xclip for X11. A missing clipboard tool logs a warning and
/// returns Ok so the caller's flow continues.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if try_pipe("pbcopy", &[], text) {
            return Ok(());
        }
    }

    if try_pipe("wl-copy", &["--type", "text/plain", "--trim-newline"], text) {
        return Ok(());
    }

    if try_pipe("xclip", &["-selection", "clipboard", "-in", "-quiet"], text) {
        return Ok(());
    }

    #[cfg(target_os = "macos")]
    tracing::warn!("No clipboard tool available (pbcopy not found)");
    #[cfg(not(target_os = "macos"))]
    tracing::warn!("No clipboard tool available (wl-copy or xclip not found)");
    Ok(())
}

/// Spawns a clipboard tool and pipes the text to its stdin.
///
/// The brief sleep gives the tool time to take ownership of the clipboard
/// before this process exits.
fn try_pipe(tool: &str, args: &[&str], text: &str) -> bool {
    let child = Command::new(tool).args(args).stdin(Stdio::piped()).spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(_) => {
            tracing::debug!("{tool} not found or not executable");
            return false;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        match write!(stdin, "{text}") {
            Ok(_) => {
                drop(stdin);
                thread::sleep(Duration::from_millis(100));
                tracing::debug!("Transcribed text copied to clipboard via {tool}");
                return true;
            }
            Err(e) => {
                tracing::warn!("Failed to write to {tool} stdin: {e}");
            }
        }
    }

    false
}

//! List available audio input devices.
//!
//! Prints device indices, names, and default configurations so the correct
//! input device can be set in medscribe.toml.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

/// Lists audio input devices to stdout.
///
/// Runs before logging/config setup, so output goes straight to the terminal.
///
/// # Errors
/// - If input devices cannot be enumerated
pub fn handle_list_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate audio input devices: {e}"))?
        .collect();

    if devices.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    println!("Available audio input devices:");
    println!();

    for (index, device) in devices.iter().enumerate() {
        let name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let marker = if Some(&name) == default_name.as_ref() {
            " (default)"
        } else {
            ""
        };

        println!("  [{index}] {name}{marker}");

        match device.default_input_config() {
            Ok(config) => {
                println!(
                    "      {} Hz, {} channel(s), {:?}",
                    config.sample_rate().0,
                    config.channels(),
                    config.sample_format()
                );
            }
            Err(e) => {
                println!("      configuration unavailable: {e}");
            }
        }
    }

    println!();
    println!("Set a device in ~/.config/medscribe/medscribe.toml:");
    println!("  device = \"default\"    # or an index / device name from above");

    Ok(())
}

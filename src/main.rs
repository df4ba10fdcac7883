//! medscribe entry point.

mod app;
mod clipboard;
mod commands;
mod config;
mod history;
mod logging;
mod playback;
mod recording;
mod review;
mod setup;
mod transcript;
mod transcription;
mod ui;
mod vocabulary;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

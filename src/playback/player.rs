//! Owned playback handle around a spawned system audio player.
//!
//! Review playback spawns ffplay and tracks the position clock locally: the
//! player process cannot be paused in place, so pause captures the current
//! position and stops the process, and resume (or a user seek) restarts it at
//! the requested offset. That restart is exactly the seek-and-play command
//! the alignment tracker issues.
//!
//! Lifecycle contract: whoever creates the handle releases it exactly once,
//! on every exit path. `release()` is guarded against double invocation and
//! `Drop` releases if the caller has not.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Instant;

use anyhow::{anyhow, Result};

use crate::recording::ffmpeg::find_ffplay;

/// Monotonic playback position clock.
///
/// Tracks a base offset in seconds plus the wall-clock time since playback
/// last started. Separate from the process handling so the arithmetic is
/// testable without spawning a player.
#[derive(Debug)]
struct PositionClock {
    /// Position when playback last started, in seconds.
    base: f64,
    /// Wall-clock origin of the current playing span. `None` while stopped.
    origin: Option<Instant>,
}

impl PositionClock {
    fn new() -> Self {
        Self {
            base: 0.0,
            origin: None,
        }
    }

    /// Current position in seconds.
    fn position(&self) -> f64 {
        match self.origin {
            Some(origin) => self.base + origin.elapsed().as_secs_f64(),
            None => self.base,
        }
    }

    /// Starts advancing from the current base.
    fn start(&mut self) {
        self.origin = Some(Instant::now());
    }

    /// Stops advancing, folding the elapsed span into the base.
    fn stop(&mut self) {
        self.base = self.position();
        self.origin = None;
    }

    /// Jumps to an absolute position. Only meaningful while stopped.
    fn set(&mut self, seconds: f64) {
        self.base = seconds.max(0.0);
        self.origin = None;
    }

    fn is_running(&self) -> bool {
        self.origin.is_some()
    }
}

/// Owned handle to the review playback surface.
#[derive(Debug)]
pub struct PlayerHandle {
    audio_path: PathBuf,
    ffplay: PathBuf,
    child: Option<Child>,
    clock: PositionClock,
    /// Total audio duration, when the transcription result reported one.
    duration: Option<f64>,
    released: bool,
}

impl PlayerHandle {
    /// Creates a playback handle for the given audio file.
    ///
    /// # Errors
    /// - If the audio file does not exist
    /// - If ffplay cannot be located
    pub fn new(audio_path: &Path, duration: Option<f64>) -> Result<Self> {
        if !audio_path.exists() {
            return Err(anyhow!(
                "Audio file not found: {}",
                audio_path.display()
            ));
        }

        let ffplay = find_ffplay()?;

        Ok(Self {
            audio_path: audio_path.to_path_buf(),
            ffplay,
            child: None,
            clock: PositionClock::new(),
            duration,
            released: false,
        })
    }

    /// Starts or resumes playback from the current position.
    pub fn play(&mut self) -> Result<()> {
        if self.clock.is_running() {
            return Ok(());
        }
        self.spawn_at(self.clock.base)?;
        self.clock.start();
        tracing::debug!("Playback started at {:.2}s", self.clock.base);
        Ok(())
    }

    /// Pauses playback, capturing the current position.
    pub fn pause(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        self.clock.stop();
        self.kill_child();
        tracing::debug!("Playback paused at {:.2}s", self.clock.base);
    }

    /// Jumps the clock to the given position and begins playing.
    pub fn seek_and_play(&mut self, seconds: f64) -> Result<()> {
        self.kill_child();
        self.clock.set(seconds);
        self.spawn_at(self.clock.base)?;
        self.clock.start();
        tracing::debug!("Playback seeked to {:.2}s", self.clock.base);
        Ok(())
    }

    /// Current playback position in seconds.
    pub fn position(&self) -> f64 {
        self.clock.position()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Checks whether playback reached the end of the audio.
    ///
    /// Returns true once per completed run: the player exits on its own at
    /// end of file, and a known duration serves as a backstop when the
    /// process lingers.
    pub fn poll_ended(&mut self) -> bool {
        if !self.clock.is_running() {
            return false;
        }

        let child_exited = match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
            None => true,
        };

        let past_duration = self
            .duration
            .is_some_and(|d| self.clock.position() >= d + 0.25);

        if child_exited || past_duration {
            self.clock.stop();
            if let Some(duration) = self.duration {
                self.clock.set(self.clock.base.min(duration));
            }
            self.kill_child();
            tracing::debug!("Playback ended at {:.2}s", self.clock.base);
            return true;
        }

        false
    }

    /// Releases the playback resource. Safe to call once; subsequent calls
    /// and `Drop` are no-ops after the first.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.clock.stop();
        self.kill_child();
        tracing::debug!("Playback handle released: {}", self.audio_path.display());
    }

    fn spawn_at(&mut self, seconds: f64) -> Result<()> {
        let mut cmd = Command::new(&self.ffplay);
        cmd.arg("-nodisp")
            .arg("-autoexit")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format!("{seconds:.3}"))
            .arg(&self.audio_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| anyhow!("Failed to start audio playback: {e}"))?;
        self.child = Some(child);
        Ok(())
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("Playback process already exited: {e}");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_starts_at_zero_and_holds_while_stopped() {
        let clock = PositionClock::new();
        assert_eq!(clock.position(), 0.0);
        assert!(!clock.is_running());
    }

    #[test]
    fn clock_advances_while_running() {
        let mut clock = PositionClock::new();
        clock.start();
        std::thread::sleep(Duration::from_millis(30));
        assert!(clock.position() > 0.0);
        assert!(clock.is_running());
    }

    #[test]
    fn stop_folds_elapsed_time_into_base() {
        let mut clock = PositionClock::new();
        clock.start();
        std::thread::sleep(Duration::from_millis(30));
        clock.stop();

        let held = clock.position();
        assert!(held > 0.0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.position(), held);
    }

    #[test]
    fn set_jumps_and_clamps_to_zero() {
        let mut clock = PositionClock::new();
        clock.set(12.5);
        assert_eq!(clock.position(), 12.5);
        clock.set(-3.0);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn missing_audio_file_is_rejected() {
        let err = PlayerHandle::new(Path::new("/nonexistent/visit.mp3"), None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}

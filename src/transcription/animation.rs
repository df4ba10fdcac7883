//! Progress animation shown while a transcription request is in flight.
//!
//! A sweeping band of blocks rendered with a Sparkline, matching the look of
//! the recording waveform. Driven by the caller at its render cadence; each
//! `update()` advances the sweep one step.

use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::Sparkline,
};

/// Width of the sweeping band, in cells.
const BAND_WIDTH: usize = 12;

/// Animated progress indicator for in-flight transcription.
pub struct TranscriptionAnimation {
    /// Display values fed to the sparkline, one per column.
    columns: Vec<u64>,
    /// Leading edge of the sweep.
    position: usize,
    /// Sweep direction: true = rightward.
    forward: bool,
}

impl TranscriptionAnimation {
    /// Creates an animation sized to the given terminal width.
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![0; width.max(BAND_WIDTH)],
            position: 0,
            forward: true,
        }
    }

    /// Advances the sweep one step, bouncing at the edges.
    pub fn update(&mut self) {
        let len = self.columns.len();

        if self.forward {
            if self.position + 1 >= len {
                self.forward = false;
            } else {
                self.position += 1;
            }
        } else if self.position == 0 {
            self.forward = true;
        } else {
            self.position -= 1;
        }

        for (i, column) in self.columns.iter_mut().enumerate() {
            let distance = self.position.abs_diff(i);
            *column = if distance < BAND_WIDTH {
                (BAND_WIDTH - distance) as u64 * 100 / BAND_WIDTH as u64
            } else {
                0
            };
        }
    }

    /// Renders one frame of the animation into the given area.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        if self.columns.len() != area.width as usize {
            self.columns.resize(area.width.max(BAND_WIDTH as u16) as usize, 0);
            self.position = self.position.min(self.columns.len().saturating_sub(1));
        }

        let sparkline = Sparkline::default()
            .data(&self.columns)
            .max(100)
            .style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .fg(Color::Rgb(206, 224, 220)),
            );

        let band_area = Rect {
            x: area.x,
            y: area.y + area.height / 2,
            width: area.width,
            height: 1,
        };

        frame.render_widget(sparkline, band_area);

        let label = ratatui::widgets::Paragraph::new("transcribing…")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(185, 207, 212)));

        let label_area = Rect {
            x: area.x,
            y: band_area.y.saturating_add(2).min(area.y + area.height.saturating_sub(1)),
            width: area.width,
            height: 1,
        };
        frame.render_widget(label, label_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_bounces_at_edges() {
        let mut animation = TranscriptionAnimation::new(16);
        for _ in 0..100 {
            animation.update();
            assert!(animation.position < animation.columns.len());
        }
    }
}

//! Terminal playback view for a transcribed result.
//!
//! Drives the alignment tracker from the playback clock and renders the
//! transcript with the active unit emphasized (bold+underline while playing),
//! kept centered as playback advances. Clicking a unit, or selecting one with
//! the arrow keys and pressing Enter, jumps playback to that unit's start.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

use super::layout::TranscriptLayout;
use crate::playback::PlayerHandle;
use crate::transcript::{AlignmentTracker, ClockEffect};
use crate::transcription::TranscriptionResult;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const ACCENT_FG: Color = Color::Rgb(206, 224, 220);
const META_FG: Color = Color::Rgb(100, 100, 100);
const SELECT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// Interactive playback view for one transcription result.
pub struct ReviewUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    tracker: AlignmentTracker,
    player: PlayerHandle,
    title: String,
    meta_line: String,
    layout: TranscriptLayout,
    layout_width: u16,
    /// Top visible layout line.
    scroll: usize,
    /// Keyboard cursor over units.
    selected: usize,
    /// Transcript viewport size from the last draw.
    viewport: (u16, u16),
    cleaned_up: bool,
}

impl ReviewUi {
    /// Creates the review view and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    pub fn new(
        result: &TranscriptionResult,
        tracker: AlignmentTracker,
        player: PlayerHandle,
        title: String,
    ) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            tracker,
            player,
            title,
            meta_line: format_meta_line(result),
            layout: TranscriptLayout::default(),
            layout_width: 0,
            scroll: 0,
            selected: 0,
            viewport: (0, 0),
            cleaned_up: false,
        })
    }

    /// Runs the review loop until the user exits.
    ///
    /// The playback handle is released exactly once, on every exit path,
    /// before the terminal is restored.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!(
            "Review started: {} units, interactive={}",
            self.tracker.transcript().units().len(),
            self.tracker.transcript().is_interactive()
        );

        let outcome = self.event_loop();

        self.player.release();
        self.cleanup()?;
        outcome
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.advance_clock()?;
            self.draw()?;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key)? {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse)?,
                    _ => {}
                }
            }
        }
    }

    /// Feeds the playback clock into the tracker and applies the effect.
    ///
    /// While paused the surface reports no new time, so the tracker is left
    /// alone and keeps its last (unemphasized) index.
    fn advance_clock(&mut self) -> Result<()> {
        if !self.player.is_playing() {
            return Ok(());
        }

        if self.player.poll_ended() {
            self.tracker.on_ended();
            return Ok(());
        }

        match self.tracker.on_clock_update(self.player.position()) {
            ClockEffect::ScrollTo(unit) => self.center_on(unit),
            ClockEffect::ClearHighlight => {}
        }
        Ok(())
    }

    /// Scrolls so the unit's line sits centered in the viewport. A no-op
    /// when the unit is already centered, so repeated effects for the same
    /// unit never disturb the view.
    fn center_on(&mut self, unit: usize) {
        if let Some(line) = self.layout.line_of(unit) {
            self.scroll = self.layout.centered_scroll(line, self.viewport.1);
        }
    }

    /// Handles keyboard input. Returns `Ok(true)` when the view should exit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                tracing::debug!("Review exited via Escape/q");
                return Ok(true);
            }
            KeyCode::Char('c')
                if key
                    .modifiers
                    .contains(crossterm::event::KeyModifiers::CONTROL) =>
            {
                return Ok(true);
            }
            KeyCode::Char(' ') => self.toggle_playback()?,
            KeyCode::Left => self.move_selection(-1),
            KeyCode::Right => self.move_selection(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => {
                let max = self
                    .layout
                    .line_count()
                    .saturating_sub(self.viewport.1 as usize);
                self.scroll = (self.scroll + 1).min(max);
            }
            KeyCode::Enter => self.seek_to_unit(self.selected)?,
            _ => {}
        }
        Ok(false)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            MouseEventKind::ScrollDown => {
                let max = self
                    .layout
                    .line_count()
                    .saturating_sub(self.viewport.1 as usize);
                self.scroll = (self.scroll + 1).min(max);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(unit) = self.hit_test(mouse.column, mouse.row) {
                    self.selected = unit;
                    self.seek_to_unit(unit)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_playback(&mut self) -> Result<()> {
        if self.player.is_playing() {
            self.player.pause();
            self.tracker.on_pause();
        } else {
            self.player.play()?;
            self.tracker.on_play();
        }
        Ok(())
    }

    /// Issues the tracker's seek command to the playback surface. Invalid
    /// indices produce no command and nothing happens.
    fn seek_to_unit(&mut self, unit: usize) -> Result<()> {
        if let Some(cmd) = self.tracker.seek_to(unit) {
            tracing::debug!("Seek to unit {} at {:.2}s", cmd.unit, cmd.seconds);
            self.player.seek_and_play(cmd.seconds)?;
            self.tracker.on_play();
        }
        Ok(())
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.tracker.transcript().units().len();
        if count == 0 {
            return;
        }
        let selected = self.selected as isize + delta;
        self.selected = selected.clamp(0, count as isize - 1) as usize;

        if let Some(line) = self.layout.line_of(self.selected) {
            if line < self.scroll || line >= self.scroll + self.viewport.1 as usize {
                self.scroll = self.layout.centered_scroll(line, self.viewport.1);
            }
        }
    }

    /// Maps a terminal click position to a transcript unit.
    fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        let (origin_x, origin_y) = self.transcript_origin();
        let line = (row as usize).checked_sub(origin_y as usize)? + self.scroll;
        let col = column.checked_sub(origin_x)?;
        self.layout.hit_test(line, col)
    }

    /// Top-left of the transcript area: one cell of outer padding plus the
    /// header and divider rows.
    fn transcript_origin(&self) -> (u16, u16) {
        (1, 4)
    }

    /// Renders the current state of the review view.
    fn draw(&mut self) -> Result<()> {
        let playing = self.player.is_playing();
        let position = self.player.position();
        let duration = self.player.duration();
        let title = self.title.clone();
        let meta_line = self.meta_line.clone();

        let interactive = self.tracker.transcript().is_interactive();
        let plain = self
            .tracker
            .transcript()
            .plain_text()
            .map(|t| t.to_string());

        // Split field borrows so the draw closure can read tracker state and
        // update layout/scroll while the terminal is mutably borrowed.
        let Self {
            terminal,
            tracker,
            layout,
            layout_width,
            scroll,
            selected,
            viewport,
            ..
        } = self;
        let selected = *selected;

        terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let inner_area = padding_block.inner(area);

            let [header_area, divider_area, body_area, footer_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(inner_area);

            // Header: title and result metadata
            let indicator = if playing {
                Span::styled("▶ ", Style::default().fg(Color::Green))
            } else {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            };
            let header = Paragraph::new(vec![
                Line::from(vec![
                    indicator,
                    Span::styled(title, Style::default().fg(FG).bold()),
                    Span::styled(
                        format!("  {}", format_clock(position, duration)),
                        Style::default().fg(ACCENT_FG),
                    ),
                ]),
                Line::styled(meta_line, Style::default().fg(META_FG)),
            ]);
            frame.render_widget(header, header_area);
            frame.render_widget(
                Paragraph::new("").style(Style::default().bg(BG)),
                divider_area,
            );

            // Body: highlighted units, or plain text when no timing exists
            if interactive {
                *viewport = (body_area.width, body_area.height);

                if body_area.width != *layout_width {
                    *layout_width = body_area.width;
                    let unit_texts: Vec<&str> = tracker
                        .transcript()
                        .units()
                        .iter()
                        .map(|u| u.text.as_str())
                        .collect();
                    *layout = TranscriptLayout::build(&unit_texts, body_area.width);
                    *scroll = (*scroll).min(layout.line_count().saturating_sub(1));
                }

                let visible = layout
                    .lines()
                    .iter()
                    .skip(*scroll)
                    .take(body_area.height as usize);

                let mut rendered: Vec<Line> = Vec::with_capacity(body_area.height as usize);
                for spans in visible {
                    let mut parts: Vec<Span> = Vec::with_capacity(spans.len() * 2);
                    let mut col = 0usize;
                    for span in spans {
                        if (span.col as usize) > col {
                            parts.push(Span::raw(" ".repeat(span.col as usize - col)));
                        }

                        let mut style = Style::default().fg(FG);
                        if tracker.is_emphasized(span.unit) {
                            style = style
                                .fg(ACCENT_FG)
                                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                        }
                        if span.unit == selected {
                            style = style.bg(SELECT_BG);
                        }

                        parts.push(Span::styled(span.text.clone(), style));
                        col = span.col as usize + span.text.len();
                    }
                    rendered.push(Line::from(parts));
                }

                let paragraph = Paragraph::new(rendered).style(Style::default().bg(BG));
                frame.render_widget(paragraph, body_area);
            } else if let Some(text) = plain {
                let paragraph = Paragraph::new(text)
                    .style(Style::default().fg(FG))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::NONE));
                frame.render_widget(paragraph, body_area);
            }

            // Footer help line
            let help_text = if interactive {
                "space play/pause, ←→ select, ↵/click jump, ↑↓ scroll, esc/q exit"
            } else {
                "no timing data for this result, space play/pause, esc/q exit"
            };
            let help = Paragraph::new(help_text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(HELP_FG));
            frame.render_widget(help, footer_area);
        })?;

        Ok(())
    }

    /// Cleans up terminal and restores normal mode.
    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        tracing::debug!("Review terminal cleanup complete");
        Ok(())
    }
}

impl Drop for ReviewUi {
    fn drop(&mut self) {
        self.player.release();
        let _ = self.cleanup();
    }
}

/// Builds the metadata line shown under the title.
fn format_meta_line(result: &TranscriptionResult) -> String {
    let mut parts = Vec::new();

    let granularity = if result.words.as_ref().is_some_and(|w| !w.is_empty()) {
        "word timing"
    } else if result.segments.as_ref().is_some_and(|s| !s.is_empty()) {
        "segment timing"
    } else {
        "no timing"
    };
    parts.push(granularity.to_string());

    if let Some(language) = &result.language {
        parts.push(language.clone());
    }
    if let Some(metadata) = &result.metadata {
        if let Some(model) = &metadata.model {
            parts.push(model.clone());
        }
        if let Some(confidence) = &metadata.confidence {
            parts.push(format!("confidence: {confidence}"));
        }
    }

    parts.join(" · ")
}

/// Formats the position/duration pair as m:ss / m:ss.
fn format_clock(position: f64, duration: Option<f64>) -> String {
    match duration {
        Some(duration) => format!("{} / {}", format_seconds(position), format_seconds(duration)),
        None => format_seconds(position),
    }
}

fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{ResultMetadata, WordTiming};

    #[test]
    fn clock_formats_as_minutes_and_seconds() {
        assert_eq!(format_seconds(0.0), "0:00");
        assert_eq!(format_seconds(65.4), "1:05");
        assert_eq!(format_clock(5.0, Some(125.0)), "0:05 / 2:05");
        assert_eq!(format_clock(5.0, None), "0:05");
    }

    #[test]
    fn meta_line_reports_granularity_and_metadata() {
        let result = TranscriptionResult {
            text: "bp stable".to_string(),
            language: Some("en".to_string()),
            duration: Some(2.0),
            words: Some(vec![WordTiming {
                text: "bp".to_string(),
                start: 0.0,
                end: 0.5,
            }]),
            segments: None,
            metadata: Some(ResultMetadata {
                confidence: Some("high".to_string()),
                model: Some("nova-3".to_string()),
            }),
        };

        let line = format_meta_line(&result);
        assert!(line.starts_with("word timing"));
        assert!(line.contains("en"));
        assert!(line.contains("nova-3"));
        assert!(line.contains("confidence: high"));
    }

    #[test]
    fn meta_line_for_plain_results() {
        let result = TranscriptionResult::plain("no timing here");
        assert_eq!(format_meta_line(&result), "no timing");
    }
}

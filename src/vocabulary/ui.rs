//! Interactive terminal UI for managing vocabulary terms.
//!
//! Provides a scrollable list of terms with keyboard navigation, mouse
//! scrolling, deletion, and inline entry of new terms.

use crate::vocabulary::VocabularyManager;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Common colors/styles.
const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// Interactive viewer for managing clinical vocabulary terms.
pub struct VocabularyViewer {
    /// Terminal interface
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// List state for managing selection and scroll
    list_state: ListState,
    /// Current terms
    terms: Vec<String>,
    /// Whether in input mode
    input_mode: bool,
    /// Text input widget
    input: Input,
    /// Whether cleanup has been performed
    cleaned_up: bool,
}

impl VocabularyViewer {
    /// Creates a new viewer with the given terms.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    pub fn new(terms: Vec<String>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut list_state = ListState::default();
        if !terms.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            list_state,
            terms,
            input_mode: false,
            input: Input::default(),
            cleaned_up: false,
        })
    }

    /// Runs the interactive vocabulary loop.
    pub fn run(&mut self, manager: &mut VocabularyManager) -> Result<()> {
        loop {
            self.draw()?;

            match event::read()? {
                Event::Key(key) => {
                    if self.input_mode {
                        if self.handle_input_mode_key(manager, key)? {
                            break;
                        }
                    } else if self.handle_normal_mode_key(manager, key)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    if !self.input_mode {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => {
                                self.list_state.select_previous();
                            }
                            MouseEventKind::ScrollDown => {
                                self.list_state.select_next();
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }

        self.cleanup()?;
        Ok(())
    }

    /// Handle key events while *not* in input mode.
    ///
    /// Returns `Ok(true)` if the UI should quit.
    fn handle_normal_mode_key(
        &mut self,
        manager: &mut VocabularyManager,
        key: KeyEvent,
    ) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.list_state.select_previous();
            }
            KeyCode::Down => {
                self.list_state.select_next();
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(index) = self.list_state.selected() {
                    if manager.remove_term(index)?.is_some() {
                        self.terms = manager.load_terms()?;
                        if self.terms.is_empty() {
                            self.list_state.select(None);
                        } else if index >= self.terms.len() {
                            self.list_state.select(Some(self.terms.len() - 1));
                        }
                    }
                }
            }
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.input_mode = true;
                self.input.reset();
            }
            _ => {}
        }
        Ok(false)
    }

    /// Handle key events while in input mode.
    ///
    /// Returns `Ok(true)` if the UI should quit.
    fn handle_input_mode_key(
        &mut self,
        manager: &mut VocabularyManager,
        key: KeyEvent,
    ) -> Result<bool> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = false;
                self.input.reset();
            }
            KeyCode::Enter => {
                let term = self.input.value().to_string();
                if manager.add_term(&term)? {
                    self.terms = manager.load_terms()?;
                    if self.list_state.selected().is_none() {
                        self.list_state.select(Some(0));
                    }
                }
                self.input_mode = false;
                self.input.reset();
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
        Ok(false)
    }

    /// Renders the current state of the vocabulary viewer.
    fn draw(&mut self) -> Result<()> {
        let input_mode = self.input_mode;
        let input_value = self.input.value().to_string();
        let input_cursor = self.input.visual_cursor();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, list_area, input_area, footer_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(if input_mode { 3 } else { 0 }),
                Constraint::Length(1),
            ])
            .areas(padded_area);

            let header = Paragraph::new("medscribe")
                .style(Style::default().fg(FG).bold())
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            let items: Vec<ListItem> = self
                .terms
                .iter()
                .map(|term| ListItem::new(Line::styled(term.clone(), Style::default().fg(FG))))
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Vocabulary ")
                        .borders(Borders::ALL)
                        .padding(Padding::bottom(1)),
                )
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            if input_mode {
                let input_widget = Paragraph::new(input_value.as_str())
                    .style(Style::default().fg(FG))
                    .block(Block::default().title(" New term ").borders(Borders::ALL));
                frame.render_widget(input_widget, input_area);
                frame.set_cursor_position((
                    input_area.x + 1 + input_cursor as u16,
                    input_area.y + 1,
                ));
            }

            let help_text = if input_mode {
                "↵ save, esc cancel"
            } else {
                "↑↓ select, a add, x delete, esc/q exit"
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
        Ok(())
    }
}

impl Drop for VocabularyViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

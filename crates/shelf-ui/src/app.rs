//! Application state and TUI event loop.
//!
//! [`App`] owns the theme, the dashboard session and which selector has
//! focus.  Key handling is kept separate from the terminal so it can be
//! driven directly in tests.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::debug;

use shelf_core::models::FilterSelection;
use shelf_runtime::session::{DashboardSession, Selector};

use crate::dashboard;
use crate::themes::Theme;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Selector that arrow keys act on.
    pub focused: Selector,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    session: DashboardSession,
    source: String,
}

impl App {
    pub fn new(theme_name: &str, session: DashboardSession, source: impl Into<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            focused: Selector::Month,
            should_quit: false,
            session,
            source: source.into(),
        }
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// Blocks the calling thread on `crossterm::event::poll` with a 250 ms
    /// timeout.  Raw mode delivers Ctrl+C as a key event, so quitting always
    /// goes through [`App::handle_key`] and the terminal is restored even when
    /// drawing or reading events fails.  Returns the selection in effect when
    /// the loop ended.
    pub fn run(mut self) -> io::Result<FilterSelection> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result.map(|()| self.session.selection().clone())
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.focused = self.focused.toggle(),
            KeyCode::Char('m') => self.focused = Selector::Month,
            KeyCode::Char('g') => self.focused = Selector::Genre,
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.session.cycle(self.focused, true);
                self.log_selection();
            }
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.session.cycle(self.focused, false);
                self.log_selection();
            }
            KeyCode::Char('a') => {
                if self.session.reset() {
                    self.log_selection();
                }
            }
            _ => {}
        }
    }

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        dashboard::render_dashboard(frame, &self.session, &self.source, self.focused, &self.theme);
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn log_selection(&self) {
        let selection = self.session.selection();
        debug!(
            "Selection changed: month={}, genre={}, matched={}",
            selection.month,
            selection.genre,
            self.session.analysis().metadata.records_matched
        );
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

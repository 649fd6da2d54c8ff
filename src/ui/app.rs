//! Main TUI application state and logic

use crate::replay::{self, RuntimeModelState};
use crate::share::ShareState;
use crate::trace::Example;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Stack,
    Queues,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> console -> stack -> queues)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Queues,
            FocusedPane::Queues => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The example being played back
    pub example: Example,

    /// Current position in the trace: steps `0..index` have been applied
    pub index: usize,

    /// Model state at `index`, rebuilt by full replay on every change
    pub state: RuntimeModelState,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub console_scroll: usize,
    pub stack_scroll: usize,
    pub queues_scroll: usize,

    /// Target visual row for the current line (None = not initialized yet)
    /// This keeps the highlighted line at a fixed position when stepping
    pub target_line_row: Option<usize>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app positioned at `start_index` (clamped) into the
    /// example's trace.
    pub fn new(example: Example, start_index: usize) -> Self {
        let index = replay::clamp_index(&example.steps, start_index);
        // A fresh example replays cleanly by construction; fall back to the
        // empty state if it somehow does not.
        let state =
            replay::replay(&example.steps, index).unwrap_or_else(|_| RuntimeModelState::empty());
        App {
            example,
            index,
            state,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            console_scroll: 0,
            stack_scroll: 0,
            queues_scroll: 0,
            target_line_row: None, // Will be set to center on first render
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing {
                if self.last_play_time.elapsed() >= Duration::from_secs(1) {
                    if self.index < self.example.step_count() {
                        self.jump(self.index + 1);
                        self.status_message = "Playing...".to_string();
                        self.console_scroll = usize::MAX;
                    } else {
                        self.is_playing = false;
                        self.status_message = "Playback complete".to_string();
                    }
                    self.last_play_time = Instant::now();
                }
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Move to `target` and rebuild state by full replay from step 0.
    ///
    /// Backward navigation therefore cannot drift: the state at index k is
    /// always the state of having taken exactly the first k steps.
    fn jump(&mut self, target: usize) {
        let target = replay::clamp_index(&self.example.steps, target);
        match replay::replay(&self.example.steps, target) {
            Ok(state) => {
                self.index = target;
                self.state = state;
            }
            Err(e) => {
                // Malformed trace: keep the current position, surface the
                // violation instead of showing a half-applied state.
                self.status_message = format!("Replay error: {}", e);
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes plus a one-line status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(pane_area);

        // Left column: Source (top) | Narrative | Console (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(55),
                Constraint::Percentage(22),
                Constraint::Percentage(23),
            ])
            .split(columns[0]);

        // Right column: Stack (top) | Queues (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(columns[1]);

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            &self.example.source_code,
            self.state.highlighted_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
            &mut self.target_line_row,
        );

        let last_kind = self
            .index
            .checked_sub(1)
            .and_then(|i| self.example.steps.get(i))
            .map(|s| s.kind);
        super::panes::render_narrative_pane(frame, left_rows[1], &self.state.narrative, last_kind);

        super::panes::render_console_pane(
            frame,
            left_rows[2],
            &self.state.console_log,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        super::panes::render_stack_pane(
            frame,
            right_rows[0],
            &self.state.stack,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        super::panes::render_queues_pane(
            frame,
            right_rows[1],
            &self.state,
            self.focused_pane == FocusedPane::Queues,
            &mut self.queues_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.index,
            self.example.step_count(),
            self.is_playing,
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let before = self.index;
                self.jump(self.index + n);
                self.status_message = format!("Stepped forward {} step(s)", self.index - before);
                self.console_scroll = usize::MAX;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                // Show the shareable state for the current position
                let state = ShareState::new(self.example.name.clone(), self.index);
                self.status_message = format!("Share: {}", state.encode());
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.target_line_row {
                        self.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_sub(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_sub(1);
                }
                FocusedPane::Queues => {
                    self.queues_scroll = self.queues_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling down makes the current line move up visually
                    if let Some(row) = self.target_line_row {
                        self.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_add(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_add(1);
                }
                FocusedPane::Queues => {
                    self.queues_scroll = self.queues_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                // Jump to end of the trace
                self.is_playing = false;
                self.jump(self.example.step_count());
                self.status_message = "Jumped to end".to_string();
                self.console_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                // Jump back to the initial state
                self.is_playing = false;
                self.jump(0);
                self.status_message = "Jumped to start".to_string();
                self.console_scroll = 0;
            }
            _ => {}
        }
    }

    /// Step forward in the trace
    fn step_forward(&mut self) {
        if self.index >= self.example.step_count() {
            self.status_message = "Already at the last step".to_string();
            return;
        }
        self.jump(self.index + 1);
        self.status_message = "Stepped forward".to_string();
        self.console_scroll = usize::MAX;
    }

    /// Step backward in the trace
    fn step_backward(&mut self) {
        if self.index == 0 {
            self.status_message = "Already at the first step".to_string();
            return;
        }
        self.jump(self.index - 1);
        self.status_message = "Stepped backward".to_string();
        self.console_scroll = usize::MAX;
    }
}

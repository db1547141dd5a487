//! Terminal visualization for Sway
//!
//! Provides a TUI showing:
//! - The motion pad with the indicator dot
//! - Axis readouts and the last note played
//! - A scope of the recent output
//! - Status line and the start/stop button

mod pad;
mod waveform;

pub use pad::{indicator_color, MotionPad};
pub use waveform::Waveform;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame as TuiFrame, Terminal,
};

use crate::mapping::{DisplayFrame, Frame, Pitch};
use crate::session::{PlaybackState, Session};

/// Buffer for storing recent audio samples for visualization
pub struct SampleBuffer {
    samples: Vec<f32>,
    capacity: usize,
    write_pos: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: vec![0.0; capacity],
            capacity,
            write_pos: 0,
        }
    }

    /// Push a new sample into the buffer
    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Get all samples in order (oldest to newest)
    pub fn get_samples(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.capacity);
        result.extend_from_slice(&self.samples[self.write_pos..]);
        result.extend_from_slice(&self.samples[..self.write_pos]);
        result
    }

    /// Get the most recent N samples
    pub fn get_recent(&self, count: usize) -> Vec<f32> {
        let count = count.min(self.capacity);
        let samples = self.get_samples();
        samples[self.capacity - count..].to_vec()
    }
}

/// What the display shows between redraws
pub struct VizState {
    pub sample_buffer: Arc<Mutex<SampleBuffer>>,
    pub running: Arc<AtomicBool>,
    /// Latest indicator placement; kept while paused
    pub display: Option<DisplayFrame>,
    pub last_note: Option<Pitch>,
}

impl VizState {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sample_buffer: Arc::new(Mutex::new(SampleBuffer::new(buffer_size))),
            running: Arc::new(AtomicBool::new(true)),
            display: None,
            last_note: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Take the display update and note from a mapped frame
    pub fn record(&mut self, frame: &Frame) {
        if let Some(display) = frame.display() {
            self.display = Some(*display);
        }
        if let Frame::Render(command) = frame {
            self.last_note = Some(command.params.note);
        }
    }
}

/// Run the visualization TUI until quit or until `state` is stopped
pub fn run_viz(session: Arc<Mutex<Session>>, state: Arc<Mutex<VizState>>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = viz_loop(&mut terminal, &session, &state);

    // Restore the terminal even when drawing failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn viz_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &Mutex<Session>,
    state: &Mutex<VizState>,
) -> Result<()> {
    let lock_state = move || state.lock().unwrap_or_else(PoisonError::into_inner);

    while lock_state().is_running() {
        terminal.draw(|f| {
            let session = session.lock().unwrap_or_else(PoisonError::into_inner);
            draw_ui(f, &session, &lock_state());
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match (key.code, key.modifiers) {
                    (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => lock_state().stop(),
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => lock_state().stop(),
                    (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => {
                        session
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .press();
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn draw_ui(f: &mut TuiFrame, session: &Session, state: &VizState) {
    let area = f.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Pad + readouts
            Constraint::Length(7), // Scope
            Constraint::Length(3), // Status
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(28)])
        .split(rows[0]);

    let pad = MotionPad::new(state.display.as_ref(), session.mapper().display_extent())
        .block(Block::default().borders(Borders::ALL).title(" Motion "));
    f.render_widget(pad, top[0]);

    draw_readouts(f, top[1], state);
    draw_scope(f, rows[1], state);
    draw_status(f, rows[2], session);
}

fn draw_readouts(f: &mut TuiFrame, area: Rect, state: &VizState) {
    let axis = |label: &'static str, value: Option<f64>| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::raw(match value {
                Some(v) => format!("{:>7.2}", v),
                None => format!("{:>7}", "-"),
            }),
        ])
    };
    let sample = state.display.map(|d| d.sample);
    let note = state
        .last_note
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        axis("  X: ", sample.map(|s| s.x)),
        axis("  Y: ", sample.map(|s| s.y)),
        axis("  Z: ", sample.map(|s| s.z)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Note: ", Style::default().fg(Color::Gray)),
            Span::styled(note, Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Readings "));
    f.render_widget(paragraph, area);
}

fn draw_scope(f: &mut TuiFrame, area: Rect, state: &VizState) {
    let samples = {
        let buffer = state
            .sample_buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buffer.get_recent(area.width as usize * 64)
    };

    let scope = Waveform::new(&samples)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Output "));
    f.render_widget(scope, area);
}

fn draw_status(f: &mut TuiFrame, area: Rect, session: &Session) {
    let button_color = match session.state() {
        PlaybackState::Active => Color::Red,
        PlaybackState::Idle => Color::Green,
    };

    let text = Line::from(vec![
        Span::raw("  "),
        Span::styled(session.status().to_string(), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(
            format!("[{}]", session.button_label()),
            Style::default().fg(button_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Space: start/stop  |  q: quit"),
    ]);

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

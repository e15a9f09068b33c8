//! Countdown display.
//!
//! The timer loop pushes a [`Frame`] after every change; the terminal view
//! prints a header whenever the session switches between running and paused
//! and rewrites a single progress line in place on every tick.

use std::io::{self, Stdout, Write};

use colored::Colorize;
use crossterm::{
    cursor::{MoveToColumn, MoveToNextLine},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

use super::session::{SessionSnapshot, SessionState};
use crate::error::DwtimerError;

/// Everything a view needs to draw one update.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub objective: &'a str,
    pub elapsed_seconds: u32,
    pub planned_seconds: u32,
    pub session: SessionSnapshot,
}

impl Frame<'_> {
    #[must_use]
    pub const fn remaining_seconds(&self) -> u32 {
        self.planned_seconds.saturating_sub(self.elapsed_seconds)
    }

    /// Progress as a fraction (0.0 - 1.0).
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.planned_seconds == 0 {
            return 1.0;
        }
        (f64::from(self.elapsed_seconds) / f64::from(self.planned_seconds)).min(1.0)
    }
}

/// Something that shows the countdown to the user.
pub trait ProgressView {
    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), DwtimerError>;

    /// Show a one-off message below the progress line.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn notice(&mut self, message: &str) -> Result<(), DwtimerError>;

    /// Leave the output in a state where normal printing can resume.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn finish(&mut self) -> Result<(), DwtimerError>;
}

/// ANSI terminal view.
///
/// Line breaks are emitted as cursor movements so output stays aligned
/// while the terminal is in raw mode.
pub struct TerminalView<W: Write = Stdout> {
    out: W,
    legend: String,
    bar_width: usize,
    shown_state: Option<SessionState>,
}

impl TerminalView<Stdout> {
    /// View writing to stdout.
    #[must_use]
    pub fn stdout(legend: String, bar_width: usize) -> Self {
        Self::new(io::stdout(), legend, bar_width)
    }
}

impl<W: Write> TerminalView<W> {
    #[must_use]
    pub const fn new(out: W, legend: String, bar_width: usize) -> Self {
        Self {
            out,
            legend,
            bar_width,
            shown_state: None,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text),
            MoveToNextLine(1)
        )
    }

    fn header(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let title = match frame.session.state {
            SessionState::Paused => format!("⏸  Paused task: {}", frame.objective)
                .red()
                .bold()
                .to_string(),
            SessionState::Running | SessionState::Ended => format!("▶  {}", frame.objective)
                .green()
                .bold()
                .to_string(),
        };
        let legend = format!("   {}", self.legend).dimmed().to_string();

        self.line("")?;
        self.line(&title)?;
        self.line(&legend)
    }
}

impl<W: Write> ProgressView for TerminalView<W> {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), DwtimerError> {
        if self.shown_state != Some(frame.session.state) {
            self.header(frame)?;
            self.shown_state = Some(frame.session.state);
        }

        let bar = render_progress_bar(frame.progress(), self.bar_width);
        let mut status = format!(
            "{bar} {} / {}  ({} left)",
            format_mmss(frame.elapsed_seconds),
            format_mmss(frame.planned_seconds),
            format_mmss(frame.remaining_seconds()),
        );
        if frame.session.distractions > 0 {
            status.push_str(&format!("  distractions: {}", frame.session.distractions));
        }
        if frame.session.paused_seconds > 0 {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let paused = frame.session.paused_seconds as u32;
            status.push_str(&format!("  paused: {}", format_mmss(paused)));
        }
        if frame.session.pauses > 0 {
            status.push_str(&format!("  pauses: {}", frame.session.pauses));
        }

        let status = if frame.session.state == SessionState::Paused {
            status.dimmed().to_string()
        } else {
            status
        };

        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<(), DwtimerError> {
        queue!(self.out, MoveToNextLine(1))?;
        self.line(&message.yellow().to_string())?;
        self.shown_state = None;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DwtimerError> {
        queue!(self.out, MoveToNextLine(1))?;
        self.out.flush()?;
        self.shown_state = None;
        Ok(())
    }
}

/// Format whole seconds as MM:SS (minutes may exceed 59).
#[must_use]
pub fn format_mmss(seconds: u32) -> String {
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress * width as f64) as usize).min(width);
    let empty = width - filled;

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

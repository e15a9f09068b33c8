//! Interactive questions asked before each session.
//!
//! End of input is treated as "no" / "nothing entered", so a closed stdin
//! ends the program cleanly instead of looping.

use std::io::{self, BufRead, Stdin, Stdout, Write};

use colored::Colorize;

use crate::error::DwtimerError;
use crate::focus::LineFeed;

/// What the user wants to work on next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub objective: String,
    pub duration_seconds: u32,
}

/// Source of answer lines.
pub trait LineInput {
    /// Read one line into `buf`, returning 0 at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

/// Where answers come from for the current run.
pub enum Answers<'a> {
    /// Stdin directly. Only used in raw mode, where nothing else reads stdin
    /// between sessions.
    Terminal(Stdin),
    /// The run's shared line feed, also used for session commands.
    Lines(&'a LineFeed),
}

impl LineInput for Answers<'_> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            Self::Terminal(stdin) => stdin.lock().read_line(buf),
            Self::Lines(feed) => Ok(feed.next_line().map_or(0, |line| {
                buf.push_str(&line);
                buf.push('\n');
                line.len() + 1
            })),
        }
    }
}

#[cfg(test)]
impl LineInput for io::Cursor<Vec<u8>> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Line-based question asker.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<'a> Prompter<Answers<'a>, Stdout> {
    /// Prompter writing to stdout.
    #[must_use]
    pub fn stdout(answers: Answers<'a>) -> Self {
        Self::new(answers, io::stdout())
    }
}

impl<R: LineInput, W: Write> Prompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask the pre-session questions.
    ///
    /// With a previous objective the user may redo it; otherwise they are
    /// asked whether to add a new task at all. `None` means stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    pub fn ask_plan(&mut self, previous: Option<&str>) -> Result<Option<Plan>, DwtimerError> {
        let redo = match previous {
            Some(prev) => self.confirm(&format!("Redo previous task \"{prev}\"?"))?,
            None => false,
        };

        let objective = match (redo, previous) {
            (true, Some(prev)) => prev.to_string(),
            _ => {
                if !self.confirm("Add new task?")? {
                    return Ok(None);
                }
                match self.text(&"Objective".green().to_string())? {
                    Some(objective) => objective,
                    None => return Ok(None),
                }
            }
        };

        let Some(minutes) = self.minutes(&"Duration (minutes)".blue().to_string())? else {
            return Ok(None);
        };

        Ok(Some(Plan {
            objective,
            duration_seconds: minutes * 60,
        }))
    }

    /// Yes/no question. Re-asks on anything else.
    fn confirm(&mut self, question: &str) -> Result<bool, DwtimerError> {
        loop {
            let Some(answer) = self.ask(&format!("{question} [y/n]"))? else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.hint("Please answer y or n.")?,
            }
        }
    }

    /// Non-empty free text.
    fn text(&mut self, question: &str) -> Result<Option<String>, DwtimerError> {
        loop {
            match self.ask(question)? {
                None => return Ok(None),
                Some(answer) if answer.is_empty() => self.hint("Please enter some text.")?,
                Some(answer) => return Ok(Some(answer)),
            }
        }
    }

    /// Whole number of minutes, at least one and small enough to count in
    /// seconds.
    fn minutes(&mut self, question: &str) -> Result<Option<u32>, DwtimerError> {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match answer.parse::<u32>() {
                Ok(minutes) if minutes > 0 && minutes.checked_mul(60).is_some() => {
                    return Ok(Some(minutes));
                }
                _ => self.hint("Please enter a whole number of minutes greater than zero.")?,
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>, DwtimerError> {
        write!(self.output, "{question}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn hint(&mut self, message: &str) -> Result<(), DwtimerError> {
        writeln!(self.output, "  {}", message.yellow())?;
        Ok(())
    }
}

//! The interactive work loop: ask what to work on, count it down, store it,
//! repeat.

use std::io;
use std::sync::Arc;

use colored::Colorize;

use crate::cli::prompt::{Answers, Plan, Prompter};
use crate::config::{Config, Paths};
use crate::error::DwtimerError;
use crate::focus::{
    detect_mode, format_mmss, ChannelSignalSource, Clock, DesktopNotifier, HotkeyListener,
    InputMode, LineFeed, Outcome, RunContext, Session, SessionReport, SignalSource,
    SqliteSessionStore, SystemClock, TerminalView, TimerLoop,
};
use crate::storage::Database;

/// Collaborators shared by every session of one run.
struct Workbench<'a> {
    config: &'a Config,
    clock: Arc<dyn Clock>,
    notifier: DesktopNotifier,
    store: SqliteSessionStore,
    lines: Option<&'a LineFeed>,
}

/// Execute the interactive loop until the user declines another task.
///
/// A session that could not be saved is reported immediately and the loop
/// carries on; the command still fails at the end so the exit status shows
/// that something was lost.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the terminal cannot be
/// used, or any session failed to save.
pub fn run(config: &Config, paths: &Paths) -> Result<String, DwtimerError> {
    paths.ensure_dirs()?;
    let store = SqliteSessionStore::with_database(Database::open_at(&paths.database)?);

    let mode = detect_mode();
    tracing::info!(?mode, "reading input");
    let feed = match mode {
        InputMode::Line => Some(LineFeed::stdin()?),
        InputMode::Raw => None,
    };
    let mut prompter = Prompter::stdout(match &feed {
        Some(feed) => Answers::Lines(feed),
        None => Answers::Terminal(io::stdin()),
    });

    let mut bench = Workbench {
        config,
        clock: Arc::new(SystemClock),
        notifier: DesktopNotifier::new(config.focus.notifications),
        store,
        lines: feed.as_ref(),
    };

    let mut previous: Option<String> = None;
    let mut saved = 0_usize;
    let mut unsaved = 0_usize;

    while let Some(plan) = prompter.ask_plan(previous.as_deref())? {
        match bench.work(&plan) {
            Ok(report) => {
                println!("{}", summary(&report));
                saved += 1;
            }
            Err(e @ DwtimerError::Database(_)) => {
                eprintln!(
                    "{} session was NOT saved: {e}",
                    "error".red().bold()
                );
                unsaved += 1;
            }
            Err(e) => return Err(e),
        }
        previous = Some(plan.objective);
    }

    if unsaved > 0 {
        return Err(DwtimerError::Database(format!(
            "{unsaved} session(s) could not be saved"
        )));
    }

    Ok(match saved {
        0 => "Nothing to do. Bye!".to_string(),
        1 => "1 session recorded. Bye!".to_string(),
        n => format!("{n} sessions recorded. Bye!"),
    })
}

impl Workbench<'_> {
    /// One attempt with whichever key input this run uses.
    fn work(&mut self, plan: &Plan) -> Result<SessionReport, DwtimerError> {
        let keys = self.config.focus.keys;
        let legend = keys.legend();

        if let Some(feed) = self.lines {
            let mut signals = feed.signals(keys);
            return self.count_down(plan, &mut signals, format!("{legend}, then Enter"));
        }

        let (tx, mut signals) = ChannelSignalSource::channel();

        // Without a listener the sender is gone, which the loop reports on
        // screen and then just counts down.
        let listener = match HotkeyListener::spawn(keys, tx) {
            Ok(listener) => Some(listener),
            Err(e) => {
                tracing::error!(error = %e, "no key listener");
                eprintln!("{} {e}", "warning:".yellow().bold());
                None
            }
        };

        let result = self.count_down(plan, &mut signals, legend);

        // Restores cooked mode before anything else is printed.
        drop(listener);
        result
    }

    fn count_down(
        &mut self,
        plan: &Plan,
        signals: &mut dyn SignalSource,
        legend: String,
    ) -> Result<SessionReport, DwtimerError> {
        let mut view = TerminalView::stdout(legend, self.config.focus.progress_bar_width);
        let session = Session::new(
            plan.objective.clone(),
            plan.duration_seconds,
            Arc::clone(&self.clock),
        )?;

        TimerLoop::new(
            session,
            RunContext {
                clock: Arc::clone(&self.clock),
                signals,
                view: &mut view,
                notifier: &self.notifier,
                store: &mut self.store,
            },
        )
        .run()
    }
}

/// One-line outcome shown after each session.
fn summary(report: &SessionReport) -> String {
    let session = &report.session;
    let headline = match report.outcome {
        Outcome::Expired => format!("{} Task finished: {}", "✓".green(), session.objective()),
        Outcome::Aborted => format!("{} Task aborted: {}", "✗".red(), session.objective()),
    };

    format!(
        "{headline} (worked {}, {} pause(s), {} distraction(s), saved as #{})",
        format_mmss(report.counted_seconds),
        session.pauses().len(),
        session.distraction_log().len(),
        report.task_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::clock::ManualClock;

    fn report(outcome: Outcome, counted_seconds: u32) -> SessionReport {
        let clock = Arc::new(ManualClock::at(1_000_000));
        let mut session = Session::new("Write report", 120, clock).unwrap();
        session.register_distraction().unwrap();
        session.end().unwrap();
        SessionReport {
            task_id: 7,
            outcome,
            counted_seconds,
            session,
        }
    }

    #[test]
    fn test_summary_finished() {
        colored::control::set_override(false);
        let line = summary(&report(Outcome::Expired, 120));

        assert!(line.contains("Task finished: Write report"));
        assert!(line.contains("worked 02:00"));
        assert!(line.contains("1 distraction(s)"));
        assert!(line.contains("#7"));
    }

    #[test]
    fn test_summary_aborted() {
        colored::control::set_override(false);
        let line = summary(&report(Outcome::Aborted, 5));

        assert!(line.contains("Task aborted: Write report"));
        assert!(line.contains("worked 00:05"));
    }
}

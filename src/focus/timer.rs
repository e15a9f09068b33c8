//! The timer loop.
//!
//! Turns one-second ticks and keyboard signals into session transitions,
//! keeps the display current, and decides when the attempt is over. The
//! loop is the only owner of the [`Session`]: listener threads reach it
//! solely through the signal channel, so there is no lock around session
//! state.
//!
//! Each iteration:
//! 1. drain pending signals in arrival order and apply them; if the
//!    listener is gone, close any open pause so the countdown can finish;
//! 2. stop if a quit arrived;
//! 3. while paused, wait a short poll interval and go round again;
//! 4. stop if the planned duration has been counted down;
//! 5. otherwise wait one tick and count it.
//!
//! On exit the session is ended once and written to the store once.

use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use super::display::{Frame, ProgressView};
use super::notify::Notifier;
use super::session::{InvalidTransition, Session};
use super::signal::{SignalKind, SignalSource};
use super::storage::SessionStore;
use crate::error::DwtimerError;

/// Length of one countdown step.
pub const TICK: Duration = Duration::from_secs(1);

/// How often signals are checked while paused.
pub const PAUSE_POLL: Duration = Duration::from_millis(100);

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The countdown reached zero.
    Expired,
    /// A quit signal arrived first.
    Aborted,
}

/// Collaborators for one run, built once by the caller.
pub struct RunContext<'a> {
    pub clock: Arc<dyn Clock>,
    pub signals: &'a mut dyn SignalSource,
    pub view: &'a mut dyn ProgressView,
    pub notifier: &'a dyn Notifier,
    pub store: &'a mut dyn SessionStore,
}

/// Result of a finished, stored session.
#[derive(Debug)]
pub struct SessionReport {
    pub task_id: i64,
    pub outcome: Outcome,
    /// Seconds of countdown that actually ran.
    pub counted_seconds: u32,
    pub session: Session,
}

/// Drives one session from start to storage.
pub struct TimerLoop<'a> {
    session: Session,
    ctx: RunContext<'a>,
    counted: u32,
    aborted: bool,
    source_lost: bool,
    last_drawn: Option<i64>,
}

impl<'a> TimerLoop<'a> {
    #[must_use]
    pub const fn new(session: Session, ctx: RunContext<'a>) -> Self {
        Self {
            session,
            ctx,
            counted: 0,
            aborted: false,
            source_lost: false,
            last_drawn: None,
        }
    }

    /// Run until the countdown expires or a quit arrives, then end the
    /// session and store it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be saved. The
    /// "finished" notification is only sent after a successful write.
    pub fn run(mut self) -> Result<SessionReport, DwtimerError> {
        tracing::info!(
            objective = self.session.objective(),
            planned = self.session.planned_duration_seconds(),
            "session started"
        );
        self.draw();

        let outcome = loop {
            let changed = self.drain_signals();

            if self.aborted {
                break Outcome::Aborted;
            }

            if self.session.is_paused() {
                if changed || self.last_drawn != Some(self.ctx.clock.now()) {
                    self.draw();
                }
                self.ctx.clock.sleep(PAUSE_POLL);
                continue;
            }

            if changed {
                self.draw();
            }

            if self.counted >= self.session.planned_duration_seconds() {
                break Outcome::Expired;
            }

            self.ctx.clock.sleep(TICK);
            self.counted += 1;
            self.draw();
        };

        self.finalize(outcome)
    }

    /// Apply every pending signal. Returns true if any changed the session.
    fn drain_signals(&mut self) -> bool {
        let mut changed = false;

        for signal in self.ctx.signals.poll_signals() {
            if self.aborted {
                tracing::debug!(%signal, "ignored after quit");
                continue;
            }
            changed |= self.apply(signal);
        }

        if !self.source_lost && self.ctx.signals.is_disconnected() {
            self.source_lost = true;
            tracing::error!("key listener stopped; the session can no longer be paused or quit");

            // Nothing could ever resume a held countdown now.
            let resumed = self.session.end_pause().is_ok();
            if resumed {
                tracing::info!("pause closed after listener loss");
                changed = true;
            }
            self.show_notice(if resumed {
                "Key listener stopped. Resuming; the timer will run until it expires."
            } else {
                "Key listener stopped. The timer will run until it expires."
            });
        }

        changed
    }

    fn apply(&mut self, signal: SignalKind) -> bool {
        let result: Result<(), InvalidTransition> = match signal {
            SignalKind::PauseToggle => {
                if self.session.is_paused() {
                    self.session.end_pause()
                } else {
                    self.session.start_pause()
                }
            }
            SignalKind::Distract => self.session.register_distraction(),
            SignalKind::Quit => {
                self.aborted = true;
                self.ctx
                    .notifier
                    .notify(&format!("Task aborted: {}", self.session.objective()));
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(%signal, state = %self.session.state(), "signal applied");
                true
            }
            Err(e) => {
                tracing::debug!(%signal, reason = %e, "signal dropped");
                false
            }
        }
    }

    fn finalize(mut self, outcome: Outcome) -> Result<SessionReport, DwtimerError> {
        self.session.end().map_err(|e| {
            DwtimerError::InvalidInput(format!("session could not be finalized: {e}"))
        })?;

        if let Err(e) = self.ctx.view.finish() {
            tracing::warn!(error = %e, "display cleanup failed");
        }

        let task_id = match self.ctx.store.write_session(&self.session) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "session was not saved");
                return Err(e);
            }
        };

        if outcome == Outcome::Expired {
            self.ctx
                .notifier
                .notify(&format!("Task finished: {}", self.session.objective()));
        }

        tracing::info!(task_id, ?outcome, counted = self.counted, "session finalized");
        Ok(SessionReport {
            task_id,
            outcome,
            counted_seconds: self.counted,
            session: self.session,
        })
    }

    fn draw(&mut self) {
        let frame = Frame {
            objective: self.session.objective(),
            elapsed_seconds: self.counted,
            planned_seconds: self.session.planned_duration_seconds(),
            session: self.session.snapshot(),
        };
        if let Err(e) = self.ctx.view.render(&frame) {
            tracing::warn!(error = %e, "display update failed");
        }
        self.last_drawn = Some(self.ctx.clock.now());
    }

    fn show_notice(&mut self, message: &str) {
        if let Err(e) = self.ctx.view.notice(message) {
            tracing::warn!(error = %e, "display notice failed");
        }
        self.draw();
    }
}

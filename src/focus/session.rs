//! Session state machine.
//!
//! A [`Session`] is one timed work attempt. It is plain state with no I/O:
//! the four transition methods are its entire mutation surface, and each one
//! either applies completely or fails with an [`InvalidTransition`] and
//! leaves the session untouched.
//!
//! ```text
//! Running --start_pause--> Paused --end_pause--> Running
//! Running | Paused --end--> Ended (absorbing)
//! Running --register_distraction--> Running
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::Clock;
use crate::error::DwtimerError;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Countdown is advancing
    Running,
    /// Countdown is held
    Paused,
    /// Session is finalized
    Ended,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

/// A transition the current state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("session has already ended")]
    AlreadyEnded,
    #[error("session is already paused")]
    AlreadyPaused,
    #[error("session is not paused")]
    NotPaused,
    #[error("distractions are not counted while paused")]
    Paused,
}

/// A closed pause interval, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pause {
    pub start: i64,
    pub end: i64,
}

impl Pause {
    /// Length of the pause in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.end - self.start
    }
}

/// Point-in-time view of a session for display code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub distractions: usize,
    pub pauses: usize,
    pub paused_seconds: i64,
}

/// One work attempt.
pub struct Session {
    objective: String,
    planned_duration_seconds: u32,
    start_time: i64,
    end_time: Option<i64>,
    distraction_log: Vec<i64>,
    pauses: Vec<Pause>,
    current_pause_start: Option<i64>,
    clock: Arc<dyn Clock>,
}

impl Session {
    /// Start a new session now.
    ///
    /// # Errors
    ///
    /// Returns `DwtimerError::InvalidInput` if the objective is blank or the
    /// planned duration is zero.
    pub fn new(
        objective: impl Into<String>,
        planned_duration_seconds: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DwtimerError> {
        let objective = objective.into().trim().to_string();
        if objective.is_empty() {
            return Err(DwtimerError::InvalidInput(
                "objective must not be empty".to_string(),
            ));
        }
        if planned_duration_seconds == 0 {
            return Err(DwtimerError::InvalidInput(
                "duration must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            objective,
            planned_duration_seconds,
            start_time: clock.now(),
            end_time: None,
            distraction_log: Vec::new(),
            pauses: Vec::new(),
            current_pause_start: None,
            clock,
        })
    }

    /// Stamp the end of the session.
    ///
    /// An open pause is closed at the same instant, so an ended session
    /// never carries a pending pause.
    ///
    /// # Errors
    ///
    /// `AlreadyEnded` on every call after the first.
    pub fn end(&mut self) -> Result<(), InvalidTransition> {
        if self.end_time.is_some() {
            return Err(InvalidTransition::AlreadyEnded);
        }

        if self.current_pause_start.is_some() {
            self.close_pause();
        }
        self.end_time = Some(self.stamp());
        Ok(())
    }

    /// Record a distraction at the current time.
    ///
    /// # Errors
    ///
    /// `Paused` while paused, `AlreadyEnded` once ended.
    pub fn register_distraction(&mut self) -> Result<(), InvalidTransition> {
        if self.end_time.is_some() {
            return Err(InvalidTransition::AlreadyEnded);
        }
        if self.current_pause_start.is_some() {
            return Err(InvalidTransition::Paused);
        }

        let now = self.stamp();
        self.distraction_log.push(now);
        Ok(())
    }

    /// Open a pause.
    ///
    /// # Errors
    ///
    /// `AlreadyEnded` once ended, `AlreadyPaused` while paused.
    pub fn start_pause(&mut self) -> Result<(), InvalidTransition> {
        if self.end_time.is_some() {
            return Err(InvalidTransition::AlreadyEnded);
        }
        if self.current_pause_start.is_some() {
            return Err(InvalidTransition::AlreadyPaused);
        }

        self.current_pause_start = Some(self.stamp());
        Ok(())
    }

    /// Close the open pause and record it.
    ///
    /// A pause opened and closed within the same second leaves no interval.
    ///
    /// # Errors
    ///
    /// `NotPaused` when no pause is open. An ended session has no open
    /// pause, so this also covers calls after `end()`.
    pub fn end_pause(&mut self) -> Result<(), InvalidTransition> {
        if self.current_pause_start.is_none() {
            return Err(InvalidTransition::NotPaused);
        }

        self.close_pause();
        Ok(())
    }

    fn close_pause(&mut self) {
        if let Some(start) = self.current_pause_start.take() {
            let end = self.stamp();
            // Resumed within the second it started: nothing to record at
            // whole-second resolution, and no stamp may run ahead of the clock.
            if end > start {
                self.pauses.push(Pause { start, end });
            }
        }
    }

    /// Current time, never earlier than anything already recorded.
    ///
    /// Every recorded stamp was taken from the clock, so this only differs
    /// from `now` if the wall clock steps backwards.
    fn stamp(&self) -> i64 {
        let floor = [
            self.pauses.last().map(|p| p.end),
            self.distraction_log.last().copied(),
            self.current_pause_start,
        ]
        .into_iter()
        .flatten()
        .fold(self.start_time, i64::max);
        self.clock.now().max(floor)
    }

    #[must_use]
    pub fn objective(&self) -> &str {
        &self.objective
    }

    #[must_use]
    pub const fn planned_duration_seconds(&self) -> u32 {
        self.planned_duration_seconds
    }

    #[must_use]
    pub const fn start_time(&self) -> i64 {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> Option<i64> {
        self.end_time
    }

    #[must_use]
    pub fn distraction_log(&self) -> &[i64] {
        &self.distraction_log
    }

    #[must_use]
    pub fn pauses(&self) -> &[Pause] {
        &self.pauses
    }

    #[must_use]
    pub const fn current_pause_start(&self) -> Option<i64> {
        self.current_pause_start
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.current_pause_start.is_some()
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.end_time.is_some() {
            SessionState::Ended
        } else if self.current_pause_start.is_some() {
            SessionState::Paused
        } else {
            SessionState::Running
        }
    }

    /// Seconds spent paused so far, including an open pause.
    #[must_use]
    pub fn total_paused_seconds(&self) -> i64 {
        let closed: i64 = self.pauses.iter().map(Pause::seconds).sum();
        let open = self
            .current_pause_start
            .map_or(0, |start| (self.clock.now() - start).max(0));
        closed + open
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            distractions: self.distraction_log.len(),
            pauses: self.pauses.len(),
            paused_seconds: self.total_paused_seconds(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("objective", &self.objective)
            .field("planned_duration_seconds", &self.planned_duration_seconds)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("distraction_log", &self.distraction_log)
            .field("pauses", &self.pauses)
            .field("current_pause_start", &self.current_pause_start)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::focus::clock::ManualClock;

    const T0: u64 = 1_700_000_000;

    fn session_with_clock() -> (Session, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(T0));
        let session = Session::new("Testing", 300, clock.clone()).unwrap();
        (session, clock)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_new_session() {
        let (session, _) = session_with_clock();
        assert_eq!(session.objective(), "Testing");
        assert_eq!(session.planned_duration_seconds(), 300);
        assert_eq!(session.start_time(), T0 as i64);
        assert_eq!(session.end_time(), None);
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_new_rejects_blank_objective() {
        let clock = Arc::new(ManualClock::at(T0));
        assert!(Session::new("   ", 60, clock.clone()).is_err());
        assert!(Session::new("Write report", 0, clock).is_err());
    }

    #[test]
    fn test_end_succeeds_once() {
        let (mut session, clock) = session_with_clock();
        clock.advance(secs(42));

        assert_eq!(session.end(), Ok(()));
        assert_eq!(session.end_time(), Some(T0 as i64 + 42));

        clock.advance(secs(10));
        assert_eq!(session.end(), Err(InvalidTransition::AlreadyEnded));
        assert_eq!(session.end_time(), Some(T0 as i64 + 42));
    }

    #[test]
    fn test_ended_session_rejects_everything() {
        let (mut session, clock) = session_with_clock();
        session.register_distraction().unwrap();
        session.end().unwrap();
        clock.advance(secs(5));

        assert_eq!(session.register_distraction(), Err(InvalidTransition::AlreadyEnded));
        assert_eq!(session.start_pause(), Err(InvalidTransition::AlreadyEnded));
        assert_eq!(session.end_pause(), Err(InvalidTransition::NotPaused));
        assert_eq!(session.end(), Err(InvalidTransition::AlreadyEnded));

        assert_eq!(session.distraction_log().len(), 1);
        assert!(session.pauses().is_empty());
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[test]
    fn test_end_while_paused_closes_pause() {
        let (mut session, clock) = session_with_clock();
        clock.advance(secs(10));
        session.start_pause().unwrap();
        clock.advance(secs(4));
        session.end().unwrap();

        assert_eq!(session.current_pause_start(), None);
        assert_eq!(
            session.pauses(),
            &[Pause { start: T0 as i64 + 10, end: T0 as i64 + 14 }]
        );
        assert_eq!(session.end_time(), Some(T0 as i64 + 14));
    }

    #[test]
    fn test_distraction_rejected_while_paused() {
        let (mut session, clock) = session_with_clock();
        session.register_distraction().unwrap();
        session.start_pause().unwrap();

        for _ in 0..3 {
            clock.advance(secs(1));
            assert_eq!(session.register_distraction(), Err(InvalidTransition::Paused));
        }
        assert_eq!(session.distraction_log().len(), 1);

        session.end_pause().unwrap();
        session.register_distraction().unwrap();
        assert_eq!(session.distraction_log().len(), 2);
    }

    #[test]
    fn test_start_pause_twice_fails() {
        let (mut session, clock) = session_with_clock();
        session.start_pause().unwrap();
        let opened = session.current_pause_start();

        clock.advance(secs(3));
        assert_eq!(session.start_pause(), Err(InvalidTransition::AlreadyPaused));
        assert_eq!(session.current_pause_start(), opened);
    }

    #[test]
    fn test_end_pause_twice_records_one_interval() {
        let (mut session, clock) = session_with_clock();
        session.start_pause().unwrap();
        clock.advance(secs(3));

        assert_eq!(session.end_pause(), Ok(()));
        assert_eq!(session.end_pause(), Err(InvalidTransition::NotPaused));
        assert_eq!(session.pauses().len(), 1);
        assert_eq!(session.pauses()[0].seconds(), 3);
    }

    #[test]
    fn test_pauses_are_ordered_and_disjoint() {
        let (mut session, clock) = session_with_clock();

        // Includes same-second pause/resume pairs.
        for (work, pause) in [(2, 3), (0, 0), (5, 1), (0, 0), (1, 7)] {
            clock.advance(secs(work));
            session.start_pause().unwrap();
            clock.advance(secs(pause));
            session.end_pause().unwrap();
        }

        // The two same-second pairs leave no interval.
        let pauses = session.pauses();
        assert_eq!(pauses.len(), 3);
        for pause in pauses {
            assert!(pause.start < pause.end, "{pause:?}");
        }
        for pair in pauses.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{pair:?}");
        }
    }

    #[test]
    fn test_same_second_toggles_stay_on_clock() {
        let (mut session, clock) = session_with_clock();
        clock.advance(secs(7));

        for _ in 0..5 {
            session.start_pause().unwrap();
            session.end_pause().unwrap();
        }
        session.register_distraction().unwrap();
        session.end().unwrap();

        assert!(session.pauses().is_empty());
        assert_eq!(session.distraction_log(), &[clock.now()]);
        assert_eq!(session.end_time(), Some(clock.now()));
    }

    #[test]
    fn test_end_in_same_second_as_pause() {
        let (mut session, clock) = session_with_clock();
        clock.advance(secs(3));
        session.start_pause().unwrap();
        session.end().unwrap();

        assert!(session.pauses().is_empty());
        assert_eq!(session.current_pause_start(), None);
        assert_eq!(session.end_time(), Some(clock.now()));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        StartPause,
        EndPause,
        Distract,
        End,
    }

    const OPS: [Op; 4] = [Op::StartPause, Op::EndPause, Op::Distract, Op::End];

    type Fingerprint = (Option<i64>, Vec<i64>, Vec<Pause>, Option<i64>);

    fn fingerprint(session: &Session) -> Fingerprint {
        (
            session.end_time(),
            session.distraction_log().to_vec(),
            session.pauses().to_vec(),
            session.current_pause_start(),
        )
    }

    fn check_invariants(session: &Session, now: i64) {
        let start = session.start_time();

        if session.is_ended() {
            assert_eq!(session.current_pause_start(), None);
            assert_eq!(session.state(), SessionState::Ended);
        }
        if let Some(end) = session.end_time() {
            assert!(start <= end && end <= now, "end {end} outside [{start}, {now}]");
        }

        let pauses = session.pauses();
        for pause in pauses {
            assert!(pause.start < pause.end, "{pause:?}");
            assert!(start <= pause.start && pause.end <= now, "{pause:?}");
        }
        for pair in pauses.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{pair:?}");
        }

        let log = session.distraction_log();
        for pair in log.windows(2) {
            assert!(pair[0] <= pair[1], "{log:?}");
        }
        for &ts in log {
            assert!(start <= ts && ts <= now, "distraction {ts}");
            assert!(
                !pauses.iter().any(|p| p.start < ts && ts < p.end),
                "distraction {ts} inside {pauses:?}"
            );
        }
    }

    #[test]
    fn test_every_short_sequence_keeps_invariants() {
        const STEPS: u32 = 5;
        // Each step: one of four operations, with or without a one-second wait.
        let choices = OPS.len() * 2;

        for mut code in 0..choices.pow(STEPS) {
            let (mut session, clock) = session_with_clock();
            let mut trace = Vec::new();

            for _ in 0..STEPS {
                let op = OPS[code % OPS.len()];
                let wait = (code / OPS.len()) % 2;
                code /= choices;
                trace.push((wait, op));

                clock.advance(secs(wait as u64));
                let before = fingerprint(&session);
                let was_ended = session.is_ended();
                let was_paused = session.is_paused();

                let result = match op {
                    Op::StartPause => session.start_pause(),
                    Op::EndPause => session.end_pause(),
                    Op::Distract => session.register_distraction(),
                    Op::End => session.end(),
                };

                let allowed = match op {
                    Op::StartPause | Op::Distract => !was_ended && !was_paused,
                    Op::EndPause => was_paused,
                    Op::End => !was_ended,
                };
                assert_eq!(result.is_ok(), allowed, "{trace:?}");

                if result.is_err() {
                    assert_eq!(fingerprint(&session), before, "{trace:?}");
                }
                if matches!(op, Op::End) && allowed {
                    assert_eq!(session.end_time(), Some(clock.now()), "{trace:?}");
                }
                check_invariants(&session, clock.now());
            }
        }
    }

    #[test]
    fn test_back_to_back_distractions() {
        let (mut session, _) = session_with_clock();
        session.register_distraction().unwrap();
        session.register_distraction().unwrap();

        let log = session.distraction_log();
        assert_eq!(log.len(), 2);
        assert!(log[0] <= log[1]);
    }

    #[test]
    fn test_snapshot_counts_open_pause() {
        let (mut session, clock) = session_with_clock();
        session.start_pause().unwrap();
        clock.advance(secs(4));
        session.end_pause().unwrap();
        session.start_pause().unwrap();
        clock.advance(secs(2));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Paused);
        assert_eq!(snapshot.pauses, 1);
        assert_eq!(snapshot.paused_seconds, 6);
    }
}

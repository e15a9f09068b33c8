//! Keyboard input that feeds the timer loop.
//!
//! Two ways of reading keys, picked once per run by [`detect_mode`]:
//!
//! - **Raw**: a [`HotkeyListener`] thread per session puts the terminal in
//!   raw mode and sends one [`SignalKind`] per key press over a channel.
//! - **Line**: stdin is not a terminal (or raw mode is refused). A single
//!   [`LineFeed`] reader thread owns stdin for the whole run; prompts and
//!   the running session both take lines from it, so each line reaches
//!   exactly one consumer.

use std::io::{self, BufRead, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use super::signal::{SignalKind, SignalSender, SignalSource};
use crate::config::KeyBindings;
use crate::error::DwtimerError;

/// How often the raw-mode reader checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `Drop` waits for the reader thread.
const JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// How keys are read for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Single key presses, terminal in raw mode
    Raw,
    /// One command per line of stdin
    Line,
}

/// Pick raw mode when stdin is a terminal that accepts it, line mode
/// otherwise.
#[must_use]
pub fn detect_mode() -> InputMode {
    if !io::stdin().is_terminal() {
        return InputMode::Line;
    }

    match terminal::enable_raw_mode() {
        Ok(()) => {
            terminal::disable_raw_mode().ok();
            InputMode::Raw
        }
        Err(e) => {
            tracing::warn!(error = %e, "raw mode unavailable, reading commands by line");
            InputMode::Line
        }
    }
}

/// Handle to a running raw-mode listener thread. Dropping it stops the
/// listener and restores the terminal.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    /// Enter raw mode and start sending one signal per recognised key press.
    ///
    /// If the event stream fails later the thread exits and drops `tx`,
    /// which the timer loop sees as a lost listener.
    ///
    /// # Errors
    ///
    /// Returns `DwtimerError::Hotkey` if raw mode cannot be enabled or the
    /// listener thread cannot be spawned.
    pub fn spawn(bindings: KeyBindings, tx: SignalSender) -> Result<Self, DwtimerError> {
        terminal::enable_raw_mode()
            .map_err(|e| DwtimerError::Hotkey(format!("Failed to enter raw mode: {e}")))?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("dwtimer-hotkeys".to_string())
            .spawn(move || {
                if let Err(e) = listen_raw(&bindings, &tx, &thread_stop) {
                    tracing::error!(error = %e, "key event stream failed");
                }
            })
            .map_err(|e| {
                terminal::disable_raw_mode().ok();
                DwtimerError::Hotkey(format!("Failed to start key listener: {e}"))
            })?;

        tracing::debug!("hotkey listener started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                handle.join().ok();
            } else {
                tracing::warn!("key listener did not stop in time, detaching it");
            }
        }

        terminal::disable_raw_mode().ok();
    }
}

fn listen_raw(bindings: &KeyBindings, tx: &SignalSender, stop: &AtomicBool) -> io::Result<()> {
    while !stop.load(Ordering::SeqCst) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let event = event::read()?;
        if let Some(signal) = signal_for_event(&event, bindings) {
            tracing::debug!(%signal, "key signal");
            if tx.send(signal).is_err() {
                break;
            }
        }
    }
    Ok(())
}

/// Lines of stdin, read by one background thread for the whole run.
///
/// The channel closes at end of input or on a read error.
pub struct LineFeed {
    rx: Receiver<String>,
}

impl LineFeed {
    /// Start the stdin reader thread.
    ///
    /// # Errors
    ///
    /// Returns `DwtimerError::Hotkey` if the thread cannot be spawned.
    pub fn stdin() -> Result<Self, DwtimerError> {
        let (tx, rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("dwtimer-stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to read stdin");
                            break;
                        }
                    }
                }
                tracing::debug!("stdin reader finished");
            })
            .map_err(|e| DwtimerError::Hotkey(format!("Failed to start stdin reader: {e}")))?;

        Ok(Self { rx })
    }

    #[cfg(test)]
    pub(crate) const fn from_receiver(rx: Receiver<String>) -> Self {
        Self { rx }
    }

    /// Block for the next line. `None` once input has ended.
    #[must_use]
    pub fn next_line(&self) -> Option<String> {
        self.rx.recv().ok()
    }

    /// Signal source over this feed for one session.
    #[must_use]
    pub const fn signals(&self, bindings: KeyBindings) -> LineSignals<'_> {
        LineSignals {
            feed: self,
            bindings,
            disconnected: false,
        }
    }
}

/// Session signals taken from a [`LineFeed`]. Lines that are not a command
/// are dropped.
pub struct LineSignals<'a> {
    feed: &'a LineFeed,
    bindings: KeyBindings,
    disconnected: bool,
}

impl SignalSource for LineSignals<'_> {
    fn poll_signals(&mut self) -> Vec<SignalKind> {
        let mut signals = Vec::new();
        loop {
            match self.feed.rx.try_recv() {
                Ok(line) => match signal_for_line(&line, &self.bindings) {
                    Some(signal) => {
                        tracing::debug!(%signal, "line signal");
                        signals.push(signal);
                    }
                    None => tracing::debug!(line = %line.trim(), "not a timer command"),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        signals
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

/// Map a terminal event to a signal. Only key presses count; releases and
/// repeats are ignored so one physical press yields one signal.
fn signal_for_event(event: &Event, bindings: &KeyBindings) -> Option<SignalKind> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(SignalKind::Quit),
        KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => None,
        KeyCode::Char(c) => bindings.signal_for(*c),
        KeyCode::Esc => Some(SignalKind::Quit),
        _ => None,
    }
}

/// Map a line of input to a signal by its first non-blank character.
fn signal_for_line(line: &str, bindings: &KeyBindings) -> Option<SignalKind> {
    line.trim().chars().next().and_then(|c| bindings.signal_for(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, modifiers, kind))
    }

    fn press(c: char) -> Event {
        key(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(signal_for_event(&press('p'), &bindings), Some(SignalKind::PauseToggle));
        assert_eq!(signal_for_event(&press('d'), &bindings), Some(SignalKind::Distract));
        assert_eq!(signal_for_event(&press('Q'), &bindings), Some(SignalKind::Quit));
        assert_eq!(signal_for_event(&press('x'), &bindings), None);
    }

    #[test]
    fn test_ctrl_c_and_esc_quit() {
        let bindings = KeyBindings::default();
        let ctrl_c = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        let esc = key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
        let ctrl_d = key(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyEventKind::Press);

        assert_eq!(signal_for_event(&ctrl_c, &bindings), Some(SignalKind::Quit));
        assert_eq!(signal_for_event(&esc, &bindings), Some(SignalKind::Quit));
        assert_eq!(signal_for_event(&ctrl_d, &bindings), None);
    }

    #[test]
    fn test_release_and_repeat_ignored() {
        let bindings = KeyBindings::default();
        let release = key(KeyCode::Char('p'), KeyModifiers::NONE, KeyEventKind::Release);
        let repeat = key(KeyCode::Char('p'), KeyModifiers::NONE, KeyEventKind::Repeat);

        assert_eq!(signal_for_event(&release, &bindings), None);
        assert_eq!(signal_for_event(&repeat, &bindings), None);
        assert_eq!(signal_for_event(&Event::FocusLost, &bindings), None);
    }

    #[test]
    fn test_custom_bindings() {
        let bindings = KeyBindings {
            pause: ' ',
            distract: 'x',
            quit: 'z',
        };
        assert_eq!(signal_for_event(&press(' '), &bindings), Some(SignalKind::PauseToggle));
        assert_eq!(signal_for_event(&press('p'), &bindings), None);
    }

    #[test]
    fn test_line_mode_mapping() {
        let bindings = KeyBindings::default();
        assert_eq!(signal_for_line("q\n", &bindings), Some(SignalKind::Quit));
        assert_eq!(signal_for_line("  pause\n", &bindings), Some(SignalKind::PauseToggle));
        assert_eq!(signal_for_line("distracted\n", &bindings), Some(SignalKind::Distract));
        assert_eq!(signal_for_line("\n", &bindings), None);
        assert_eq!(signal_for_line("hello\n", &bindings), None);
    }

    #[test]
    fn test_line_signals_drain_queued_lines() {
        let (tx, rx) = mpsc::channel();
        let feed = LineFeed::from_receiver(rx);
        let mut signals = feed.signals(KeyBindings::default());

        assert!(signals.poll_signals().is_empty());

        for line in ["p", "hello", "d", "q"] {
            tx.send(line.to_string()).unwrap();
        }
        assert_eq!(
            signals.poll_signals(),
            vec![SignalKind::PauseToggle, SignalKind::Distract, SignalKind::Quit]
        );
        assert!(!signals.is_disconnected());

        drop(tx);
        assert!(signals.poll_signals().is_empty());
        assert!(signals.is_disconnected());
    }

    #[test]
    fn test_lines_after_session_stay_in_feed() {
        let (tx, rx) = mpsc::channel();
        let feed = LineFeed::from_receiver(rx);

        tx.send("q".to_string()).unwrap();
        {
            let mut signals = feed.signals(KeyBindings::default());
            assert_eq!(signals.poll_signals(), vec![SignalKind::Quit]);
        }

        tx.send("y".to_string()).unwrap();
        drop(tx);
        assert_eq!(feed.next_line().as_deref(), Some("y"));
        assert_eq!(feed.next_line(), None);
    }
}

//! Focus sessions: the countdown, its signals, and where results go.
//!
//! - [`session`]: the per-attempt state machine
//! - [`timer`]: the tick loop that owns a session and finalizes it
//! - [`signal`] / [`hotkeys`]: keyboard signals delivered from a listener thread
//! - [`notify`]: fire-and-forget desktop alerts
//! - [`display`]: countdown rendering
//! - [`storage`]: persistence of finished sessions

pub mod clock;
pub mod display;
pub mod hotkeys;
pub mod notify;
pub mod session;
pub mod signal;
pub mod storage;
pub mod timer;

pub use clock::{Clock, SystemClock};
pub use display::{format_mmss, render_progress_bar, Frame, ProgressView, TerminalView};
pub use hotkeys::{detect_mode, HotkeyListener, InputMode, LineFeed, LineSignals};
pub use notify::{DesktopNotifier, Notifier};
pub use session::{InvalidTransition, Pause, Session, SessionSnapshot, SessionState};
pub use signal::{ChannelSignalSource, SignalKind, SignalSender, SignalSource};
pub use storage::{SessionStore, SqliteSessionStore, StoredSession};
pub use timer::{Outcome, RunContext, SessionReport, TimerLoop, PAUSE_POLL, TICK};

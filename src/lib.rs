//! dwtimer - a deep-work countdown timer
//!
//! Declare an objective and a duration, work until the countdown elapses,
//! pause/resume and flag distractions from the keyboard, and get a stored
//! record of the session for later review.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod focus;
pub mod logging;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::DwtimerError;

//! Storage layer for dwtimer.
//!
//! `SQLite` persistence for finished sessions, their distractions and pauses.

mod database;
mod migrations;

pub use database::Database;

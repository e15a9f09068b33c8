use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "dwtimer")]
#[command(about = "A deep-work countdown timer that records pauses and distractions")]
#[command(long_about = "dwtimer - a deep-work countdown timer

Run without arguments to start working: you are asked for an objective and
a duration in minutes, then a countdown starts. While it runs:

  p    pause / resume
  d    log a distraction
  q    quit early (the session is still saved)

Keys can be changed in ~/.dwtimer/config.yaml. When the terminal cannot be
put in raw mode, type the key and press Enter instead.

Finished sessions are stored in ~/.dwtimer/dwtimer.db. Review them with:
  dwtimer history")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Create the session schema in the data directory database and exit
    #[arg(short = 'i', long)]
    pub init: bool,

    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recorded sessions
    ///
    /// Lists finished sessions newest first with planned time, time actually
    /// worked (excluding pauses), pause and distraction counts.
    #[command(alias = "h")]
    History {
        /// Maximum number of sessions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

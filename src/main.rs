use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use dwtimer::cli::args::{Cli, Commands};
use dwtimer::cli::commands;
use dwtimer::config::{Config, Paths};
use dwtimer::logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let config = Config::load_from_path(&paths.config_file)
        .with_context(|| format!("loading {}", paths.config_file.display()))?;

    if let Err(e) = logging::init(&paths, &config.general.log_filter) {
        eprintln!("{} {e}", "warning:".yellow().bold());
    }

    let format = cli.output.unwrap_or(config.general.default_output);

    let output = if cli.init {
        commands::init(&paths, format)?
    } else {
        match cli.command {
            Some(Commands::History { limit }) => commands::history(&paths, limit, format)?,
            None => commands::run(&config, &paths)?,
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

//! kiln - declarative asset pipeline.
//!
//! Compiles SCSS, bundles scripts and minifies assets as declared in one
//! manifest.

mod actor;
mod asset;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Task};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let args: Vec<String> = std::env::args().collect();
    if let Some(flag) = cli::deps::find_deps_flag(&args) {
        cli::deps::delegate(flag);
        return Ok(());
    }

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;
    debug!("config"; "{} ({} mode)", config.config_path.display(), config.mode.label());

    match cli.task {
        Task::Watch => cli::watch::watch(config),
        task => {
            let report = cli::build::run_task(&config, task);
            if !report.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

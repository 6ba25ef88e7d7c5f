//! konsole-tabs - Set up Konsole with named, pre-loaded tabs
//!
//! Opens a new scriptable Konsole window and, for every tab listed in
//! `~/.konsoleTabs`:
//!
//! - **Names** the tab
//! - **Seeds** its shell history with tab-specific entries
//! - **Runs** the shared commands, then the tab's own commands
//!
//! The placeholder tab Konsole opens with is closed at the end.
//!
//! # Quick Start
//!
//! ```text
//! konsole-tabs              # Set up tabs from ~/.konsoleTabs
//! konsole-tabs --help       # Usage and an example config
//! ```
//!
//! Only DCOP-era Konsole (`kstart konsole --script`) is supported.

mod config;
mod history;
mod host;
mod konsole;
mod process;
mod setup;

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{home_dir, Config, EXAMPLE_CONFIG};
use crate::host::SystemHost;
use crate::konsole::Timing;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("konsole-tabs {}", VERSION);
}

fn print_help() {
    eprintln!("konsole-tabs {} - Set up Konsole with named, pre-loaded tabs", VERSION);
    eprintln!();
    eprintln!("Usage: konsole-tabs [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.konsoleTabs");
    eprintln!();
    eprintln!("Each [[tabs]] entry is (name, commands to run in the tab,");
    eprintln!("commands to have in the tab's history). common_commands run");
    eprintln!("in every tab before the tab's own commands.");
    eprintln!();
    eprintln!("Example:");
    eprintln!();
    for line in EXAMPLE_CONFIG.lines() {
        eprintln!("  {}", line);
    }
    eprintln!();
    eprintln!("While tabs are being created ~/.history is parked at");
    eprintln!("~/.history.tempbackup; if a run is interrupted, move it back by hand.");
}

/// Returns Ok(true) when the run should go ahead
fn parse_args() -> Result<bool, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(false);
            }
            "-v" | "--version" => {
                print_version();
                return Ok(false);
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
    }

    Ok(true)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn main() {
    let proceed = match parse_args() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if !proceed {
        return;
    }

    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let home = home_dir()?;
    let config = Config::load(&home)?;
    info!(
        "Loaded {} tabs and {} common commands",
        config.tabs.len(),
        config.common_commands.len()
    );

    setup::run(&mut SystemHost, &config, &home, &Timing::default())?;
    Ok(())
}

//! Starts tilewm.
//!
//! Without arguments the window manager runs on the X display named by `$DISPLAY`.
//! `tilewm check` validates the configuration file instead.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tilewm::config;
use tilewm_core::{Config as _, Diagnostic, Manager};
use xlib_display_server::{XlibDisplayServer, XlibWindowHandle};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Starts tilewm if no subcommand is given. 'tilewm check' validates the \
                  configuration file without touching the display."
)]
struct TilewmCli {
    #[command(subcommand)]
    subcommand: Option<TilewmSubcommand>,
}

#[derive(Debug, Subcommand)]
enum TilewmSubcommand {
    /// Check the configuration file and report every problem found
    Check {
        /// Also print the key bindings and settings as they were understood
        #[arg(short, long)]
        verbose: bool,
        /// The file to check, the default location otherwise
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match TilewmCli::parse().subcommand {
        Some(TilewmSubcommand::Check { verbose, input }) => check(input, verbose),
        None => run(),
    }
}

fn run() -> ExitCode {
    let _log_guard = tilewm::utils::log::setup_logging();
    tracing::info!("tilewm booting...");

    match start() {
        Ok(()) => {
            tracing::info!("Completed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Completed with error: {err:#}");
            eprintln!("tilewm: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn start() -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("couldn't start the Tokio runtime")?;
    let _rt_guard = rt.enter();

    let config = tilewm::load();
    let manager = Manager::<XlibWindowHandle, tilewm::Config, XlibDisplayServer>::new(config)
        .context("couldn't take over the display")?;
    manager.register_child_hook();
    rt.block_on(manager.event_loop())?;
    Ok(())
}

fn check(input: Option<PathBuf>, verbose: bool) -> ExitCode {
    let path = match input.map_or_else(config::default_path, Ok) {
        Ok(path) => path,
        Err(err) => {
            println!("fatal: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if !path.exists() {
        println!("{}: no configuration file, the defaults apply", path.display());
        return ExitCode::SUCCESS;
    }

    let (config, diagnostics) = config::check_file(&path);
    for diagnostic in &diagnostics {
        println!("{}: {diagnostic}", path.display());
    }
    if diagnostics.iter().any(Diagnostic::is_fatal) {
        return ExitCode::FAILURE;
    }
    if diagnostics.is_empty() {
        println!("{}: OK", path.display());
    }
    if let Some(config) = config.filter(|_| verbose) {
        print_understood(&config);
    }
    ExitCode::SUCCESS
}

fn print_understood(config: &tilewm::Config) {
    let settings = config.layout_settings();
    println!("workspaces: {}", config.workspaces().join(", "));
    println!(
        "master: {} at {:.2}, step {:.2}",
        settings.master_count, settings.split_factor, settings.factor_step
    );
    println!(
        "border {}, gap {}, outer gap {}, bar {}",
        settings.border_width, settings.gap, settings.outer_gap, settings.bar_height
    );
    println!("mousekey: {:?}", config.mousekey());
    for keybind in config.mapped_bindings() {
        println!("{:?} + {} -> {:?}", keybind.modifier, keybind.key, keybind.command);
    }
}

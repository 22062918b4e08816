//! # Card Derby CLI Library
//!
//! Command-line front end for the Card Derby race engine.
//!
//! ## Main Entry Point
//!
//! [`run`] parses command-line arguments and executes the subcommand;
//! [`run_with_input`] does the same with an explicit input stream for the
//! interactive `play` command.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["derby", "sim", "--seed", "42", "--mode", "single"];
//! let code = derby_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Run a series interactively, one draw per command
//! - `sim`: Run a whole series at once and print the result
//! - `auto`: Watch a series draw itself on the auto-draw timer
//! - `cfg`: Display the resolved configuration and its sources
//!
//! ## Configuration
//!
//! Settings resolve in this order, later winning: built-in defaults, the TOML
//! file named by `DERBY_CONFIG`, `DERBY_*` environment variables, then
//! command-line flags. Numeric settings are clamped into range.

use clap::Parser;
use std::io::{BufRead, Write};

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod ui;
pub mod validation;

use cli::{Commands, DerbyCli, RaceArgs};
use commands::{handle_auto_command, handle_cfg_command, handle_play_command, handle_sim_command};
use config::Config;

pub use error::CliError;

const COMMANDS: &[&str] = &["play", "sim", "auto", "cfg"];

/// Main entry point for the CLI application. `play` reads from stdin.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors
///
/// # Example
///
/// ```
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let code = derby_cli::run(["derby", "sim", "--seed", "1", "--quiet"], &mut out, &mut err);
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().contains("Seed: 1"));
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, &mut stdin_lock, out, err)
}

/// [`run`] with the input stream for `play` supplied by the caller.
pub fn run_with_input<I, S>(
    args: I,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DerbyCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    let _ = write_usage(err, &e);
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Play { race } => {
            resolve(&race, |_| {}).and_then(|cfg| handle_play_command(&cfg, out, err, input))
        }
        Commands::Sim { race, quiet } => {
            resolve(&race, |_| {}).and_then(|cfg| handle_sim_command(&cfg, quiet, out))
        }
        Commands::Auto {
            race,
            interval,
            provider,
            json,
        } => resolve(&race, |cfg| {
            if let Some(v) = interval {
                cfg.interval = v;
            }
            if let Some(v) = provider {
                cfg.provider = v;
            }
        })
        .and_then(|cfg| handle_auto_command(&cfg, json, out)),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

/// Loads the layered configuration, lays the command-line values over it and
/// clamps the result.
fn resolve(args: &RaceArgs, extra: impl FnOnce(&mut Config)) -> Result<Config, CliError> {
    let mut cfg = config::load_with_sources()?.config;
    cfg.apply_args(args);
    extra(&mut cfg);
    config::validate(&cfg)?;
    Ok(cfg.clamped())
}

fn write_usage(err: &mut dyn Write, e: &clap::Error) -> std::io::Result<()> {
    // Print clap error first
    writeln!(err, "{}", e)?;
    writeln!(err)?;
    writeln!(err, "Card Derby CLI")?;
    writeln!(err, "Usage: derby <command> [options]\n")?;
    writeln!(err, "Commands:")?;
    for c in COMMANDS {
        writeln!(err, "  {}", c)?;
    }
    writeln!(err, "\nFor full help, run: derby --help")
}

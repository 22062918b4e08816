//! Command handler modules for the derby CLI.
//!
//! Each subcommand lives in its own file and exposes one
//! `handle_COMMAND_command` function. Output streams are passed in as
//! `&mut dyn Write` so tests can capture them, and failures come back as
//! [`CliError`](crate::error::CliError).

pub mod auto;
pub mod cfg;
pub mod play;
pub mod sim;

pub use auto::handle_auto_command;
pub use cfg::handle_cfg_command;
pub use play::handle_play_command;
pub use sim::handle_sim_command;

//! Configuration command handler.
//!
//! Displays the resolved configuration with the source of each value
//! (default, environment, or configuration file).
//!
//! # Example Output
//!
//! ```json
//! {
//!   "horses": {
//!     "value": 6,
//!     "source": "default"
//!   },
//!   "seed": {
//!     "value": 42,
//!     "source": "env"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::load_with_sources()?;
    let display = serde_json::json!({
        "seed": { "value": config.seed, "source": sources.seed },
        "horses": { "value": config.horses, "source": sources.horses },
        "track": { "value": config.track, "source": sources.track },
        "cards": { "value": config.cards, "source": sources.cards },
        "draw": { "value": config.draw, "source": sources.draw },
        "mode": { "value": config.mode, "source": sources.mode },
        "rounds": { "value": config.rounds, "source": sources.rounds },
        "interval": { "value": config.interval, "source": sources.interval },
        "provider": { "value": config.provider, "source": sources.provider },
        "commentary_timeout": {
            "value": config.commentary_timeout,
            "source": sources.commentary_timeout,
        },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

use derby_engine::config::{RaceConfig, RaceMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::cli::RaceArgs;

pub const HORSES_RANGE: (usize, usize) = (2, 10);
pub const TRACK_RANGE: (u32, u32) = (5, 30);
pub const DRAW_RANGE: (usize, usize) = (1, 5);
pub const ROUNDS_RANGE: (u32, u32) = (1, 10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub horses: usize,
    pub track: u32,
    pub cards: u32,
    pub draw: usize,
    pub mode: RaceMode,
    pub rounds: u32,
    /// Seconds between automatic draws
    pub interval: f64,
    pub provider: String,
    /// Seconds an outside commentary request may take
    pub commentary_timeout: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub horses: ValueSource,
    pub track: ValueSource,
    pub cards: ValueSource,
    pub draw: ValueSource,
    pub mode: ValueSource,
    pub rounds: ValueSource,
    pub interval: ValueSource,
    pub provider: ValueSource,
    pub commentary_timeout: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            horses: ValueSource::Default,
            track: ValueSource::Default,
            cards: ValueSource::Default,
            draw: ValueSource::Default,
            mode: ValueSource::Default,
            rounds: ValueSource::Default,
            interval: ValueSource::Default,
            provider: ValueSource::Default,
            commentary_timeout: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        let race = RaceConfig::default();
        Self {
            seed: None,
            horses: race.horse_count,
            track: race.track_length,
            cards: race.cards_per_horse,
            draw: race.draw_count,
            mode: race.mode,
            rounds: race.total_rounds,
            interval: 2.0,
            provider: "none".into(),
            commentary_timeout: 5.0,
        }
    }
}

impl Config {
    /// Command-line flags win over everything else.
    pub fn apply_args(&mut self, args: &RaceArgs) {
        if let Some(v) = args.seed {
            self.seed = Some(v);
        }
        if let Some(v) = args.horses {
            self.horses = v;
        }
        if let Some(v) = args.track {
            self.track = v;
        }
        if let Some(v) = args.cards {
            self.cards = v;
        }
        if let Some(v) = args.draw {
            self.draw = v;
        }
        if let Some(v) = args.mode {
            self.mode = v.into();
        }
        if let Some(v) = args.rounds {
            self.rounds = v;
        }
    }

    /// Pulls every numeric setting into its allowed range. Cards follow the
    /// clamped track length.
    pub fn clamped(&self) -> Self {
        let track = self.track.clamp(TRACK_RANGE.0, TRACK_RANGE.1);
        let race = RaceConfig {
            horse_count: self.horses.clamp(HORSES_RANGE.0, HORSES_RANGE.1),
            track_length: track,
            cards_per_horse: self.cards,
            draw_count: self.draw.clamp(DRAW_RANGE.0, DRAW_RANGE.1),
            mode: self.mode,
            total_rounds: self.rounds.clamp(ROUNDS_RANGE.0, ROUNDS_RANGE.1),
        }
        .with_track_length(track);
        Self {
            seed: self.seed,
            horses: race.horse_count,
            track: race.track_length,
            cards: race.cards_per_horse,
            draw: race.draw_count,
            mode: race.mode,
            rounds: race.total_rounds,
            interval: derby_live::settings::clamp_interval(self.interval_duration()).as_secs_f64(),
            provider: self.provider.clone(),
            commentary_timeout: self.commentary_timeout,
        }
    }

    pub fn race_config(&self) -> RaceConfig {
        RaceConfig {
            horse_count: self.horses,
            track_length: self.track,
            cards_per_horse: self.cards,
            draw_count: self.draw,
            mode: self.mode,
            total_rounds: self.rounds,
        }
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval).unwrap_or(Duration::ZERO)
    }

    pub fn commentary_timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.commentary_timeout).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Defaults, then the file named by `DERBY_CONFIG`, then `DERBY_*` variables.
/// Numeric values are clamped into range; values that do not parse are errors.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("DERBY_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.horses {
            cfg.horses = v;
            sources.horses = ValueSource::File;
        }
        if let Some(v) = f.track {
            cfg.track = v;
            sources.track = ValueSource::File;
        }
        if let Some(v) = f.cards {
            cfg.cards = v;
            sources.cards = ValueSource::File;
        }
        if let Some(v) = f.draw {
            cfg.draw = v;
            sources.draw = ValueSource::File;
        }
        if let Some(v) = f.mode {
            cfg.mode = v;
            sources.mode = ValueSource::File;
        }
        if let Some(v) = f.rounds {
            cfg.rounds = v;
            sources.rounds = ValueSource::File;
        }
        if let Some(v) = f.interval {
            cfg.interval = v;
            sources.interval = ValueSource::File;
        }
        if let Some(v) = f.provider {
            cfg.provider = v;
            sources.provider = ValueSource::File;
        }
        if let Some(v) = f.commentary_timeout {
            cfg.commentary_timeout = v;
            sources.commentary_timeout = ValueSource::File;
        }
    }

    if let Some(v) = env_value("DERBY_SEED", "seed")? {
        cfg.seed = Some(v);
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_HORSES", "horse count")? {
        cfg.horses = v;
        sources.horses = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_TRACK", "track length")? {
        cfg.track = v;
        sources.track = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_CARDS", "cards per horse")? {
        cfg.cards = v;
        sources.cards = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_DRAW", "draw count")? {
        cfg.draw = v;
        sources.draw = ValueSource::Env;
    }
    if let Ok(mode) = std::env::var("DERBY_MODE")
        && !mode.is_empty()
    {
        cfg.mode = parse_mode(&mode).ok_or_else(|| ConfigError::Invalid("Invalid mode".into()))?;
        sources.mode = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_ROUNDS", "round count")? {
        cfg.rounds = v;
        sources.rounds = ValueSource::Env;
    }
    if let Some(v) = env_value("DERBY_INTERVAL", "auto-draw interval")? {
        cfg.interval = v;
        sources.interval = ValueSource::Env;
    }
    if let Ok(provider) = std::env::var("DERBY_PROVIDER")
        && !provider.is_empty()
    {
        cfg.provider = provider;
        sources.provider = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg.clamped(),
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    horses: Option<usize>,
    #[serde(default)]
    track: Option<u32>,
    #[serde(default)]
    cards: Option<u32>,
    #[serde(default)]
    draw: Option<usize>,
    #[serde(default)]
    mode: Option<RaceMode>,
    #[serde(default)]
    rounds: Option<u32>,
    #[serde(default)]
    interval: Option<f64>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    commentary_timeout: Option<f64>,
}

/// Checks what clamping cannot fix.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !cfg.interval.is_finite() {
        return Err(ConfigError::Invalid(
            "interval must be a number of seconds".into(),
        ));
    }
    if !(cfg.commentary_timeout.is_finite() && cfg.commentary_timeout > 0.0) {
        return Err(ConfigError::Invalid(
            "commentary_timeout must be > 0".into(),
        ));
    }
    derby_commentary::create_provider(&cfg.provider)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(())
}

fn env_value<T: std::str::FromStr>(key: &str, what: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {}", what))),
        _ => Ok(None),
    }
}

fn parse_mode(s: &str) -> Option<RaceMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "single" => Some(RaceMode::Single),
        "tournament" => Some(RaceMode::Tournament),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let cfg = Config::default();
        assert_eq!(cfg, cfg.clamped());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let cfg = Config {
            horses: 40,
            track: 2,
            cards: 99,
            draw: 0,
            rounds: 0,
            interval: 0.1,
            ..Config::default()
        }
        .clamped();
        assert_eq!(cfg.horses, 10);
        assert_eq!(cfg.track, 5);
        assert_eq!(cfg.cards, 10);
        assert_eq!(cfg.draw, 1);
        assert_eq!(cfg.rounds, 1);
        assert_eq!(cfg.interval, 0.5);
    }

    #[test]
    fn args_override_loaded_values() {
        let mut cfg = Config::default();
        cfg.apply_args(&RaceArgs {
            seed: Some(9),
            horses: Some(3),
            mode: Some(crate::cli::ModeArg::Single),
            ..RaceArgs::default()
        });
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.horses, 3);
        assert_eq!(cfg.mode, RaceMode::Single);
        assert_eq!(cfg.track, 15);
    }

    #[test]
    fn unknown_provider_is_invalid() {
        let cfg = Config {
            provider: "oracle".into(),
            ..Config::default()
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(parse_mode("Single"), Some(RaceMode::Single));
        assert_eq!(parse_mode(" tournament "), Some(RaceMode::Tournament));
        assert_eq!(parse_mode("relay"), None);
    }
}

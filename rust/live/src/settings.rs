use std::time::Duration;

use crate::session::SessionError;

pub const MIN_AUTO_DRAW_INTERVAL: Duration = Duration::from_millis(500);
pub const MAX_AUTO_DRAW_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_AUTO_DRAW_INTERVAL: Duration = Duration::from_secs(2);
/// Auto-draw intervals move in half-second steps
pub const AUTO_DRAW_STEP_MS: u64 = 500;
pub const DEFAULT_COMMENTARY_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings a session is spawned with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Seed for the series; `None` picks one at random
    pub seed: Option<u64>,
    /// Delay between automatic draws
    pub auto_draw_interval: Duration,
    /// How long an outside commentary request may take
    pub commentary_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seed: None,
            auto_draw_interval: DEFAULT_AUTO_DRAW_INTERVAL,
            commentary_timeout: DEFAULT_COMMENTARY_TIMEOUT,
        }
    }
}

impl SessionOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.commentary_timeout.is_zero() {
            return Err(SessionError::InvalidOptions(
                "commentary_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rounds `interval` to the nearest half second and clamps it to 0.5..=5 s.
///
/// ```
/// use std::time::Duration;
/// use derby_live::settings::clamp_interval;
///
/// assert_eq!(clamp_interval(Duration::from_millis(1300)), Duration::from_millis(1500));
/// assert_eq!(clamp_interval(Duration::ZERO), Duration::from_millis(500));
/// assert_eq!(clamp_interval(Duration::from_secs(60)), Duration::from_secs(5));
/// ```
pub fn clamp_interval(interval: Duration) -> Duration {
    let ms = interval.as_millis().min(u64::MAX as u128) as u64;
    let stepped = (ms + AUTO_DRAW_STEP_MS / 2) / AUTO_DRAW_STEP_MS * AUTO_DRAW_STEP_MS;
    Duration::from_millis(stepped).clamp(MIN_AUTO_DRAW_INTERVAL, MAX_AUTO_DRAW_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = SessionOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.auto_draw_interval, Duration::from_secs(2));
        assert_eq!(options.commentary_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let options = SessionOptions {
            commentary_timeout: Duration::ZERO,
            ..SessionOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(SessionError::InvalidOptions(_))
        ));
    }

    #[test]
    fn interval_snaps_to_half_seconds() {
        assert_eq!(clamp_interval(Duration::from_millis(749)), Duration::from_millis(500));
        assert_eq!(clamp_interval(Duration::from_millis(750)), Duration::from_millis(1000));
        assert_eq!(clamp_interval(Duration::from_millis(2000)), Duration::from_secs(2));
        assert_eq!(clamp_interval(Duration::from_millis(4900)), Duration::from_secs(5));
    }
}

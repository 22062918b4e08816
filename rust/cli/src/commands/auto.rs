//! Auto command: lets a live session draw on its own timer.
//!
//! The series runs inside a [`RaceSession`] with auto-draw switched on. The
//! session turns auto-draw off when a round closes, so this driver starts
//! the next round and switches it back on until the series is over. Outside
//! commentary from the configured provider replaces the local line when it
//! arrives in time.

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_leaderboard, format_race};
use derby_commentary::CommentaryProvider;
use derby_engine::race::RaceStatus;
use derby_live::settings::SessionOptions;
use derby_live::{init_logging, Intent, LogFormat, RaceEvent, RaceSession};
use std::io::Write;
use std::sync::Arc;

/// Handle the auto command.
///
/// `json` prints every session event as one JSON line instead of the board.
/// Tracing output goes to stderr when `RUST_LOG` is set.
///
/// # Errors
///
/// `CliError::Config` for an unusable provider, `CliError::Engine` if the
/// session stops early, `CliError::Io` on write failures.
pub fn handle_auto_command(cfg: &Config, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    if std::env::var_os("RUST_LOG").is_some() {
        let format = if json { LogFormat::Json } else { LogFormat::Pretty };
        // a second call in the same process finds a subscriber already set
        let _ = init_logging(format);
    }
    let provider: Arc<dyn CommentaryProvider> =
        Arc::from(derby_commentary::create_provider(&cfg.provider)?);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(cfg, provider, json, out))
}

async fn drive(
    cfg: &Config,
    provider: Arc<dyn CommentaryProvider>,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let options = SessionOptions {
        seed: cfg.seed,
        auto_draw_interval: cfg.interval_duration(),
        commentary_timeout: cfg.commentary_timeout_duration(),
    };
    let provider_name = provider.name().to_string();
    let session = RaceSession::spawn(options, provider)?;
    let mut events = session.subscribe();

    let snapshot = session
        .dispatch(Intent::StartSeries(cfg.race_config()))
        .await?;
    if !json {
        writeln!(
            out,
            "auto: seed={} interval={}s provider={}",
            snapshot.seed, cfg.interval, provider_name
        )?;
    }
    session
        .send(Intent::ToggleAutoDraw {
            enabled: true,
            interval: None,
        })
        .await?;

    let mut finished = false;
    while let Some(event) = events.receiver.recv().await {
        if json {
            let line = event.to_json().map_err(std::io::Error::other)?;
            writeln!(out, "{}", line)?;
        } else {
            render(&event, out)?;
        }
        out.flush()?;
        match event {
            RaceEvent::RoundFinished { state, .. }
                if state.status == RaceStatus::RoundFinished && state.config.is_tournament() =>
            {
                session.send(Intent::StartNextRound).await?;
                session
                    .send(Intent::ToggleAutoDraw {
                        enabled: true,
                        interval: None,
                    })
                    .await?;
            }
            RaceEvent::SeriesFinished { .. } => {
                finished = true;
                break;
            }
            _ => {}
        }
    }
    drop(events);
    session.shutdown().await?;

    if finished {
        Ok(())
    } else {
        Err(CliError::Engine("race session ended before the series finished".into()))
    }
}

fn render(event: &RaceEvent, out: &mut dyn Write) -> Result<(), CliError> {
    match (event, event.state()) {
        (RaceEvent::RoundFinished { .. }, Some(state)) => {
            if state.config.is_tournament() {
                write!(out, "{}", format_leaderboard(&state.horses))?;
            }
        }
        (_, Some(state)) => {
            writeln!(out)?;
            write!(out, "{}", format_race(state))?;
        }
        (RaceEvent::CommentaryUpdated { line, .. }, None) => writeln!(out, ">> {}", line)?,
        (RaceEvent::SeriesFinished { standings, .. }, None) => {
            if let Some(winner) = standings.first() {
                writeln!(out, "Series over. Top of the table: {}", winner.name)?;
            }
        }
        (RaceEvent::SeriesReset { .. }, None) => writeln!(out, "Series reset.")?,
        (
            RaceEvent::AutoDrawChanged {
                enabled,
                interval_ms,
                ..
            },
            None,
        ) => {
            if *enabled {
                writeln!(out, "Auto-draw on, every {} ms", interval_ms)?;
            } else {
                writeln!(out, "Auto-draw off")?;
            }
        }
        (_, None) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_engine::config::{RaceConfig, RaceMode};
    use derby_engine::race::TurnStamp;
    use derby_engine::series::Series;

    fn rendered(event: &RaceEvent) -> String {
        let mut out = Vec::new();
        render(event, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn state_events_draw_the_board() {
        let mut series = Series::new(Some(1));
        let state = series
            .start_series(RaceConfig {
                mode: RaceMode::Tournament,
                total_rounds: 2,
                ..RaceConfig::default()
            })
            .clone();

        let text = rendered(&RaceEvent::round_started(state.clone()));
        assert!(text.contains("Round 1/2 | turn 0"));

        let text = rendered(&RaceEvent::round_finished(state));
        assert!(text.starts_with("Standings:"));
        assert!(!text.contains("Round 1/2"));
    }

    #[test]
    fn commentary_and_toggles_are_one_line_each() {
        let stamp = TurnStamp {
            series: 1,
            round: 1,
            turn: 3,
        };
        assert_eq!(
            rendered(&RaceEvent::commentary_updated(stamp, "What a finish!".into())),
            ">> What a finish!\n"
        );
        assert_eq!(
            rendered(&RaceEvent::auto_draw_changed(true, 500)),
            "Auto-draw on, every 500 ms\n"
        );
        assert_eq!(rendered(&RaceEvent::series_reset()), "Series reset.\n");
    }
}

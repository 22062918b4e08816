//! The single owner of a running race.
//!
//! A [`RaceSession`] is a handle to a task that holds the [`Series`]. Intents
//! go in through a channel, snapshots come out through a watch channel and
//! events through an [`EventBus`]. The task is the only place state changes,
//! so the auto-draw timer and outside commentary never race with user
//! intents: both are tagged with the [`TurnStamp`] they were started for and
//! are dropped when it no longer matches.

use std::sync::Arc;
use std::time::Duration;

use derby_commentary::{request_commentary, CommentaryError, CommentaryProvider, CommentaryRequest};
use derby_engine::config::RaceConfig;
use derby_engine::race::{RaceState, TurnStamp};
use derby_engine::series::Series;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::events::{EventBus, EventSubscription, RaceEvent};
use crate::settings::{clamp_interval, SessionOptions};

const INTENT_BUFFER: usize = 64;

/// What a user (or a driver acting for one) can ask of a session.
/// Intents whose preconditions are not met are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartSeries(RaceConfig),
    Draw,
    StartNextRound,
    ResetSeries,
    /// `interval` is clamped to 0.5..=5 s; `None` keeps the current one
    ToggleAutoDraw {
        enabled: bool,
        interval: Option<Duration>,
    },
}

/// Everything presentation needs, as of the last processed intent or event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub generation: u64,
    /// `None` while in setup
    pub state: Option<RaceState>,
    pub commentary: String,
    pub auto_draw: bool,
    pub auto_draw_interval_ms: u64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Race session has shut down")]
    Closed,
    #[error("Invalid session options: {0}")]
    InvalidOptions(String),
}

struct Envelope {
    intent: Intent,
    done: Option<oneshot::Sender<SessionSnapshot>>,
}

/// Result of an outside commentary request, tagged with the turn it describes.
struct Enrichment {
    stamp: TurnStamp,
    result: Result<String, CommentaryError>,
}

/// Handle to a running session. Dropping it (or calling [`shutdown`]) stops
/// the session task once queued intents are processed.
///
/// [`shutdown`]: RaceSession::shutdown
pub struct RaceSession {
    intents: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: EventBus,
    task: JoinHandle<()>,
}

impl RaceSession {
    /// Starts the session task in setup state. Must be called inside a tokio runtime.
    pub fn spawn(
        options: SessionOptions,
        provider: Arc<dyn CommentaryProvider>,
    ) -> Result<Self, SessionError> {
        options.validate()?;

        let series = Series::new(options.seed);
        let interval = clamp_interval(options.auto_draw_interval);
        let events = EventBus::new();
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
        let (enrich_tx, enrich_rx) = mpsc::channel(INTENT_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&series, false, interval));

        tracing::info!(
            seed = series.seed(),
            provider = provider.name(),
            auto_draw_interval_ms = interval.as_millis() as u64,
            "race session spawned"
        );

        let actor = SessionActor {
            series,
            provider,
            commentary_timeout: options.commentary_timeout,
            auto_draw: false,
            interval,
            next_draw: None,
            events: events.clone(),
            snapshots: snapshot_tx,
            enrich_tx,
            enrich_rx,
        };
        let task = tokio::spawn(actor.run(intent_rx));

        Ok(Self {
            intents: intent_tx,
            snapshots: snapshot_rx,
            events,
            task,
        })
    }

    /// Queues `intent` without waiting for it to be processed.
    pub async fn send(&self, intent: Intent) -> Result<(), SessionError> {
        self.intents
            .send(Envelope { intent, done: None })
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Queues `intent` and waits for the snapshot taken right after it was handled.
    pub async fn dispatch(&self, intent: Intent) -> Result<SessionSnapshot, SessionError> {
        let (done, reply) = oneshot::channel();
        self.intents
            .send(Envelope {
                intent,
                done: Some(done),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        reply.await.map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Closes the intent channel and waits for the task to finish.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        let RaceSession { intents, task, .. } = self;
        drop(intents);
        task.await.map_err(|_| SessionError::Closed)
    }
}

fn snapshot_of(series: &Series, auto_draw: bool, interval: Duration) -> SessionSnapshot {
    SessionSnapshot {
        seed: series.seed(),
        generation: series.generation(),
        state: series.snapshot(),
        commentary: series.commentary().to_string(),
        auto_draw,
        auto_draw_interval_ms: interval.as_millis() as u64,
    }
}

struct SessionActor {
    series: Series,
    provider: Arc<dyn CommentaryProvider>,
    commentary_timeout: Duration,
    auto_draw: bool,
    interval: Duration,
    /// Armed auto-draw: when it fires and the turn it was armed for
    next_draw: Option<(Instant, TurnStamp)>,
    events: EventBus,
    snapshots: watch::Sender<SessionSnapshot>,
    enrich_tx: mpsc::Sender<Enrichment>,
    enrich_rx: mpsc::Receiver<Enrichment>,
}

impl SessionActor {
    async fn run(mut self, mut intents: mpsc::Receiver<Envelope>) {
        loop {
            let deadline = self.next_draw.map(|(at, _)| at);
            tokio::select! {
                envelope = intents.recv() => {
                    let Some(Envelope { intent, done }) = envelope else {
                        break;
                    };
                    self.handle(intent);
                    self.publish();
                    if let Some(done) = done {
                        let _ = done.send(self.snapshot());
                    }
                }
                Some(enrichment) = self.enrich_rx.recv() => {
                    if self.apply_enrichment(enrichment) {
                        self.publish();
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_auto_draw();
                    self.publish();
                }
            }
        }
        tracing::info!(generation = self.series.generation(), "race session stopped");
    }

    fn handle(&mut self, intent: Intent) {
        tracing::debug!(intent = ?intent, "intent received");
        match intent {
            Intent::StartSeries(config) => self.start_series(config),
            Intent::Draw => self.draw(),
            Intent::StartNextRound => self.start_next_round(),
            Intent::ResetSeries => self.reset_series(),
            Intent::ToggleAutoDraw { enabled, interval } => self.set_auto_draw(enabled, interval),
        }
    }

    fn start_series(&mut self, config: RaceConfig) {
        let state = self.series.start_series(config).clone();
        self.events
            .broadcast(RaceEvent::series_started(self.series.seed(), state));
        self.rearm();
    }

    fn draw(&mut self) {
        let state = match self.series.draw() {
            Ok(state) => state.clone(),
            Err(_) => return,
        };
        tracing::debug!(
            round = state.current_round,
            turn = state.current_turn,
            drawn = ?state.last_drawn,
            status = ?state.status,
            "turn resolved"
        );
        let playing = state.is_playing();
        if playing {
            self.request_enrichment(&state);
        }
        self.events.broadcast(RaceEvent::turn_resolved(state.clone()));

        if !playing {
            self.events.broadcast(RaceEvent::round_finished(state));
            if self.series.is_finished() {
                self.events
                    .broadcast(RaceEvent::series_finished(self.series.standings()));
            }
            self.set_auto_draw(false, None);
        }
        self.rearm();
    }

    fn start_next_round(&mut self) {
        if let Ok(state) = self.series.advance_round() {
            let state = state.clone();
            self.events.broadcast(RaceEvent::round_started(state));
        }
        self.rearm();
    }

    fn reset_series(&mut self) {
        if self.series.state().is_none() {
            return;
        }
        self.series.reset_series();
        self.events.broadcast(RaceEvent::series_reset());
        self.set_auto_draw(false, None);
        self.rearm();
    }

    fn set_auto_draw(&mut self, enabled: bool, interval: Option<Duration>) {
        let interval = interval.map(clamp_interval).unwrap_or(self.interval);
        if enabled == self.auto_draw && interval == self.interval {
            return;
        }
        self.auto_draw = enabled;
        self.interval = interval;
        tracing::info!(
            enabled,
            interval_ms = interval.as_millis() as u64,
            "auto-draw changed"
        );
        self.events.broadcast(RaceEvent::auto_draw_changed(
            enabled,
            interval.as_millis() as u64,
        ));
        self.rearm();
    }

    /// Arms the timer for the current turn, or disarms it when auto-draw is off
    /// or there is nothing to draw.
    fn rearm(&mut self) {
        self.next_draw = match self.series.state() {
            Some(state) if self.auto_draw && state.is_playing() && state.pending_turn.is_some() => {
                Some((Instant::now() + self.interval, state.stamp()))
            }
            _ => None,
        };
    }

    fn fire_auto_draw(&mut self) {
        let Some((_, stamp)) = self.next_draw.take() else {
            return;
        };
        if self.series.state().map(RaceState::stamp) != Some(stamp) {
            tracing::debug!(
                round = stamp.round,
                turn = stamp.turn,
                "auto-draw timer outlived its turn"
            );
            self.rearm();
            return;
        }
        self.draw();
    }

    fn request_enrichment(&self, state: &RaceState) {
        let request = CommentaryRequest::from_state(state);
        let provider = Arc::clone(&self.provider);
        let tx = self.enrich_tx.clone();
        let limit = self.commentary_timeout;
        tokio::spawn(async move {
            let result = request_commentary(provider.as_ref(), &request, limit).await;
            let _ = tx
                .send(Enrichment {
                    stamp: request.stamp,
                    result,
                })
                .await;
        });
    }

    /// Returns whether the displayed line changed.
    fn apply_enrichment(&mut self, enrichment: Enrichment) -> bool {
        let Enrichment { stamp, result } = enrichment;
        match result {
            Ok(line) => {
                if self.series.apply_commentary(stamp, &line) {
                    tracing::debug!(round = stamp.round, turn = stamp.turn, "commentary applied");
                    self.events
                        .broadcast(RaceEvent::commentary_updated(stamp, line));
                    true
                } else {
                    tracing::warn!(
                        series = stamp.series,
                        round = stamp.round,
                        turn = stamp.turn,
                        "stale commentary discarded"
                    );
                    false
                }
            }
            Err(CommentaryError::Disabled) => false,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    round = stamp.round,
                    turn = stamp.turn,
                    error = %e,
                    "commentary provider failed"
                );
                false
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&self.series, self.auto_draw, self.interval)
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

use derby_engine::config::RaceConfig;
use derby_engine::horse::Horse;
use derby_engine::race::{RaceState, TurnStamp};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

// Bounded so a subscriber that stops reading cannot grow memory without limit;
// it is dropped instead.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<RaceEvent>;
pub type EventReceiver = mpsc::Receiver<RaceEvent>;

pub struct EventSubscription {
    bus: EventBus,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    /// Everything already queued, without waiting.
    pub fn drain(&mut self) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscriber_id);
    }
}

/// Fan-out of session events to any number of subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Vec<(usize, EventSender)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw();
        EventSubscription {
            bus: self.clone(),
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, tx));

        tracing::debug!(subscriber_id = id, "subscribed to race events");
        (id, rx)
    }

    pub fn broadcast(&self, event: RaceEvent) {
        tracing::debug!(event = event.kind(), "broadcasting race event");

        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut failed = Vec::new();
        for (id, sender) in subscribers {
            // never block the session on a slow reader
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    subscriber_id = id,
                    error = %e,
                    "dropping subscriber that cannot keep up"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&failed);
        }
    }

    pub fn unsubscribe(&self, subscriber_id: usize) {
        self.remove_subscribers(&[subscriber_id]);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn remove_subscribers(&self, ids: &[usize]) {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| !ids.contains(id));
    }
}

/// Something that happened in a session. Every event carries an RFC 3339
/// timestamp; state-bearing events carry a full snapshot so a subscriber
/// never has to ask for one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RaceEvent {
    SeriesStarted {
        ts: String,
        seed: u64,
        config: RaceConfig,
        state: Box<RaceState>,
    },
    RoundStarted {
        ts: String,
        state: Box<RaceState>,
    },
    TurnResolved {
        ts: String,
        state: Box<RaceState>,
    },
    CommentaryUpdated {
        ts: String,
        stamp: TurnStamp,
        line: String,
    },
    RoundFinished {
        ts: String,
        state: Box<RaceState>,
    },
    SeriesFinished {
        ts: String,
        standings: Vec<Horse>,
    },
    SeriesReset {
        ts: String,
    },
    AutoDrawChanged {
        ts: String,
        enabled: bool,
        interval_ms: u64,
    },
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl RaceEvent {
    pub fn series_started(seed: u64, state: RaceState) -> Self {
        RaceEvent::SeriesStarted {
            ts: now(),
            seed,
            config: state.config.clone(),
            state: Box::new(state),
        }
    }

    pub fn round_started(state: RaceState) -> Self {
        RaceEvent::RoundStarted {
            ts: now(),
            state: Box::new(state),
        }
    }

    pub fn turn_resolved(state: RaceState) -> Self {
        RaceEvent::TurnResolved {
            ts: now(),
            state: Box::new(state),
        }
    }

    pub fn commentary_updated(stamp: TurnStamp, line: String) -> Self {
        RaceEvent::CommentaryUpdated {
            ts: now(),
            stamp,
            line,
        }
    }

    pub fn round_finished(state: RaceState) -> Self {
        RaceEvent::RoundFinished {
            ts: now(),
            state: Box::new(state),
        }
    }

    pub fn series_finished(standings: Vec<Horse>) -> Self {
        RaceEvent::SeriesFinished {
            ts: now(),
            standings,
        }
    }

    pub fn series_reset() -> Self {
        RaceEvent::SeriesReset { ts: now() }
    }

    pub fn auto_draw_changed(enabled: bool, interval_ms: u64) -> Self {
        RaceEvent::AutoDrawChanged {
            ts: now(),
            enabled,
            interval_ms,
        }
    }

    /// Wire name of the variant, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            RaceEvent::SeriesStarted { .. } => "series_started",
            RaceEvent::RoundStarted { .. } => "round_started",
            RaceEvent::TurnResolved { .. } => "turn_resolved",
            RaceEvent::CommentaryUpdated { .. } => "commentary_updated",
            RaceEvent::RoundFinished { .. } => "round_finished",
            RaceEvent::SeriesFinished { .. } => "series_finished",
            RaceEvent::SeriesReset { .. } => "series_reset",
            RaceEvent::AutoDrawChanged { .. } => "auto_draw_changed",
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            RaceEvent::SeriesStarted { ts, .. }
            | RaceEvent::RoundStarted { ts, .. }
            | RaceEvent::TurnResolved { ts, .. }
            | RaceEvent::CommentaryUpdated { ts, .. }
            | RaceEvent::RoundFinished { ts, .. }
            | RaceEvent::SeriesFinished { ts, .. }
            | RaceEvent::SeriesReset { ts }
            | RaceEvent::AutoDrawChanged { ts, .. } => ts,
        }
    }

    /// Race state carried by the event, if any.
    pub fn state(&self) -> Option<&RaceState> {
        match self {
            RaceEvent::SeriesStarted { state, .. }
            | RaceEvent::RoundStarted { state, .. }
            | RaceEvent::TurnResolved { state, .. }
            | RaceEvent::RoundFinished { state, .. } => Some(&**state),
            _ => None,
        }
    }

    /// Single-line JSON, for streaming events to a file or pipe.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

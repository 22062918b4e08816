//! # derby_live: Running Card Derby Sessions
//!
//! Wraps the race engine in a tokio task that owns it, adds the auto-draw
//! timer and outside commentary, and publishes snapshots and events for any
//! front end.
//!
//! ```rust
//! use std::sync::Arc;
//! use derby_commentary::silent::SilentProvider;
//! use derby_engine::config::RaceConfig;
//! use derby_live::{Intent, RaceSession, SessionOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let session = RaceSession::spawn(SessionOptions::with_seed(1), Arc::new(SilentProvider)).unwrap();
//! session.dispatch(Intent::StartSeries(RaceConfig::default())).await.unwrap();
//! let snapshot = session.dispatch(Intent::Draw).await.unwrap();
//! assert_eq!(snapshot.state.map(|s| s.current_turn), Some(1));
//! session.shutdown().await.unwrap();
//! # });
//! ```

pub mod events;
pub mod logging;
pub mod session;
pub mod settings;

pub use events::{EventBus, EventSubscription, RaceEvent};
pub use logging::{init_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use session::{Intent, RaceSession, SessionError, SessionSnapshot};
pub use settings::SessionOptions;

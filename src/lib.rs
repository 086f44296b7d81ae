//! Input Frequency - background keyboard/mouse usage statistics monitor.
//!
//! This library classifies raw input events into higher-level usage units
//! (single keys, modifier combos, timed chords of consecutive combos),
//! maintains running aggregate statistics, and persists them to a durable
//! line-oriented store with periodic human-readable reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Input Frequency                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Collector  │──▶│ Classifier  │──▶│ Statistics  │        │
//! │  │  (OS hook)  │   │ (per-key &  │   │   Store     │        │
//! │  └─────────────┘   │  modifier   │   │  (locked)   │        │
//! │                    │   state)    │   └──────┬──────┘        │
//! │                    └─────────────┘          │               │
//! │                                      ┌──────▼──────┐        │
//! │                                      │   Persist   │        │
//! │                                      │ (periodic   │        │
//! │                                      │ save+report)│        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Classification and counting run synchronously on the event-delivery
//! path; all disk I/O happens on a background flusher thread.
//!
//! # Example
//!
//! ```no_run
//! use input_frequency::collector::{FixedScreen, InputEvent};
//! use input_frequency::core::{InputClassifier, StatisticsStore};
//!
//! let mut classifier = InputClassifier::new(Box::new(FixedScreen::new(1920, 1080)));
//! let mut store = StatisticsStore::new();
//!
//! for observation in classifier.process(&InputEvent::key_down(65)) {
//!     store.apply(&observation);
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod persist;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorError, InputEvent, WheelAxis};
pub use config::Config;
pub use core::{
    InputClassifier, Key, KeyChord, KeyClass, KeyCombo, Observation, ReportData, SharedStats,
    StatisticsStore,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Core domain: key identities, combo/chord values, the event
//! classification state machine, the statistics store, and report
//! derivation.

pub mod classifier;
pub mod combo;
pub mod key;
pub mod report;
pub mod stats;

pub use classifier::{InputClassifier, Observation};
pub use combo::{KeyChord, KeyCombo, ModifierSet};
pub use key::{Key, KeyClass};
pub use report::ReportData;
pub use stats::{SharedStats, StatisticsStore};

/// Errors from parsing the textual key/combo/chord encodings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed key code `{0}`")]
    BadKey(String),
    #[error("unknown modifier name `{0}`")]
    BadModifier(String),
    #[error("empty combo")]
    EmptyCombo,
}

//! Aggregated usage statistics.
//!
//! One [`StatisticsStore`] holds every counter the monitor accumulates.
//! It is shared between the event loop and the flusher thread behind a
//! single mutex ([`SharedStats`]); all mutation happens through the
//! counting methods so the invariants live in one place.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::core::classifier::Observation;
use crate::core::combo::{KeyChord, KeyCombo};
use crate::core::key::Key;

/// Key-down durations at or above this are discarded as implausible.
const DOWN_FOR_SANITY_MS: i64 = 2 * 60 * 1000;

/// Two combos completed further apart than this do not link into a chord.
const CHORD_WINDOW_MS: i64 = 3_000;

/// The store shared between the event loop and the background flusher.
pub type SharedStats = Arc<Mutex<StatisticsStore>>;

/// All accumulated counters. Field visibility is crate-wide so the codec
/// and report modules can read (and the codec rebuild) the raw state;
/// everything else goes through the counting methods.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatisticsStore {
    pub(crate) runtime_minutes: u64,
    pub(crate) keyboard_use_seconds: f64,
    pub(crate) mouse_use_seconds: f64,
    pub(crate) mouse_travel_x: i64,
    pub(crate) mouse_travel_y: i64,
    pub(crate) mouse_travel: f64,
    pub(crate) mouse_travel_screens_x: f64,
    pub(crate) mouse_travel_screens_y: f64,
    pub(crate) mouse_travel_screens: f64,
    pub(crate) key_counts: HashMap<Key, u64>,
    pub(crate) combo_counts: HashMap<KeyCombo, u64>,
    pub(crate) chord_counts: HashMap<KeyChord, u64>,
    pub(crate) down_for: HashMap<Key, f64>,
    /// Chord-linking state; deliberately not persisted, so a chord never
    /// spans a restart.
    pub(crate) previous_combo: Option<(KeyCombo, DateTime<Utc>)>,
}

impl StatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classified observation into the counters.
    pub fn apply(&mut self, observation: &Observation) {
        match *observation {
            Observation::Key { key, held } => self.count_key(key, held),
            Observation::Combo { combo, at } => self.count_combo(combo, at),
            Observation::KeyboardUse { seconds } => self.count_keyboard_use(seconds),
            Observation::MouseUse { seconds } => self.count_mouse_use(seconds),
            Observation::MouseTravel {
                dx,
                dy,
                distance,
                screens_x,
                screens_y,
                screens,
            } => self.count_mouse_travel(dx, dy, distance, screens_x, screens_y, screens),
        }
    }

    pub fn count_minutes(&mut self, minutes: u64) {
        self.runtime_minutes += minutes;
    }

    /// Count a key occurrence. The occurrence always counts; the held
    /// duration only accumulates when it is sane (a hook glitch or sleep
    /// gap can report hours of "holding").
    pub fn count_key(&mut self, key: Key, held: Duration) {
        *self.key_counts.entry(key).or_default() += 1;
        let ms = held.num_milliseconds();
        if (0..DOWN_FOR_SANITY_MS).contains(&ms) {
            *self.down_for.entry(key).or_default() += ms as f64 / 1000.0;
        }
    }

    /// Count a combo and link it to the previous one when they completed
    /// close enough together. Identical consecutive combos still link; the
    /// report layer filters self-chords.
    pub fn count_combo(&mut self, combo: KeyCombo, at: DateTime<Utc>) {
        *self.combo_counts.entry(combo).or_default() += 1;
        if let Some((previous, prev_at)) = self.previous_combo {
            let gap_ms = (at - prev_at).num_milliseconds();
            if (0..CHORD_WINDOW_MS).contains(&gap_ms) {
                *self
                    .chord_counts
                    .entry(KeyChord::pair(previous, combo))
                    .or_default() += 1;
            }
        }
        self.previous_combo = Some((combo, at));
    }

    pub fn count_keyboard_use(&mut self, seconds: f64) {
        self.keyboard_use_seconds += seconds;
    }

    pub fn count_mouse_use(&mut self, seconds: f64) {
        self.mouse_use_seconds += seconds;
    }

    pub fn count_mouse_travel(
        &mut self,
        dx: i64,
        dy: i64,
        distance: f64,
        screens_x: f64,
        screens_y: f64,
        screens: f64,
    ) {
        self.mouse_travel_x += dx;
        self.mouse_travel_y += dy;
        self.mouse_travel += distance;
        self.mouse_travel_screens_x += screens_x;
        self.mouse_travel_screens_y += screens_y;
        self.mouse_travel_screens += screens;
    }

    pub fn runtime_minutes(&self) -> u64 {
        self.runtime_minutes
    }
}

//! Report data derivation and plain-text rendering.
//!
//! [`ReportData`] is a consistent snapshot taken under the store lock;
//! rendering works on the snapshot only, so the lock is never held
//! across I/O.

use std::fmt::Write as _;

use crate::core::combo::{KeyChord, KeyCombo};
use crate::core::key::{Key, KeyClass};
use crate::core::stats::StatisticsStore;

/// Chords beyond the top this-many are dropped from the report.
const CHORD_REPORT_CAP: usize = 100;

/// Everything a report needs, pre-sorted. Counter lists are descending by
/// count; `class_usage` holds the share of all key occurrences per class,
/// in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub runtime_minutes: u64,
    pub keyboard_use_seconds: f64,
    pub mouse_use_seconds: f64,
    pub mouse_travel: f64,
    pub mouse_travel_screens: f64,
    pub keys: Vec<(Key, u64)>,
    pub down_for: Vec<(Key, f64)>,
    pub class_usage: Vec<(KeyClass, f64)>,
    pub combos: Vec<(KeyCombo, u64)>,
    pub chords: Vec<(KeyChord, u64)>,
}

impl StatisticsStore {
    /// Derive the report snapshot from the current counters.
    pub fn report(&self) -> ReportData {
        let mut keys: Vec<(Key, u64)> = self.key_counts.iter().map(|(k, c)| (*k, *c)).collect();
        keys.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut down_for: Vec<(Key, f64)> =
            self.down_for.iter().map(|(k, s)| (*k, *s)).collect();
        down_for.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let total_key_count: u64 = self.key_counts.values().sum();
        let mut class_usage = Vec::with_capacity(KeyClass::ALL.len());
        for class in KeyClass::ALL {
            let count: u64 = self
                .key_counts
                .iter()
                .filter(|(k, _)| k.class() == class)
                .map(|(_, c)| *c)
                .sum();
            let percent = if total_key_count == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total_key_count as f64
            };
            class_usage.push((class, percent));
        }
        class_usage.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut combos: Vec<(KeyCombo, u64)> =
            self.combo_counts.iter().map(|(c, n)| (*c, *n)).collect();
        combos.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.encode().cmp(&b.0.encode())));

        // Self-chords (the same combo twice, i.e. key repeat) are counted
        // but are noise in a report of multi-step gestures.
        let mut chords: Vec<(KeyChord, u64)> = self
            .chord_counts
            .iter()
            .filter(|(chord, _)| {
                let pair = chord.combos();
                pair.len() == 2 && pair[0] != pair[1]
            })
            .map(|(c, n)| (c.clone(), *n))
            .collect();
        chords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.encode().cmp(&b.0.encode())));
        chords.truncate(CHORD_REPORT_CAP);

        ReportData {
            runtime_minutes: self.runtime_minutes,
            keyboard_use_seconds: self.keyboard_use_seconds,
            mouse_use_seconds: self.mouse_use_seconds,
            mouse_travel: self.mouse_travel,
            mouse_travel_screens: self.mouse_travel_screens,
            keys,
            down_for,
            class_usage,
            combos,
            chords,
        }
    }
}

/// Render the report as plain text.
pub fn render_text(data: &ReportData) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== TOTALS ===");
    let _ = writeln!(out, "  Runtime: {} minutes", data.runtime_minutes);
    let _ = writeln!(
        out,
        "  Keyboard use: {:.0} seconds",
        data.keyboard_use_seconds
    );
    let _ = writeln!(out, "  Mouse use: {:.0} seconds", data.mouse_use_seconds);
    let _ = writeln!(out, "  Mouse travel: {:.0} pixels", data.mouse_travel);
    let _ = writeln!(
        out,
        "  Mouse travel: {:.1} screens",
        data.mouse_travel_screens
    );
    out.push('\n');

    let _ = writeln!(out, "=== KEY USAGE ===");
    for (key, count) in &data.keys {
        let _ = writeln!(out, "  {:>15} {:>7}", key.to_string(), count);
    }
    out.push('\n');

    let _ = writeln!(out, "=== KEY DOWN DURATION ===");
    for (key, seconds) in &data.down_for {
        let _ = writeln!(out, "  {:>15} {:>7.0} seconds", key.to_string(), seconds);
    }
    out.push('\n');

    let _ = writeln!(out, "=== KEY CLASS USAGE ===");
    for (class, percent) in &data.class_usage {
        let _ = writeln!(out, "  {:>15} {:>6.1}%", class.to_string(), percent);
    }
    out.push('\n');

    let _ = writeln!(out, "=== COMBO USAGE ===");
    for (combo, count) in &data.combos {
        let _ = writeln!(out, "  {:>30} {:>7}", combo.to_string(), count);
    }
    out.push('\n');

    let _ = writeln!(out, "=== CHORD USAGE ===");
    for (chord, count) in &data.chords {
        let _ = writeln!(out, "  {:>45} {:>7}", chord.to_string(), count);
    }

    out
}

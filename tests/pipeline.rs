//! End-to-end pipeline tests: raw events through the classifier into the
//! store, then out through the persistence codec and report derivation.

use chrono::{DateTime, Duration, Utc};

use input_frequency::collector::{FixedScreen, InputEvent, WheelAxis};
use input_frequency::core::{
    report, InputClassifier, Key, KeyChord, KeyCombo, ModifierSet, StatisticsStore,
};
use input_frequency::persist;

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(ms)
}

fn down(key: Key, ms: i64) -> InputEvent {
    InputEvent::KeyDown {
        code: key.code(),
        at: at(ms),
    }
}

fn up(key: Key, ms: i64) -> InputEvent {
    InputEvent::KeyUp {
        code: key.code(),
        at: at(ms),
    }
}

fn run(events: &[InputEvent]) -> StatisticsStore {
    let mut classifier = InputClassifier::new(Box::new(FixedScreen::new(1920, 1080)));
    let mut store = StatisticsStore::new();
    for event in events {
        for observation in classifier.process(event) {
            store.apply(&observation);
        }
    }
    store
}

fn combo(key: Key, modifiers: &[Key]) -> KeyCombo {
    let mut set = ModifierSet::EMPTY;
    for m in modifiers {
        set.insert(*m);
    }
    KeyCombo::new(key, set)
}

#[test]
fn test_copy_paste_session_counts_chord() {
    // Ctrl+C then Ctrl+V within the chord window.
    let store = run(&[
        down(Key::LCTRL, 0),
        down(Key::C, 100),
        up(Key::C, 180),
        up(Key::LCTRL, 250),
        down(Key::LCTRL, 700),
        down(Key::V, 800),
        up(Key::V, 880),
        up(Key::LCTRL, 950),
    ]);

    let copy = combo(Key::C, &[Key::LCTRL]);
    let paste = combo(Key::V, &[Key::LCTRL]);
    assert_eq!(store.report().combos.len(), 2);
    assert_eq!(
        store.report().chords,
        vec![(KeyChord::pair(copy, paste), 1)]
    );

    // Key occurrences: C, V, and LCtrl twice.
    let keys = store.report().keys;
    let count = |key: Key| keys.iter().find(|(k, _)| *k == key).map(|(_, c)| *c);
    assert_eq!(count(Key::C), Some(1));
    assert_eq!(count(Key::V), Some(1));
    assert_eq!(count(Key::LCTRL), Some(2));
}

#[test]
fn test_wheel_scroll_repeats_excluded_from_chord_report() {
    // Two wheel clicks down within a second: two key occurrences, a
    // self-chord in the counters, nothing in the chord report.
    let store = run(&[
        InputEvent::MouseWheel {
            axis: WheelAxis::Vertical,
            clicks: -1,
            at: at(0),
        },
        InputEvent::MouseWheel {
            axis: WheelAxis::Vertical,
            clicks: -1,
            at: at(600),
        },
    ]);

    let keys = store.report().keys;
    assert_eq!(keys, vec![(Key::MOUSE_WHEEL_DOWN, 2)]);

    let wheel = combo(Key::MOUSE_WHEEL_DOWN, &[]);
    let encoded = persist::encode(&store);
    let decoded = persist::decode(&encoded).unwrap();
    assert_eq!(
        decoded.report().combos,
        vec![(wheel, 2)]
    );
    assert!(store.report().chords.is_empty());
}

#[test]
fn test_session_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.csv");

    let mut store = run(&[
        down(Key::LSHIFT, 0),
        down(Key::H, 100),
        up(Key::H, 200),
        up(Key::LSHIFT, 300),
        InputEvent::MouseMove {
            x: 0,
            y: 0,
            at: at(400),
        },
        InputEvent::MouseMove {
            x: 30,
            y: 40,
            at: at(500),
        },
    ]);
    store.count_minutes(5);

    persist::save(&path, &store).unwrap();
    let loaded = persist::load_or_default(&path);

    assert_eq!(loaded.runtime_minutes(), 5);
    let data = loaded.report();
    assert_eq!(
        data.combos,
        vec![(combo(Key::H, &[Key::LSHIFT]), 1)]
    );
    assert!((data.mouse_travel - 50.0).abs() < 1e-9);
    assert!(data.keyboard_use_seconds > 0.0);
    assert!(data.mouse_use_seconds > 0.0);
}

#[test]
fn test_accumulation_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.csv");

    let first = run(&[down(Key::A, 0), up(Key::A, 80)]);
    persist::save(&path, &first).unwrap();

    // Second session resumes from the saved store.
    let mut classifier = InputClassifier::new(Box::new(FixedScreen::new(1920, 1080)));
    let mut store = persist::load_or_default(&path);
    for event in [down(Key::A, 0), up(Key::A, 80)] {
        for observation in classifier.process(&event) {
            store.apply(&observation);
        }
    }
    persist::save(&path, &store).unwrap();

    let loaded = persist::load_or_default(&path);
    assert_eq!(loaded.report().keys, vec![(Key::A, 2)]);
}

#[test]
fn test_corrupt_store_quarantined_and_monitoring_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.csv");
    std::fs::write(&path, "RuntimeMinutes,5\nKeyCounts,oops,65\n").unwrap();

    let store = persist::load_or_default(&path);
    assert_eq!(store, StatisticsStore::new());
    assert!(dir.path().join("stats.csv.bad-1").exists());

    // The fresh store persists normally afterwards.
    persist::save(&path, &store).unwrap();
    assert_eq!(persist::load_or_default(&path), StatisticsStore::new());
}

#[test]
fn test_report_renders_from_live_session() {
    let store = run(&[
        down(Key::LCTRL, 0),
        down(Key::C, 100),
        up(Key::C, 150),
        up(Key::LCTRL, 200),
    ]);
    let text = report::render_text(&store.report());
    assert!(text.contains("=== COMBO USAGE ==="));
    assert!(text.contains("LCtrl+C"));
}

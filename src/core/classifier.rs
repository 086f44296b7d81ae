//! Event classification state machine.
//!
//! Consumes raw input events in occurrence order and turns them into
//! higher-level observations: key occurrences with held durations,
//! completed combos, keyboard/mouse use samples and mouse travel deltas.
//! All timing is driven by the event timestamps, so every transition is
//! testable without an OS hook, and processing never blocks — the event
//! delivery path is latency-sensitive.

use chrono::{DateTime, Duration, Utc};

use crate::collector::types::{InputEvent, ScreenProbe, WheelAxis};
use crate::core::combo::{KeyCombo, MODIFIER_ORDER};
use crate::core::key::{Key, KEY_SPACE};

/// An idle gap longer than this is not counted as continuous use.
const USE_GAP_CUTOFF_MS: i64 = 12_000;

/// Credit granted for resuming use after an idle gap.
const RESUME_CREDIT_SECS: f64 = 1.0;

/// How often the virtual desktop size is re-probed, at most.
const SCREEN_REFRESH_MS: i64 = 5 * 60 * 1000;

/// A classified occurrence produced from one raw event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// A key occurrence, reported when the key's gesture completes.
    /// `held` is the measured down-duration (zero for wheel clicks); the
    /// store applies the sanity bound.
    Key { key: Key, held: Duration },
    /// A completed combo, timestamped for chord linking.
    Combo { combo: KeyCombo, at: DateTime<Utc> },
    KeyboardUse { seconds: f64 },
    MouseUse { seconds: f64 },
    /// Absolute per-axis travel, Euclidean distance, and the same three
    /// normalized by the virtual desktop size.
    MouseTravel {
        dx: i64,
        dy: i64,
        distance: f64,
        screens_x: f64,
        screens_y: f64,
        screens: f64,
    },
}

/// The per-key down-tracking and modifier bookkeeping state machine.
///
/// Owned exclusively by the event-delivery path; needs no lock.
pub struct InputClassifier {
    down: [bool; KEY_SPACE],
    down_at: [Option<DateTime<Utc>>; KEY_SPACE],
    /// Set while the most recent new press was a modifier that has not yet
    /// been folded into any combo.
    last_pressed_modifier: Option<Key>,
    last_keyboard_use: Option<DateTime<Utc>>,
    last_mouse_use: Option<DateTime<Utc>>,
    last_position: Option<(i32, i32)>,
    screen: Box<dyn ScreenProbe>,
    screen_size: (i32, i32),
    screen_probed_at: Option<DateTime<Utc>>,
}

impl InputClassifier {
    pub fn new(screen: Box<dyn ScreenProbe>) -> Self {
        Self {
            down: [false; KEY_SPACE],
            down_at: [None; KEY_SPACE],
            last_pressed_modifier: None,
            last_keyboard_use: None,
            last_mouse_use: None,
            last_position: None,
            screen,
            screen_size: (0, 0),
            screen_probed_at: None,
        }
    }

    /// Classify one raw event. Events must be delivered in occurrence
    /// order; codes outside the key space are dropped (the hook layer is
    /// responsible for filtering them).
    pub fn process(&mut self, event: &InputEvent) -> Vec<Observation> {
        match *event {
            InputEvent::KeyDown { code, at } => match Key::from_code(code) {
                Some(key) => self.on_key_down(key, at),
                None => {
                    log::debug!("dropping out-of-range key code {code}");
                    Vec::new()
                }
            },
            InputEvent::KeyUp { code, at } => match Key::from_code(code) {
                Some(key) => self.on_key_up(key, at),
                None => {
                    log::debug!("dropping out-of-range key code {code}");
                    Vec::new()
                }
            },
            InputEvent::MouseMove { x, y, at } => self.on_mouse_move(x, y, at),
            InputEvent::MouseWheel { axis, clicks, at } => self.on_wheel(axis, clicks, at),
        }
    }

    fn on_key_down(&mut self, key: Key, at: DateTime<Utc>) -> Vec<Observation> {
        let mut out = Vec::new();
        self.record_use(key.is_mouse_button(), at, &mut out);

        let idx = key.code() as usize;
        if !self.down[idx] {
            // A genuinely new press; OS auto-repeats re-deliver KeyDown for
            // an already-down key and must not disturb any state.
            self.down_at[idx] = Some(at);
            if key.is_modifier_key() {
                self.last_pressed_modifier = Some(key);
            } else {
                self.last_pressed_modifier = None;
                let combo = KeyCombo::capture(key, |k| self.down[k.code() as usize]);
                out.push(Observation::Combo { combo, at });
            }
        }
        self.down[idx] = true;
        out
    }

    fn on_key_up(&mut self, key: Key, at: DateTime<Utc>) -> Vec<Observation> {
        let mut out = Vec::new();
        self.record_use(key.is_mouse_button(), at, &mut out);

        // A modifier was pressed after the last combo and nothing completed
        // it; this release breaks the streak, so emit the bare-modifier
        // combo now, while the released key still reads as down.
        let consumed = self.last_pressed_modifier.take();
        if let Some(modifier) = consumed {
            let combo = KeyCombo::capture(modifier, |k| self.down[k.code() as usize]);
            out.push(Observation::Combo { combo, at });
        }

        let idx = key.code() as usize;
        if self.down[idx] {
            self.down[idx] = false;
            if let Some(pressed_at) = self.down_at[idx] {
                out.push(Observation::Key {
                    key,
                    held: at - pressed_at,
                });
            }
            // If this release just emitted a bare-modifier combo and a
            // multi-modifier hold survives it, the remaining pair is a
            // gesture of its own that still has to be emitted once its own
            // streak breaks. Re-arm on the most recent of them. A release
            // whose pending state was already consumed by a non-modifier
            // combo must not re-arm anything.
            if key.is_modifier_key() && consumed.is_some() {
                let mut held: Vec<Key> = MODIFIER_ORDER
                    .iter()
                    .map(|(m, _)| *m)
                    .filter(|m| self.down[m.code() as usize])
                    .collect();
                if held.len() >= 2 {
                    held.sort_by_key(|m| self.down_at[m.code() as usize]);
                    self.last_pressed_modifier = held.last().copied();
                }
            }
        }
        out
    }

    fn on_mouse_move(&mut self, x: i32, y: i32, at: DateTime<Utc>) -> Vec<Observation> {
        let mut out = Vec::new();
        self.record_use(true, at, &mut out);
        self.refresh_screen(at);

        if let Some((px, py)) = self.last_position {
            let dx = i64::from(x - px).abs();
            let dy = i64::from(y - py).abs();
            let distance = ((dx * dx + dy * dy) as f64).sqrt();
            let (w, h) = self.screen_size;
            let screens_x = dx as f64 / f64::from(w.max(1));
            let screens_y = dy as f64 / f64::from(h.max(1));
            let screens = (screens_x * screens_x + screens_y * screens_y).sqrt();
            out.push(Observation::MouseTravel {
                dx,
                dy,
                distance,
                screens_x,
                screens_y,
                screens,
            });
        }
        self.last_position = Some((x, y));
        out
    }

    fn on_wheel(&mut self, axis: WheelAxis, clicks: i32, at: DateTime<Utc>) -> Vec<Observation> {
        let mut out = Vec::new();
        if clicks == 0 {
            return out;
        }
        self.record_use(true, at, &mut out);

        let key = match (axis, clicks > 0) {
            (WheelAxis::Vertical, true) => Key::MOUSE_WHEEL_UP,
            (WheelAxis::Vertical, false) => Key::MOUSE_WHEEL_DOWN,
            (WheelAxis::Horizontal, true) => Key::MOUSE_WHEEL_RIGHT,
            (WheelAxis::Horizontal, false) => Key::MOUSE_WHEEL_LEFT,
        };

        // Wheel events have no natural release, so each click is a complete
        // gesture: a zero-duration key occurrence and an immediate combo.
        self.last_pressed_modifier = None;
        for _ in 0..clicks.unsigned_abs() {
            out.push(Observation::Key {
                key,
                held: Duration::zero(),
            });
            let combo = KeyCombo::capture(key, |k| self.down[k.code() as usize]);
            out.push(Observation::Combo { combo, at });
        }
        out
    }

    /// Use-sample rule, shared by the keyboard and mouse clocks: the first
    /// event only arms the clock; afterwards a gap within the cutoff counts
    /// in full, anything longer (or a clock anomaly) earns a fixed resume
    /// credit.
    fn record_use(&mut self, mouse: bool, at: DateTime<Utc>, out: &mut Vec<Observation>) {
        let clock = if mouse {
            &mut self.last_mouse_use
        } else {
            &mut self.last_keyboard_use
        };
        if let Some(prev) = *clock {
            let delta_ms = (at - prev).num_milliseconds();
            let seconds = if (0..=USE_GAP_CUTOFF_MS).contains(&delta_ms) {
                delta_ms as f64 / 1000.0
            } else {
                RESUME_CREDIT_SECS
            };
            out.push(if mouse {
                Observation::MouseUse { seconds }
            } else {
                Observation::KeyboardUse { seconds }
            });
        }
        *clock = Some(at);
    }

    fn refresh_screen(&mut self, at: DateTime<Utc>) {
        let stale = match self.screen_probed_at {
            None => true,
            Some(probed) => (at - probed).num_milliseconds() >= SCREEN_REFRESH_MS,
        };
        if stale {
            self.screen_size = self.screen.virtual_size();
            self.screen_probed_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::FixedScreen;
    use crate::core::combo::ModifierSet;

    fn classifier() -> InputClassifier {
        InputClassifier::new(Box::new(FixedScreen::new(1920, 1080)))
    }

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

    fn combos(observations: &[Observation]) -> Vec<KeyCombo> {
        observations
            .iter()
            .filter_map(|o| match o {
                Observation::Combo { combo, .. } => Some(*combo),
                _ => None,
            })
            .collect()
    }

    fn run(classifier: &mut InputClassifier, events: &[InputEvent]) -> Vec<Observation> {
        events
            .iter()
            .flat_map(|e| classifier.process(e))
            .collect()
    }

    fn combo(key: Key, modifiers: &[Key]) -> KeyCombo {
        let mut set = ModifierSet::EMPTY;
        for m in modifiers {
            set.insert(*m);
        }
        KeyCombo::new(key, set)
    }

    #[test]
    fn test_shift_h_emits_single_combo() {
        // Scenario A: LShift down, H down, H up, LShift up.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::LSHIFT, 0),
                down(Key::H, 100),
                up(Key::H, 200),
                up(Key::LSHIFT, 300),
            ],
        );
        assert_eq!(combos(&out), vec![combo(Key::H, &[Key::LSHIFT])]);
    }

    #[test]
    fn test_bare_modifier_chord_emitted_once() {
        // Scenario B: Alt down, Shift down, Shift up, Alt up.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::ALT, 0),
                down(Key::SHIFT, 100),
                up(Key::SHIFT, 200),
                up(Key::ALT, 300),
            ],
        );
        assert_eq!(combos(&out), vec![combo(Key::SHIFT, &[Key::ALT])]);
    }

    #[test]
    fn test_bare_modifier_chord_release_order_reversed() {
        // Alt down, Shift down, Alt up first, then Shift up: still one combo.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::ALT, 0),
                down(Key::SHIFT, 100),
                up(Key::ALT, 200),
                up(Key::SHIFT, 300),
            ],
        );
        assert_eq!(combos(&out), vec![combo(Key::SHIFT, &[Key::ALT])]);
    }

    #[test]
    fn test_three_modifier_hold_emits_remaining_pair() {
        // Scenario C: Ctrl, Alt, Shift pressed; Alt released first emits
        // Ctrl+Alt+Shift; releasing Ctrl then Shift emits Ctrl+Shift once.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::CTRL, 0),
                down(Key::ALT, 100),
                down(Key::SHIFT, 200),
                up(Key::ALT, 300),
                up(Key::CTRL, 400),
                up(Key::SHIFT, 500),
            ],
        );
        assert_eq!(
            combos(&out),
            vec![
                combo(Key::SHIFT, &[Key::CTRL, Key::ALT]),
                combo(Key::SHIFT, &[Key::CTRL]),
            ]
        );
    }

    #[test]
    fn test_no_reemission_after_completed_combo() {
        // Ctrl+Shift+C: the combo completes at C's press; releasing the
        // modifiers afterwards, in any order, emits nothing further.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::LCTRL, 0),
                down(Key::LSHIFT, 100),
                down(Key::C, 200),
                up(Key::C, 300),
                up(Key::LCTRL, 400),
                up(Key::LSHIFT, 500),
            ],
        );
        assert_eq!(
            combos(&out),
            vec![combo(Key::C, &[Key::LCTRL, Key::LSHIFT])]
        );
    }

    #[test]
    fn test_no_reemission_after_combo_with_three_modifiers() {
        // LCtrl+LAlt+LShift+C completes at C's press. Releasing C then the
        // modifiers one by one leaves pairs of modifiers held along the
        // way, but none of those releases may produce another combo.
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::LCTRL, 0),
                down(Key::LALT, 100),
                down(Key::LSHIFT, 200),
                down(Key::C, 300),
                up(Key::C, 400),
                up(Key::LALT, 500),
                up(Key::LCTRL, 600),
                up(Key::LSHIFT, 700),
            ],
        );
        assert_eq!(
            combos(&out),
            vec![combo(Key::C, &[Key::LCTRL, Key::LALT, Key::LSHIFT])]
        );
    }

    #[test]
    fn test_auto_repeat_is_idempotent() {
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::A, 0),
                down(Key::A, 30),
                down(Key::A, 60),
                up(Key::A, 500),
            ],
        );
        assert_eq!(combos(&out).len(), 1);
        // The held duration spans from the first press, not a repeat.
        let held: Vec<Duration> = out
            .iter()
            .filter_map(|o| match o {
                Observation::Key { held, .. } => Some(*held),
                _ => None,
            })
            .collect();
        assert_eq!(held, vec![Duration::milliseconds(500)]);
    }

    #[test]
    fn test_up_without_down_reports_no_occurrence() {
        let mut c = classifier();
        let out = run(&mut c, &[up(Key::A, 0)]);
        assert!(!out
            .iter()
            .any(|o| matches!(o, Observation::Key { .. } | Observation::Combo { .. })));
    }

    #[test]
    fn test_use_sample_cutoff() {
        let mut c = classifier();
        // First event arms the clock, no sample.
        let out = run(&mut c, &[down(Key::A, 0)]);
        assert!(!out
            .iter()
            .any(|o| matches!(o, Observation::KeyboardUse { .. })));

        // 12.0s gap counts in full.
        let out = c.process(&up(Key::A, 12_000));
        assert!(out
            .iter()
            .any(|o| matches!(o, Observation::KeyboardUse { seconds } if *seconds == 12.0)));

        // 12.1s gap earns the 1s resume credit instead.
        let out = c.process(&down(Key::A, 24_100));
        assert!(out
            .iter()
            .any(|o| matches!(o, Observation::KeyboardUse { seconds } if *seconds == 1.0)));
    }

    #[test]
    fn test_mouse_and_keyboard_clocks_are_independent() {
        let mut c = classifier();
        c.process(&down(Key::A, 0));
        let out = c.process(&down(Key::MOUSE_LEFT, 5_000));
        // First mouse-use event only arms the mouse clock.
        assert!(!out.iter().any(|o| matches!(o, Observation::MouseUse { .. })));
        let out = c.process(&up(Key::MOUSE_LEFT, 6_000));
        assert!(out
            .iter()
            .any(|o| matches!(o, Observation::MouseUse { seconds } if *seconds == 1.0)));
    }

    #[test]
    fn test_mouse_move_travel() {
        let mut c = classifier();
        let first = c.process(&InputEvent::MouseMove {
            x: 100,
            y: 100,
            at: at(0),
        });
        // First sample establishes position only.
        assert!(!first
            .iter()
            .any(|o| matches!(o, Observation::MouseTravel { .. })));

        let out = c.process(&InputEvent::MouseMove {
            x: 103,
            y: 96,
            at: at(100),
        });
        let travel = out
            .iter()
            .find_map(|o| match o {
                Observation::MouseTravel {
                    dx, dy, distance, ..
                } => Some((*dx, *dy, *distance)),
                _ => None,
            })
            .expect("travel observation");
        assert_eq!(travel.0, 3);
        assert_eq!(travel.1, 4);
        assert!((travel.2 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_emits_key_and_combo_per_click() {
        let mut c = classifier();
        let out = c.process(&InputEvent::MouseWheel {
            axis: WheelAxis::Vertical,
            clicks: -2,
            at: at(0),
        });
        let keys: Vec<Key> = out
            .iter()
            .filter_map(|o| match o {
                Observation::Key { key, held } => {
                    assert!(held.is_zero());
                    Some(*key)
                }
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![Key::MOUSE_WHEEL_DOWN, Key::MOUSE_WHEEL_DOWN]);
        assert_eq!(combos(&out).len(), 2);
    }

    #[test]
    fn test_wheel_carries_held_modifiers() {
        let mut c = classifier();
        c.process(&down(Key::LCTRL, 0));
        let out = c.process(&InputEvent::MouseWheel {
            axis: WheelAxis::Vertical,
            clicks: 1,
            at: at(100),
        });
        assert_eq!(
            combos(&out),
            vec![combo(Key::MOUSE_WHEEL_UP, &[Key::LCTRL])]
        );
        // The pending-modifier state was consumed; releasing Ctrl alone
        // afterwards emits nothing.
        let out = c.process(&up(Key::LCTRL, 200));
        assert!(combos(&out).is_empty());
    }

    #[test]
    fn test_multiple_modifiers_fold_into_combo() {
        let mut c = classifier();
        let out = run(
            &mut c,
            &[
                down(Key::LWIN, 0),
                down(Key::LSHIFT, 50),
                down(Key::LEFT, 100),
            ],
        );
        assert_eq!(
            combos(&out),
            vec![combo(Key::LEFT, &[Key::LWIN, Key::LSHIFT])]
        );
    }
}

//! Combo and chord value types.
//!
//! A [`KeyCombo`] is one primary key plus the set of modifier identities
//! held when it completed; a [`KeyChord`] is an ordered sequence of combos
//! linked in quick succession. Both are immutable, structurally hashable
//! map keys with a round-trippable text encoding: modifiers serialize by
//! name and the primary key by numeric code, joined with `+`; chords join
//! combo encodings with `,`.

use std::fmt;

use crate::core::key::Key;
use crate::core::ParseError;

/// The 11 modifier identities in canonical display/serialization order.
pub const MODIFIER_ORDER: [(Key, &str); 11] = [
    (Key::LWIN, "LWin"),
    (Key::RWIN, "RWin"),
    (Key::LCTRL, "LCtrl"),
    (Key::RCTRL, "RCtrl"),
    (Key::CTRL, "Ctrl"),
    (Key::LALT, "LAlt"),
    (Key::RALT, "RAlt"),
    (Key::ALT, "Alt"),
    (Key::LSHIFT, "LShift"),
    (Key::RSHIFT, "RShift"),
    (Key::SHIFT, "Shift"),
];

/// A set of modifier identities, stored as a bitmask over
/// [`MODIFIER_ORDER`]. Derived equality/hash give order-independent set
/// semantics; iteration is always in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierSet(u16);

impl ModifierSet {
    pub const EMPTY: ModifierSet = ModifierSet(0);

    fn bit_of(key: Key) -> Option<u16> {
        MODIFIER_ORDER
            .iter()
            .position(|(m, _)| *m == key)
            .map(|i| 1 << i)
    }

    /// Add a modifier identity. Non-modifier keys are ignored.
    pub fn insert(&mut self, key: Key) {
        if let Some(bit) = Self::bit_of(key) {
            self.0 |= bit;
        }
    }

    /// Remove a modifier identity.
    pub fn remove(&mut self, key: Key) {
        if let Some(bit) = Self::bit_of(key) {
            self.0 &= !bit;
        }
    }

    pub fn contains(self, key: Key) -> bool {
        Self::bit_of(key).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Member identities with their display names, in canonical order.
    pub fn iter(self) -> impl Iterator<Item = (Key, &'static str)> {
        MODIFIER_ORDER
            .into_iter()
            .enumerate()
            .filter(move |(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, entry)| entry)
    }

    fn from_name(name: &str) -> Option<Key> {
        MODIFIER_ORDER
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(m, _)| *m)
    }
}

/// One non-modifier key (or a modifier pressed alone) together with the
/// modifier identities concurrently held.
///
/// Invariant: a combo never marks its primary key as its own modifier.
/// Every constructor strips the primary key's identity from the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    key: Key,
    modifiers: ModifierSet,
}

impl KeyCombo {
    pub fn new(key: Key, mut modifiers: ModifierSet) -> Self {
        modifiers.remove(key);
        Self { key, modifiers }
    }

    /// Capture a combo from the live down-state at the moment `key`'s
    /// gesture completed. `key`'s own identity is always excluded, even if
    /// the down-state reports it held.
    pub fn capture(key: Key, is_down: impl Fn(Key) -> bool) -> Self {
        let mut modifiers = ModifierSet::EMPTY;
        for (modifier, _) in MODIFIER_ORDER {
            if modifier != key && is_down(modifier) {
                modifiers.insert(modifier);
            }
        }
        Self { key, modifiers }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    /// Round-trippable encoding: modifier names then the numeric key code,
    /// joined with `+`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (_, name) in self.modifiers.iter() {
            out.push_str(name);
            out.push('+');
        }
        out.push_str(&self.key.code().to_string());
        out
    }

    /// Inverse of [`KeyCombo::encode`].
    pub fn decode(s: &str) -> Result<KeyCombo, ParseError> {
        let mut parts = s.split('+').collect::<Vec<_>>();
        let key_part = parts.pop().ok_or(ParseError::EmptyCombo)?;
        if key_part.is_empty() && parts.is_empty() {
            return Err(ParseError::EmptyCombo);
        }
        let key: Key = key_part.parse()?;
        let mut modifiers = ModifierSet::EMPTY;
        for part in parts {
            let modifier = ModifierSet::from_name(part)
                .ok_or_else(|| ParseError::BadModifier(part.to_string()))?;
            modifiers.insert(modifier);
        }
        Ok(KeyCombo::new(key, modifiers))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, name) in self.modifiers.iter() {
            write!(f, "{name}+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// An ordered sequence of combos completed in quick succession (length 2 in
/// practice). Equality and hashing are element-wise over the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord(Vec<KeyCombo>);

impl KeyChord {
    pub fn pair(first: KeyCombo, second: KeyCombo) -> Self {
        Self(vec![first, second])
    }

    pub fn from_combos(combos: Vec<KeyCombo>) -> Self {
        Self(combos)
    }

    pub fn combos(&self) -> &[KeyCombo] {
        &self.0
    }

    /// Combo encodings joined with `,` — a separator that never occurs
    /// inside a combo encoding.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(KeyCombo::encode)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Inverse of [`KeyChord::encode`].
    pub fn decode(s: &str) -> Result<KeyChord, ParseError> {
        let combos = s
            .split(',')
            .map(KeyCombo::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(combos))
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, combo) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{combo}")?;
        }
        Ok(())
    }
}

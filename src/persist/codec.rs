//! Line-oriented text codec for the statistics store.
//!
//! Each line is `Tag,value` for scalars or `Tag,count,encoded-key` for
//! counter maps. Chord encodings contain commas themselves, so map lines
//! split into at most three columns and the remainder is the key. Unknown
//! tags are skipped on load (a newer build may have written them); any
//! malformed line with a known tag aborts the load, and
//! [`load_or_default`] quarantines the file rather than silently dropping
//! user data.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::combo::{KeyChord, KeyCombo};
use crate::core::key::Key;
use crate::core::stats::StatisticsStore;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

fn malformed(line: usize, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        line,
        reason: reason.into(),
    }
}

/// Serialize the store. The inverse of [`decode`]; map iteration order is
/// unspecified, so two encodings of the same store may differ line-for-line
/// while decoding to equal stores.
pub fn encode(store: &StatisticsStore) -> String {
    let mut out = String::new();
    out.push_str(&format!("RuntimeMinutes,{}\n", store.runtime_minutes));
    out.push_str(&format!(
        "KeyboardUseSeconds,{}\n",
        store.keyboard_use_seconds
    ));
    out.push_str(&format!("MouseUseSeconds,{}\n", store.mouse_use_seconds));
    out.push_str(&format!("MouseTravelX,{}\n", store.mouse_travel_x));
    out.push_str(&format!("MouseTravelY,{}\n", store.mouse_travel_y));
    out.push_str(&format!("MouseTravel,{}\n", store.mouse_travel));
    out.push_str(&format!(
        "MouseTravelScreensX,{}\n",
        store.mouse_travel_screens_x
    ));
    out.push_str(&format!(
        "MouseTravelScreensY,{}\n",
        store.mouse_travel_screens_y
    ));
    out.push_str(&format!(
        "MouseTravelScreens,{}\n",
        store.mouse_travel_screens
    ));
    for (key, count) in &store.key_counts {
        out.push_str(&format!("KeyCounts,{},{}\n", count, key.code()));
    }
    for (combo, count) in &store.combo_counts {
        out.push_str(&format!("ComboCounts,{},{}\n", count, combo.encode()));
    }
    for (chord, count) in &store.chord_counts {
        out.push_str(&format!("ChordCounts,{},{}\n", count, chord.encode()));
    }
    for (key, seconds) in &store.down_for {
        out.push_str(&format!("DownFor,{},{}\n", seconds, key.code()));
    }
    out
}

/// Parse an encoding produced by [`encode`]. Blank lines and unknown tags
/// are skipped; anything else malformed is an error.
pub fn decode(text: &str) -> Result<StatisticsStore, DecodeError> {
    let mut store = StatisticsStore::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.splitn(3, ',');
        let tag = cols.next().unwrap_or_default();
        let second = cols.next();
        let third = cols.next();

        match tag {
            "RuntimeMinutes" => {
                store.runtime_minutes = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "KeyboardUseSeconds" => {
                store.keyboard_use_seconds =
                    parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseUseSeconds" => {
                store.mouse_use_seconds =
                    parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravelX" => {
                store.mouse_travel_x = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravelY" => {
                store.mouse_travel_y = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravel" => {
                store.mouse_travel = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravelScreensX" => {
                store.mouse_travel_screens_x =
                    parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravelScreensY" => {
                store.mouse_travel_screens_y =
                    parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "MouseTravelScreens" => {
                store.mouse_travel_screens =
                    parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
            }
            "KeyCounts" => {
                let count: u64 = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
                let key = parse_key(line_no, require(third, line_no, tag)?)?;
                *store.key_counts.entry(key).or_default() += count;
            }
            "ComboCounts" => {
                let count: u64 = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
                let combo = KeyCombo::decode(require(third, line_no, tag)?)
                    .map_err(|e| malformed(line_no, e.to_string()))?;
                *store.combo_counts.entry(combo).or_default() += count;
            }
            "ChordCounts" => {
                let count: u64 = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
                let chord = KeyChord::decode(require(third, line_no, tag)?)
                    .map_err(|e| malformed(line_no, e.to_string()))?;
                *store.chord_counts.entry(chord).or_default() += count;
            }
            "DownFor" => {
                let seconds: f64 = parse_scalar(line_no, tag, require(second, line_no, tag)?)?;
                let key = parse_key(line_no, require(third, line_no, tag)?)?;
                *store.down_for.entry(key).or_default() += seconds;
            }
            // Forward compatibility: lines from a newer build.
            _ => continue,
        }
    }
    Ok(store)
}

fn require<'a>(field: Option<&'a str>, line: usize, tag: &str) -> Result<&'a str, DecodeError> {
    field.ok_or_else(|| malformed(line, format!("{tag}: missing value")))
}

fn parse_scalar<T: std::str::FromStr>(
    line: usize,
    tag: &str,
    text: &str,
) -> Result<T, DecodeError> {
    text.parse()
        .map_err(|_| malformed(line, format!("{tag}: bad value `{text}`")))
}

fn parse_key(line: usize, text: &str) -> Result<Key, DecodeError> {
    text.parse()
        .map_err(|_| malformed(line, format!("bad key code `{text}`")))
}

/// Write the store to `path`, creating parent directories as needed.
pub fn save(path: &Path, store: &StatisticsStore) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode(store))
}

/// Load the store from `path`. A missing file yields a fresh store. A file
/// that fails to decode is moved aside to `<name>.bad-N` (never deleted,
/// so it can be inspected or repaired) and a fresh store is returned.
pub fn load_or_default(path: &Path) -> StatisticsStore {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return StatisticsStore::new(),
        Err(e) => {
            log::warn!("failed to read {}: {e}", path.display());
            return StatisticsStore::new();
        }
    };
    match decode(&text) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("corrupt store file {}: {e}", path.display());
            match quarantine(path) {
                Ok(dest) => log::warn!("quarantined to {}", dest.display()),
                Err(e) => log::warn!("failed to quarantine {}: {e}", path.display()),
            }
            StatisticsStore::new()
        }
    }
}

fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    for n in 1u32.. {
        let dest = path.with_file_name(format!("{file_name}.bad-{n}"));
        if !dest.exists() {
            fs::rename(path, &dest)?;
            return Ok(dest);
        }
    }
    unreachable!()
}

//! Store persistence: the line codec plus load/save with
//! quarantine-on-corruption recovery.

pub mod codec;

pub use codec::{decode, encode, load_or_default, save, DecodeError};

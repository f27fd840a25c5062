//! Music theory engine: chord symbols, transposition, key distance and capo math.
//!
//! Everything here is pure and stateless. Strict operations return
//! [`TheoryError`]; lenient ones fall back to a safe default and log why at
//! debug level.

pub mod chord;
pub mod extract;
pub mod key;
pub mod pitch;
pub mod transpose;

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub use chord::{ParsedChord, chord_intervals, is_valid_chord, parse_chord};
pub use extract::{TextTransposition, extract_chords, transpose_text};
pub use key::{capo_effective_key, key_root, key_semitone_distance, suggest_capo_position};
pub use pitch::{CHROMATIC_SCALE, PitchClass, normalize_flats};
pub use transpose::{transpose_chord, transpose_note, transpose_progression};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TheoryError {
    #[error("Invalid chord: {0}")]
    InvalidChord(String),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, TheoryError>;

// Root spelling at the start of an already flat-normalized symbol: letter + optional sharp.
// E# and B# match here and are rejected later by the chromatic lookup.
static ROOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-G]#?").unwrap());

/// Leading root spelling of a flat-normalized chord or key, if any.
pub(crate) fn leading_root(normalized: &str) -> Option<&str> {
    ROOT_RE.find(normalized).map(|m| m.as_str())
}

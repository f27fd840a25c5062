use std::fmt;
use std::str::FromStr;

use super::TheoryError;

/// The twelve pitch classes, sharp spellings, starting from C.
pub const CHROMATIC_SCALE: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings accepted at the boundary and their sharp equivalents.
const FLAT_TO_SHARP: [(&str, &str); 5] = [
    ("Db", "C#"),
    ("Eb", "D#"),
    ("Gb", "F#"),
    ("Ab", "G#"),
    ("Bb", "A#"),
];

/// Rewrite every flat spelling in `text` to its sharp equivalent.
///
/// Plain substring substitution: `"Ebm7/Bb"` becomes `"D#m7/A#"`. Spellings
/// outside the table (`Cb`, `Fb`) are left alone.
pub fn normalize_flats(text: &str) -> String {
    let mut out = text.to_string();
    for (flat, sharp) in FLAT_TO_SHARP {
        if out.contains(flat) {
            out = out.replace(flat, sharp);
        }
    }
    out
}

/// One of the twelve chromatic pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Look up a spelling, accepting flats. Returns `None` for anything that
    /// isn't exactly one of the twelve names after normalization.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize_flats(name);
        CHROMATIC_SCALE
            .iter()
            .position(|&n| n == normalized)
            .map(|i| Self(i as u8))
    }

    /// Position on the chromatic circle, 0 = C.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Canonical sharp spelling.
    pub fn name(self) -> &'static str {
        CHROMATIC_SCALE[self.0 as usize]
    }

    /// Move by `semitones` (negative = down), wrapping around the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        // Reduce first so extreme offsets can't overflow
        Self((self.0 as i32 + semitones.rem_euclid(12)).rem_euclid(12) as u8)
    }

    /// Semitones from `self` up to `other`, in 0..12.
    pub fn interval_to(self, other: Self) -> u8 {
        (other.0 as i32 - self.0 as i32).rem_euclid(12) as u8
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| TheoryError::InvalidNote(normalize_flats(s)))
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theory::PitchClass;

/// Strings on a guitar, and entries expected in a diagram.
pub const STRING_COUNT: usize = 6;

/// Open strings, low to high.
pub const STANDARD_TUNING: [&str; STRING_COUNT] = ["E", "A", "D", "G", "B", "E"];

/// Fret value for a string that isn't played.
pub const MUTED: i32 = -1;

const MAX_NAME_LEN: usize = 50;
const MAX_FINGER: u8 = 4;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Chord name is required")]
    EmptyName,
    #[error("Chord name must be at most 50 characters long (got {0})")]
    NameTooLong(usize),
    #[error("{field} must have 6 entries (one per string), got {count}")]
    WrongStringCount { field: &'static str, count: usize },
    #[error("Fret {fret} on string {string} is out of range (-1 to {max})")]
    FretOutOfRange { string: usize, fret: i32, max: i32 },
    #[error("Starting fret {fret} is out of range (1 to {max})")]
    StartingFretOutOfRange { fret: i32, max: i32 },
    #[error("Finger {finger} on string {string} is out of range (0 to 4)")]
    FingerOutOfRange { string: usize, finger: u8 },
    #[error("Invalid root note: {0}")]
    InvalidRoot(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_starting_fret() -> i32 {
    1
}

/// A user-defined chord shape for a six-string guitar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordDiagram {
    pub name: String,
    pub root_note: String,
    pub chord_type: String,
    /// Absolute fret per string, low E first. 0 = open, -1 = muted.
    pub fret_positions: Vec<i32>,
    /// Fretting finger per string (1-4), 0 for open or muted.
    #[serde(default)]
    pub finger_positions: Option<Vec<u8>>,
    #[serde(default = "default_starting_fret")]
    pub starting_fret: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub is_barre_chord: bool,
    #[serde(default)]
    pub alternative_names: Option<Vec<String>>,
}

impl ChordDiagram {
    /// Parse a diagram from JSON and validate it.
    pub fn from_json(json: &str, max_fret: i32) -> Result<Self, DiagramError> {
        let mut diagram: ChordDiagram = serde_json::from_str(json)?;
        diagram.name = diagram.name.trim().to_string();
        diagram.validate(max_fret)?;
        Ok(diagram)
    }

    pub fn validate(&self, max_fret: i32) -> Result<(), DiagramError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DiagramError::EmptyName);
        }
        let name_len = name.chars().count();
        if name_len > MAX_NAME_LEN {
            return Err(DiagramError::NameTooLong(name_len));
        }

        if PitchClass::from_name(self.root_note.trim()).is_none() {
            return Err(DiagramError::InvalidRoot(self.root_note.clone()));
        }

        if self.fret_positions.len() != STRING_COUNT {
            return Err(DiagramError::WrongStringCount {
                field: "fret_positions",
                count: self.fret_positions.len(),
            });
        }
        for (i, &fret) in self.fret_positions.iter().enumerate() {
            if !(MUTED..=max_fret).contains(&fret) {
                return Err(DiagramError::FretOutOfRange {
                    string: i + 1,
                    fret,
                    max: max_fret,
                });
            }
        }

        if !(1..=max_fret).contains(&self.starting_fret) {
            return Err(DiagramError::StartingFretOutOfRange {
                fret: self.starting_fret,
                max: max_fret,
            });
        }

        if let Some(fingers) = &self.finger_positions {
            if fingers.len() != STRING_COUNT {
                return Err(DiagramError::WrongStringCount {
                    field: "finger_positions",
                    count: fingers.len(),
                });
            }
            if let Some((i, &finger)) = fingers.iter().enumerate().find(|(_, f)| **f > MAX_FINGER) {
                return Err(DiagramError::FingerOutOfRange { string: i + 1, finger });
            }
        }

        Ok(())
    }

    /// Pitch class sounded by each string in standard tuning; `None` for muted strings.
    pub fn sounding_notes(&self) -> Vec<Option<PitchClass>> {
        STANDARD_TUNING
            .iter()
            .zip(&self.fret_positions)
            .map(|(open, &fret)| {
                if fret == MUTED {
                    None
                } else {
                    PitchClass::from_name(open).map(|p| p.transpose(fret))
                }
            })
            .collect()
    }
}

//! Request/response layer over the theory engine.
//!
//! One function per chord tool a client can call. Strict failures (bad key,
//! bad chord names) reject the whole request with a [`ServiceError`]; lenient
//! ones (capo suggestion, extraction) always answer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theory::{self, ParsedChord, TheoryError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid chord names: {}", .0.join(", "))]
    InvalidChords(Vec<String>),
    #[error("{0}")]
    Theory(#[from] TheoryError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, Deserialize)]
pub struct TransposeRequest {
    pub chords: Vec<String>,
    pub semitones: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransposeResponse {
    pub original_chords: Vec<String>,
    pub transposed_chords: Vec<String>,
    pub semitones: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyChangeRequest {
    pub original_key: String,
    pub target_key: String,
    pub chords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyChangeResponse {
    pub original_key: String,
    pub target_key: String,
    pub semitones: i32,
    pub original_chords: Vec<String>,
    pub transposed_chords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CapoSuggestionRequest {
    pub original_key: String,
    pub target_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapoSuggestionResponse {
    pub original_key: String,
    pub target_key: String,
    pub capo_fret: Option<u8>,
    pub effective_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LyricsTransposeRequest {
    pub lyrics_and_chords: String,
    pub semitones: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricsTransposeResponse {
    pub original_text: String,
    pub transposed_text: String,
    pub chords_found: Vec<String>,
    pub transposed_chords: Vec<String>,
}

/// Validity of a single chord name, with its breakdown when valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordValidation {
    pub chord: String,
    pub is_valid: bool,
    #[serde(flatten)]
    pub parsed: Option<ParsedChord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervals: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordExtraction {
    pub text: String,
    pub chords_found: Vec<String>,
    pub chord_count: usize,
}

fn reject_invalid_chords(chords: &[String]) -> Result<()> {
    let invalid: Vec<String> = chords
        .iter()
        .filter(|c| !theory::is_valid_chord(c))
        .cloned()
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        log::info!("Rejecting request with {} invalid chord(s)", invalid.len());
        Err(ServiceError::InvalidChords(invalid))
    }
}

/// Transpose a list of chords by a fixed number of semitones.
pub fn transpose_chords(request: TransposeRequest) -> Result<TransposeResponse> {
    reject_invalid_chords(&request.chords)?;

    let transposed_chords = theory::transpose_progression(&request.chords, request.semitones);
    Ok(TransposeResponse {
        original_chords: request.chords,
        transposed_chords,
        semitones: request.semitones,
    })
}

/// Move a list of chords from one key to another along the shortest path.
pub fn change_key(request: KeyChangeRequest) -> Result<KeyChangeResponse> {
    let semitones = theory::key_semitone_distance(&request.original_key, &request.target_key)?;
    reject_invalid_chords(&request.chords)?;

    let transposed_chords = theory::transpose_progression(&request.chords, semitones);
    Ok(KeyChangeResponse {
        original_key: request.original_key,
        target_key: request.target_key,
        semitones,
        original_chords: request.chords,
        transposed_chords,
    })
}

/// Suggest a capo fret for playing in `target_key`. "No suggestion" is a
/// normal answer, not an error.
pub fn capo_suggestion(request: CapoSuggestionRequest) -> CapoSuggestionResponse {
    let capo_fret = theory::suggest_capo_position(&request.original_key, &request.target_key);

    let effective_key = capo_fret.and_then(|fret| {
        theory::capo_effective_key(&request.original_key, fret)
            .inspect_err(|e| log::debug!("No effective key: {e}"))
            .ok()
    });

    CapoSuggestionResponse {
        original_key: request.original_key,
        target_key: request.target_key,
        capo_fret,
        effective_key,
    }
}

/// Transpose the chords embedded in a chords-over-lyrics text.
pub fn transpose_lyrics(request: LyricsTransposeRequest) -> LyricsTransposeResponse {
    let result = theory::transpose_text(&request.lyrics_and_chords, request.semitones);

    LyricsTransposeResponse {
        original_text: request.lyrics_and_chords,
        transposed_text: result.text,
        chords_found: result.chords_found,
        transposed_chords: result.transposed_chords,
    }
}

pub fn validate_chord(chord: &str) -> ChordValidation {
    let is_valid = theory::is_valid_chord(chord);

    let (parsed, intervals) = if is_valid {
        (
            theory::parse_chord(chord).ok(),
            Some(theory::chord_intervals(chord).to_vec()),
        )
    } else {
        (None, None)
    };

    ChordValidation {
        chord: chord.to_string(),
        is_valid,
        parsed,
        intervals,
    }
}

pub fn extract_chords(text: &str) -> ChordExtraction {
    let chords_found: Vec<String> = theory::extract_chords(text).into_iter().collect();

    ChordExtraction {
        text: text.to_string(),
        chord_count: chords_found.len(),
        chords_found,
    }
}

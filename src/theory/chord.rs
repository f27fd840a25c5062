use std::fmt;

use serde::Serialize;

use super::pitch::{PitchClass, normalize_flats};
use super::{Result, TheoryError, leading_root};

const MAJOR: &[u8] = &[0, 4, 7];
const MINOR: &[u8] = &[0, 3, 7];

/// A chord symbol split into its parts. Flats are already rewritten as sharps.
///
/// `root` always starts with a letter A–G but may still be a non-pitch-class
/// spelling such as `E#`; `bass` is kept exactly as written after the slash.
/// Use [`is_valid_chord`] to check both against the chromatic scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedChord {
    pub root: String,
    pub quality: String,
    #[serde(rename = "bass_note")]
    pub bass: Option<String>,
}

impl ParsedChord {
    pub fn root_pitch(&self) -> Option<PitchClass> {
        PitchClass::from_name(&self.root)
    }

    pub fn bass_pitch(&self) -> Option<PitchClass> {
        self.bass.as_deref().and_then(PitchClass::from_name)
    }
}

impl fmt::Display for ParsedChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality)?;
        if let Some(bass) = &self.bass {
            write!(f, "/{bass}")?;
        }
        Ok(())
    }
}

/// Parse a chord symbol into root, quality and optional bass note.
///
/// - `"Am"` → (`A`, `m`, none)
/// - `"F#m7"` → (`F#`, `m7`, none)
/// - `"C/E"` → (`C`, ``, `E`)
/// - `"Bb7"` → (`A#`, `7`, none)
///
/// The quality is whatever follows the root and is never checked. An empty
/// bass part (`"C/"`) counts as no bass note.
pub fn parse_chord(text: &str) -> Result<ParsedChord> {
    let normalized = normalize_flats(text.trim());

    let (chord_part, bass) = match normalized.split_once('/') {
        Some((chord, bass)) => {
            let bass = bass.trim();
            (chord, (!bass.is_empty()).then(|| bass.to_string()))
        }
        None => (normalized.as_str(), None),
    };

    let root = leading_root(chord_part).ok_or_else(|| TheoryError::InvalidChord(text.to_string()))?;

    Ok(ParsedChord {
        root: root.to_string(),
        quality: chord_part[root.len()..].to_string(),
        bass,
    })
}

/// True when the symbol parses and both root and bass are real pitch classes.
/// Never fails; anything unparseable is simply not a chord.
pub fn is_valid_chord(text: &str) -> bool {
    match parse_chord(text) {
        Ok(chord) => {
            chord.root_pitch().is_some() && (chord.bass.is_none() || chord.bass_pitch().is_some())
        }
        Err(_) => false,
    }
}

/// Interval pattern for a normalized quality name, if it is one we know.
pub fn intervals_for_quality(quality: &str) -> Option<&'static [u8]> {
    let pattern: &'static [u8] = match quality {
        "" | "maj" | "major" => MAJOR,
        "m" | "minor" => MINOR,
        "dim" => &[0, 3, 6],
        "aug" => &[0, 4, 8],
        "7" => &[0, 4, 7, 10],
        "maj7" => &[0, 4, 7, 11],
        "m7" => &[0, 3, 7, 10],
        "dim7" => &[0, 3, 6, 9],
        "sus2" => &[0, 2, 7],
        "sus4" => &[0, 5, 7],
        "add9" => &[0, 4, 7, 14],
        "6" => &[0, 4, 7, 9],
        "m6" => &[0, 3, 7, 9],
        _ => return None,
    };
    Some(pattern)
}

/// Lowercase, and spell `min` as `m` (`Amin7` and `Am7` share a pattern).
fn normalize_quality(quality: &str) -> String {
    let lower = quality.trim().to_lowercase();
    if lower == "minor" {
        return lower;
    }
    lower.replace("min", "m")
}

/// Semitone intervals from the root for a chord symbol.
///
/// Unknown qualities and unparseable symbols get the major triad.
pub fn chord_intervals(text: &str) -> &'static [u8] {
    let chord = match parse_chord(text) {
        Ok(chord) => chord,
        Err(e) => {
            log::debug!("{e}; using major intervals");
            return MAJOR;
        }
    };

    let quality = normalize_quality(&chord.quality);
    intervals_for_quality(&quality).unwrap_or_else(|| {
        log::debug!("Unknown chord quality {quality:?} in {text:?}; using major intervals");
        MAJOR
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(text: &str) -> (String, String, Option<String>) {
        let c = parse_chord(text).unwrap();
        (c.root, c.quality, c.bass)
    }

    fn p(root: &str, quality: &str, bass: Option<&str>) -> (String, String, Option<String>) {
        (root.to_string(), quality.to_string(), bass.map(str::to_string))
    }

    // === Parsing ===

    #[test]
    fn test_parse_simple_chords() {
        assert_eq!(parts("C"), p("C", "", None));
        assert_eq!(parts("Am"), p("A", "m", None));
        assert_eq!(parts("F#"), p("F#", "", None));
        assert_eq!(parts("Bb7"), p("A#", "7", None));
    }

    #[test]
    fn test_parse_slash_chords() {
        assert_eq!(parts("C/E"), p("C", "", Some("E")));
        assert_eq!(parts("Am/F"), p("A", "m", Some("F")));
        assert_eq!(parts("D7/F#"), p("D", "7", Some("F#")));
        assert_eq!(parts("Dm7/F"), p("D", "m7", Some("F")));
        assert_eq!(parts("Eb/Bb"), p("D#", "", Some("A#")));
    }

    #[test]
    fn test_parse_complex_chords() {
        assert_eq!(parts("Cmaj7"), p("C", "maj7", None));
        assert_eq!(parts("F#m7"), p("F#", "m7", None));
        assert_eq!(parts("Bdim"), p("B", "dim", None));
        // Anything after the root is accepted as quality
        assert_eq!(parts("Gwhatever"), p("G", "whatever", None));
    }

    #[test]
    fn test_parse_trims_and_splits_on_first_slash() {
        assert_eq!(parts("  Am  "), p("A", "m", None));
        assert_eq!(parts("C/ E "), p("C", "", Some("E")));
        assert_eq!(parts("C/E/G"), p("C", "", Some("E/G")));
        assert_eq!(parts("C/"), p("C", "", None));
    }

    #[test]
    fn test_parse_keeps_unvalidated_bass() {
        assert_eq!(parts("C/X"), p("C", "", Some("X")));
    }

    #[test]
    fn test_parse_rejects_missing_root() {
        for bad in ["", "H", "Xm", "123", "am", "/E"] {
            assert!(
                matches!(parse_chord(bad), Err(TheoryError::InvalidChord(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_display_reassembles() {
        assert_eq!(parse_chord("Dm7/F").unwrap().to_string(), "Dm7/F");
        assert_eq!(parse_chord("Ab").unwrap().to_string(), "G#");
    }

    // === Validation ===

    #[test]
    fn test_valid_chords() {
        for chord in ["C", "Am", "F#m7", "Bb", "Dm/F", "G7", "Cmaj7", "Am/F", "C/"] {
            assert!(is_valid_chord(chord), "{chord:?} should be valid");
        }
    }

    #[test]
    fn test_invalid_chords() {
        for chord in ["H", "Xm", "Z7", "123", "", "E#", "B#m", "C/H", "C/Em"] {
            assert!(!is_valid_chord(chord), "{chord:?} should be invalid");
        }
    }

    // === Intervals ===

    #[test]
    fn test_intervals_known_qualities() {
        assert_eq!(chord_intervals("C"), &[0, 4, 7]);
        assert_eq!(chord_intervals("Am"), &[0, 3, 7]);
        assert_eq!(chord_intervals("Amin"), &[0, 3, 7]);
        assert_eq!(chord_intervals("Am7"), &[0, 3, 7, 10]);
        assert_eq!(chord_intervals("Amin7"), &[0, 3, 7, 10]);
        assert_eq!(chord_intervals("Cmaj7"), &[0, 4, 7, 11]);
        assert_eq!(chord_intervals("G7"), &[0, 4, 7, 10]);
        assert_eq!(chord_intervals("Bdim7"), &[0, 3, 6, 9]);
        assert_eq!(chord_intervals("Dsus4/A"), &[0, 5, 7]);
        assert_eq!(chord_intervals("Cadd9"), &[0, 4, 7, 14]);
    }

    #[test]
    fn test_intervals_fall_back_to_major() {
        assert_eq!(chord_intervals("Cm7b5"), &[0, 4, 7]);
        assert_eq!(chord_intervals("not a chord"), &[0, 4, 7]);
        assert_eq!(intervals_for_quality("13"), None);
    }
}

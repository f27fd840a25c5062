use super::chord::parse_chord;
use super::pitch::PitchClass;
use super::Result;

/// Transpose a single note name. Flats are accepted; the result is always the
/// sharp spelling.
pub fn transpose_note(note: &str, semitones: i32) -> Result<PitchClass> {
    let pitch: PitchClass = note.parse()?;
    Ok(pitch.transpose(semitones))
}

fn try_transpose_chord(text: &str, semitones: i32) -> Result<String> {
    let chord = parse_chord(text)?;

    let root = transpose_note(&chord.root, semitones)?;
    let mut out = format!("{root}{}", chord.quality);

    if let Some(bass) = &chord.bass {
        let bass = transpose_note(bass, semitones)?;
        out.push('/');
        out.push_str(bass.name());
    }

    Ok(out)
}

/// Transpose a chord symbol, e.g. `("C/E", 2)` → `"D/F#"`.
///
/// Best effort: anything that doesn't parse as a chord, or whose root or bass
/// isn't a real pitch class, comes back unchanged.
pub fn transpose_chord(text: &str, semitones: i32) -> String {
    match try_transpose_chord(text, semitones) {
        Ok(chord) => chord,
        Err(e) => {
            log::debug!("Leaving {text:?} untransposed: {e}");
            text.to_string()
        }
    }
}

/// Transpose every chord in a progression by the same amount.
pub fn transpose_progression<S: AsRef<str>>(chords: &[S], semitones: i32) -> Vec<String> {
    chords
        .iter()
        .map(|c| transpose_chord(c.as_ref(), semitones))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::TheoryError;

    #[test]
    fn test_transpose_note() {
        assert_eq!(transpose_note("C", 2).unwrap().name(), "D");
        assert_eq!(transpose_note("B", 1).unwrap().name(), "C");
        assert_eq!(transpose_note("C", -1).unwrap().name(), "B");
        assert_eq!(transpose_note("Bb", 2).unwrap().name(), "C");
    }

    #[test]
    fn test_transpose_note_rejects_unknown_spelling() {
        assert_eq!(transpose_note("H", 1), Err(TheoryError::InvalidNote("H".into())));
        assert_eq!(transpose_note("E#", 1), Err(TheoryError::InvalidNote("E#".into())));
    }

    #[test]
    fn test_transpose_simple_chords() {
        assert_eq!(transpose_chord("C", 2), "D");
        assert_eq!(transpose_chord("Am", 3), "Cm");
        assert_eq!(transpose_chord("F#", -1), "F");
        assert_eq!(transpose_chord("G", 5), "C");
    }

    #[test]
    fn test_transpose_slash_chords() {
        assert_eq!(transpose_chord("C/E", 2), "D/F#");
        assert_eq!(transpose_chord("Am/F", -2), "Gm/D#");
        assert_eq!(transpose_chord("Dm7/F", 12), "Dm7/F");
    }

    #[test]
    fn test_transpose_keeps_quality_verbatim() {
        assert_eq!(transpose_chord("Cmaj7", 1), "C#maj7");
        assert_eq!(transpose_chord("Ebsus4", 1), "Esus4");
        assert_eq!(transpose_chord("Gwhatever", 2), "Awhatever");
    }

    #[test]
    fn test_transpose_failure_returns_original() {
        assert_eq!(transpose_chord("N.C.", 3), "N.C.");
        assert_eq!(transpose_chord("H7", 3), "H7");
        assert_eq!(transpose_chord("E#", 1), "E#");
        assert_eq!(transpose_chord("C/X", 2), "C/X");
        assert_eq!(transpose_chord("", 2), "");
    }

    #[test]
    fn test_transpose_extreme_offsets() {
        assert_eq!(transpose_chord("B", i32::MAX), "F#");
        assert_eq!(transpose_chord("B", i32::MIN), "D#");
        assert_eq!(transpose_chord("Am/F", i32::MIN), "C#m/A");
        assert_eq!(transpose_note("C", i32::MAX).unwrap().name(), "G");
    }

    #[test]
    fn test_transpose_round_trip() {
        for chord in ["C", "C#m7", "D/F#", "Gsus4", "A#dim", "Bm/A", "Fadd9"] {
            for n in -14..=14 {
                assert_eq!(transpose_chord(&transpose_chord(chord, n), -n), chord);
            }
        }
    }

    #[test]
    fn test_transpose_progression() {
        let chords = ["C", "Am", "F", "G"];
        assert_eq!(transpose_progression(&chords, 2), vec!["D", "Bm", "G", "A"]);
    }

    #[test]
    fn test_transpose_progression_is_per_chord() {
        let chords = vec!["C".to_string(), "???".to_string(), "G".to_string()];
        assert_eq!(transpose_progression(&chords, -2), vec!["A#", "???", "F"]);
        assert!(transpose_progression::<&str>(&[], 5).is_empty());
    }
}

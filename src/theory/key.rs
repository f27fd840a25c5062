use super::pitch::{PitchClass, normalize_flats};
use super::{Result, TheoryError, leading_root};

/// Highest fret a capo suggestion may name.
pub const MAX_CAPO_FRET: u8 = 12;

/// Root pitch class of a key name; mode suffix ("m", "minor", ...) is ignored.
pub fn key_root(key: &str) -> Result<PitchClass> {
    let normalized = normalize_flats(key.trim());
    leading_root(&normalized)
        .and_then(PitchClass::from_name)
        .ok_or_else(|| TheoryError::InvalidKey(key.to_string()))
}

/// Signed shortest distance in semitones from one key's root to another's.
///
/// Result is in -5..=6: C→B is -1, not 11. The tritone is always +6.
pub fn key_semitone_distance(from_key: &str, to_key: &str) -> Result<i32> {
    let from = key_root(from_key)?;
    let to = key_root(to_key)?;

    let diff = from.interval_to(to) as i32;
    Ok(if diff > 6 { diff - 12 } else { diff })
}

/// Capo fret that raises `from_key` to `to_key`, if one is needed.
///
/// A capo only raises pitch, so a downward distance is taken as the
/// equivalent upward one (F→C is -5, suggested as fret 7). Same key, or a key
/// that can't be read, gives `None`.
pub fn suggest_capo_position(from_key: &str, to_key: &str) -> Option<u8> {
    let semitones = match key_semitone_distance(from_key, to_key) {
        Ok(d) => d,
        Err(e) => {
            log::debug!("No capo suggestion for {from_key:?} → {to_key:?}: {e}");
            return None;
        }
    };

    let fret = if semitones < 0 { semitones + 12 } else { semitones };
    (1..=MAX_CAPO_FRET as i32).contains(&fret).then_some(fret as u8)
}

/// Key that sounds when a chart in `original_key` is played with a capo at
/// `capo_fret`. The mode suffix is carried over as written.
pub fn capo_effective_key(original_key: &str, capo_fret: u8) -> Result<String> {
    if capo_fret == 0 {
        return Ok(original_key.to_string());
    }

    let key = original_key.trim();
    let normalized = normalize_flats(key);
    let root = leading_root(&normalized).ok_or_else(|| TheoryError::InvalidKey(original_key.to_string()))?;
    let pitch = PitchClass::from_name(root).ok_or_else(|| TheoryError::InvalidKey(original_key.to_string()))?;

    // Flat and sharp spellings are both two bytes, so the root occupies the
    // same prefix of the unnormalized key.
    let suffix = key.get(root.len()..).unwrap_or_default();

    Ok(format!("{}{suffix}", pitch.transpose(capo_fret as i32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_semitone_difference() {
        assert_eq!(key_semitone_distance("C", "D").unwrap(), 2);
        assert_eq!(key_semitone_distance("C", "F").unwrap(), 5);
        assert_eq!(key_semitone_distance("A", "C").unwrap(), 3);
        assert_eq!(key_semitone_distance("F", "C").unwrap(), -5);
    }

    #[test]
    fn test_key_distance_takes_shortest_path() {
        assert_eq!(key_semitone_distance("C", "B").unwrap(), -1);
        assert_eq!(key_semitone_distance("B", "C").unwrap(), 1);
        assert_eq!(key_semitone_distance("C", "G").unwrap(), -5);
        assert_eq!(key_semitone_distance("E", "E").unwrap(), 0);
    }

    #[test]
    fn test_key_distance_tritone_is_positive() {
        assert_eq!(key_semitone_distance("C", "F#").unwrap(), 6);
        assert_eq!(key_semitone_distance("F#", "C").unwrap(), 6);
        assert_eq!(key_semitone_distance("Gb", "C").unwrap(), 6);
    }

    #[test]
    fn test_key_distance_ignores_mode_and_accepts_flats() {
        assert_eq!(key_semitone_distance("Am", "Bm").unwrap(), 2);
        assert_eq!(key_semitone_distance("C major", "Eb minor").unwrap(), 3);
        assert_eq!(key_semitone_distance("Bb", "A#").unwrap(), 0);
    }

    #[test]
    fn test_key_distance_range() {
        for from in crate::theory::CHROMATIC_SCALE {
            for to in crate::theory::CHROMATIC_SCALE {
                let d = key_semitone_distance(from, to).unwrap();
                assert!((-5..=6).contains(&d), "{from}->{to} gave {d}");
            }
        }
    }

    #[test]
    fn test_key_distance_invalid() {
        assert_eq!(
            key_semitone_distance("H", "C"),
            Err(TheoryError::InvalidKey("H".into()))
        );
        assert_eq!(
            key_semitone_distance("C", "E#"),
            Err(TheoryError::InvalidKey("E#".into()))
        );
        assert!(key_semitone_distance("", "C").is_err());
    }

    #[test]
    fn test_capo_transposition() {
        assert_eq!(capo_effective_key("C", 0).unwrap(), "C");
        assert_eq!(capo_effective_key("C", 2).unwrap(), "D");
        assert_eq!(capo_effective_key("Am", 3).unwrap(), "Cm");
        assert_eq!(capo_effective_key("F", 5).unwrap(), "A#");
        assert_eq!(capo_effective_key("Bbm", 2).unwrap(), "Cm");
        assert_eq!(capo_effective_key("E minor", 12).unwrap(), "E minor");
    }

    #[test]
    fn test_capo_zero_passes_anything_through() {
        assert_eq!(capo_effective_key("not a key", 0).unwrap(), "not a key");
    }

    #[test]
    fn test_capo_transposition_invalid_key() {
        assert!(matches!(capo_effective_key("H", 2), Err(TheoryError::InvalidKey(_))));
        assert!(matches!(capo_effective_key("B#", 1), Err(TheoryError::InvalidKey(_))));
    }

    #[test]
    fn test_capo_suggestions() {
        assert_eq!(suggest_capo_position("C", "D"), Some(2));
        assert_eq!(suggest_capo_position("G", "A"), Some(2));
        assert_eq!(suggest_capo_position("C", "F"), Some(5));
        // Downward move reinterpreted as the upward equivalent
        assert_eq!(suggest_capo_position("F", "C"), Some(7));
        assert_eq!(suggest_capo_position("C", "B"), Some(11));
        assert_eq!(suggest_capo_position("C", "F#"), Some(6));
    }

    #[test]
    fn test_capo_suggestion_none_cases() {
        assert_eq!(suggest_capo_position("C", "C"), None);
        assert_eq!(suggest_capo_position("Am", "A"), None);
        assert_eq!(suggest_capo_position("H", "C"), None);
        assert_eq!(suggest_capo_position("C", ""), None);
    }
}

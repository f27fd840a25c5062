use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use super::pitch::normalize_flats;
use super::transpose::transpose_progression;

// Chord-shaped word: root, optional accidental, at most one quality token, optional /bass.
// The trailing group stands in for a closing word boundary that also treats `#` as part
// of the word, so "F# " yields "F#" rather than "F".
static CHORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<chord>[A-G][#b]?(?:maj7|m7|m6|m|dim|aug|sus2|sus4|add9|13|11|6|7|9)?(?:/[A-G][#b]?)?)(?:[^\w#]|$)",
    )
    .unwrap()
});

/// Ordinary lowercase words that look like chords in lyric lines. Matched
/// exactly, so the chords "A" and "Am" still count.
const STOPLIST: &[&str] = &["a", "i", "am", "is", "as", "me", "go", "be", "do"];

fn is_stopword(token: &str) -> bool {
    STOPLIST.contains(&token)
}

/// Every chord-shaped token in `text`, stoplisted words included.
fn chord_tokens(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    CHORD_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.name("chord"))
}

/// Unique chord names found in free text (chords-over-lyrics charts, ChordPro
/// brackets, plain chord lists). Flats come back as sharps.
///
/// Heuristic: matching ignores case, so a lyric word like "Dad" is skipped
/// but "em" in running text is picked up. The stoplist removes the most common
/// offenders ("a", "am", ...).
pub fn extract_chords(text: &str) -> BTreeSet<String> {
    chord_tokens(text)
        .map(|m| m.as_str())
        .filter(|token| !is_stopword(token))
        .map(normalize_flats)
        .collect()
}

/// Result of transposing the chords embedded in a block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextTransposition {
    pub text: String,
    pub chords_found: Vec<String>,
    pub transposed_chords: Vec<String>,
}

/// Transpose every chord in a chords-and-lyrics text.
///
/// Each found chord is replaced wherever it appears as a whole word, ignoring
/// case, and every occurrence of one spelling gets the same transposition. Replacement is a
/// single pass, so a chord produced by one substitution is never transposed
/// again ("C D" up two is "D E", not "E E").
pub fn transpose_text(text: &str, semitones: i32) -> TextTransposition {
    let chords_found: Vec<String> = extract_chords(text).into_iter().collect();
    let transposed_chords = transpose_progression(&chords_found, semitones);

    // Exact spelling first, so "Am" and "AM" in one text keep their own
    // transpositions; the case-folded map covers stoplisted words like "am".
    let mut exact: HashMap<&str, &str> = HashMap::with_capacity(chords_found.len());
    let mut folded: HashMap<String, &str> = HashMap::with_capacity(chords_found.len());
    for (original, transposed) in chords_found.iter().zip(&transposed_chords) {
        exact.insert(original.as_str(), transposed.as_str());
        folded
            .entry(original.to_lowercase())
            .or_insert(transposed.as_str());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in chord_tokens(text) {
        let normalized = normalize_flats(token.as_str());
        let replacement = exact
            .get(normalized.as_str())
            .or_else(|| folded.get(&normalized.to_lowercase()));
        if let Some(replacement) = replacement {
            out.push_str(&text[last..token.start()]);
            out.push_str(replacement);
            last = token.end();
        }
    }
    out.push_str(&text[last..]);

    log::debug!(
        "Transposed {} distinct chords by {semitones} semitones",
        chords_found.len()
    );

    TextTransposition {
        text: out,
        chords_found,
        transposed_chords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // === Extraction ===

    #[test]
    fn test_extract_chord_list() {
        assert_eq!(extract_chords("C Am F G"), set(&["C", "Am", "F", "G"]));
    }

    #[test]
    fn test_extract_chords_from_lyrics() {
        let text = "
        C                Am
        Amazing grace how sweet the sound
        F               G           C
        That saved a wretch like me
        ";
        assert_eq!(extract_chords(text), set(&["C", "Am", "F", "G"]));
    }

    #[test]
    fn test_extract_complex_chords() {
        let text = "Cmaj7 F#m7 Bb7 Am/F G7sus4";
        // One quality token only, so G7sus4 isn't chord-shaped
        assert_eq!(extract_chords(text), set(&["Cmaj7", "F#m7", "A#7", "Am/F"]));
    }

    #[test]
    fn test_extract_sharp_followed_by_space() {
        assert_eq!(extract_chords("F# B C#m"), set(&["F#", "B", "C#m"]));
    }

    #[test]
    fn test_extract_deduplicates() {
        assert_eq!(extract_chords("G D G D Em C G"), set(&["G", "D", "Em", "C"]));
        // Enharmonic spellings collapse after normalization
        assert_eq!(extract_chords("Bb A#"), set(&["A#"]));
    }

    #[test]
    fn test_extract_stoplist() {
        assert_eq!(extract_chords("I am a man"), set(&[]));
        assert_eq!(extract_chords("Am am AM"), set(&["Am", "AM"]));
        assert_eq!(extract_chords("a A"), set(&["A"]));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        assert_eq!(extract_chords("em c"), set(&["em", "c"]));
    }

    #[test]
    fn test_extract_chordpro_brackets() {
        let text = "[G]Swing low, [C]sweet chari[G]ot, [D7/F#]coming for";
        assert_eq!(extract_chords(text), set(&["G", "C", "D7/F#"]));
    }

    #[test]
    fn test_extract_ignores_chord_letters_inside_words() {
        assert_eq!(extract_chords("Dad added a beaded cab"), set(&[]));
        assert_eq!(extract_chords(""), set(&[]));
    }

    // === Text transposition ===

    #[test]
    fn test_transpose_text_chord_lines() {
        let text = "C     Am\nAmazing grace\nF   G   C\nhow sweet";
        let r = transpose_text(text, 2);
        assert_eq!(r.text, "D     Bm\nAmazing grace\nG   A   D\nhow sweet");
        assert_eq!(r.chords_found, vec!["Am", "C", "F", "G"]);
        assert_eq!(r.transposed_chords, vec!["Bm", "D", "G", "A"]);
    }

    #[test]
    fn test_transpose_text_single_pass() {
        let r = transpose_text("C D E", 2);
        assert_eq!(r.text, "D E F#");
    }

    #[test]
    fn test_transpose_text_slash_and_flats() {
        let r = transpose_text("[Bb]Hey [C/E]there", 2);
        assert_eq!(r.text, "[C]Hey [D/F#]there");
    }

    #[test]
    fn test_transpose_text_case_insensitive_whole_words() {
        // "am" matches the found "Am" chord; "Amazing" is not a whole-word match
        let r = transpose_text("Am\nI am Amazing", 3);
        assert_eq!(r.text, "Cm\nI Cm Amazing");
    }

    #[test]
    fn test_transpose_text_keeps_each_spelling() {
        let r = transpose_text("Am AM", 3);
        assert_eq!(r.text, "Cm CM");

        // Case-folded fallback still reaches words that are only stoplisted
        let r = transpose_text("[Am]la am [Bb]la", 2);
        assert_eq!(r.text, "[Bm]la Bm [C]la");
    }

    #[test]
    fn test_transpose_text_leaves_untransposable_tokens() {
        let r = transpose_text("c G", 2);
        assert_eq!(r.text, "c A");
        assert_eq!(r.chords_found, vec!["G", "c"]);
        assert_eq!(r.transposed_chords, vec!["A", "c"]);
    }

    #[test]
    fn test_transpose_text_without_chords() {
        let r = transpose_text("just words here", 4);
        assert_eq!(r.text, "just words here");
        assert!(r.chords_found.is_empty());
    }
}

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use crate::theory::{self, TheoryError};

/// Highest capo position a sheet may declare.
pub const MAX_CAPO: u8 = 12;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Unreadable capo value: {0:?}")]
    InvalidCapo(String),
    #[error("Capo position must be between 0 and 12, got {0}")]
    CapoOutOfRange(u32),
    #[error("Sheet declares no key")]
    MissingKey,
    #[error(transparent)]
    Theory(#[from] TheoryError),
}

// ChordPro directive on its own line: {title: Scarborough Fair}, {key:Am}
static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\{\s*(?P<name>[A-Za-z_]+)\s*(?::\s*(?P<value>[^}]*?))?\s*\}\s*$").unwrap()
});

// Plain-text header line: "Key: G", "Capo: 3rd fret"
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?P<name>title|artist|key|capo)\s*:\s*(?P<value>.*?)\s*$").unwrap()
});

// Leading number of a capo value ("3", "3rd fret", "III" is not supported)
static CAPO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?P<fret>\d{1,3})").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Artist,
    Key,
    Capo,
    /// Any other ChordPro directive (comments, sections, ...)
    Other,
}

/// A metadata line: which field it sets and where its value sits in the line.
struct MetaLine<'a> {
    field: Field,
    value: &'a str,
    value_start: usize,
}

fn field_for(name: &str) -> Field {
    match name.to_lowercase().as_str() {
        "title" | "t" => Field::Title,
        "artist" | "a" => Field::Artist,
        "key" => Field::Key,
        "capo" => Field::Capo,
        _ => Field::Other,
    }
}

fn meta_line(line: &str) -> Option<MetaLine<'_>> {
    if let Some(caps) = DIRECTIVE_RE.captures(line) {
        let field = field_for(caps.name("name")?.as_str());
        return Some(match caps.name("value") {
            Some(v) => MetaLine { field, value: v.as_str(), value_start: v.start() },
            None => MetaLine { field, value: "", value_start: line.len() },
        });
    }

    let caps = HEADER_RE.captures(line)?;
    let value = caps.name("value")?;
    Some(MetaLine {
        field: field_for(caps.name("name")?.as_str()),
        value: value.as_str(),
        value_start: value.start(),
    })
}

fn parse_capo(value: &str) -> Result<u8, SheetError> {
    let fret: u32 = CAPO_RE
        .captures(value)
        .and_then(|c| c.name("fret"))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| SheetError::InvalidCapo(value.to_string()))?;

    if fret > MAX_CAPO as u32 {
        return Err(SheetError::CapoOutOfRange(fret));
    }
    Ok(fret as u8)
}

/// A chord chart read from a text or ChordPro file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongSheet {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub key: Option<String>,
    pub capo: u8,
    /// Unique chords in the body, sorted.
    pub chords: Vec<String>,
    #[serde(skip)]
    pub text: String,
}

impl SongSheet {
    /// Read header metadata and chords from a chord chart.
    ///
    /// Header values come from ChordPro directives or `Name: value` lines; the
    /// first occurrence of each wins. Title falls back to the file stem.
    /// Chords are only collected from lines that aren't metadata.
    pub fn parse(path: &Path, text: &str) -> Result<Self, SheetError> {
        let mut title = None;
        let mut artist = None;
        let mut key = None;
        let mut capo = None;
        let mut body = String::with_capacity(text.len());

        for line in text.lines() {
            let Some(meta) = meta_line(line) else {
                body.push_str(line);
                body.push('\n');
                continue;
            };

            let value = meta.value.trim();
            if value.is_empty() {
                continue;
            }
            match meta.field {
                Field::Title if title.is_none() => title = Some(value.to_string()),
                Field::Artist if artist.is_none() => artist = Some(value.to_string()),
                Field::Key if key.is_none() => {
                    theory::key_root(value)?;
                    key = Some(value.to_string());
                }
                Field::Capo if capo.is_none() => capo = Some(parse_capo(value)?),
                _ => {}
            }
        }

        let title = title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        });

        Ok(Self {
            path: path.to_path_buf(),
            title,
            artist,
            key,
            capo: capo.unwrap_or(0),
            chords: theory::extract_chords(&body).into_iter().collect(),
            text: text.to_string(),
        })
    }

    /// Key that sounds with the declared capo applied.
    pub fn effective_key(&self) -> Option<String> {
        let key = self.key.as_deref()?;
        theory::capo_effective_key(key, self.capo)
            .inspect_err(|e| log::debug!("{}: {e}", self.path.display()))
            .ok()
    }

    /// The sheet's text with every chord, and the declared key, moved by
    /// `semitones`. Other metadata lines are left untouched.
    pub fn transposed(&self, semitones: i32) -> String {
        let lines: Vec<&str> = self.text.split('\n').collect();

        // Transpose all body lines together so every occurrence of a chord
        // gets the same replacement, then stitch metadata lines back in.
        let body: Vec<&str> = lines.iter().copied().filter(|l| meta_line(l).is_none()).collect();
        let transposed_body = theory::transpose_text(&body.join("\n"), semitones).text;
        let mut body_lines = transposed_body.split('\n');

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        for line in &lines {
            match meta_line(line) {
                Some(meta) if meta.field == Field::Key && !meta.value.trim().is_empty() => {
                    let value = meta.value.trim();
                    let new_key = theory::transpose_chord(value, semitones);
                    let value_start = meta.value_start + (meta.value.len() - meta.value.trim_start().len());
                    let value_end = value_start + value.len();
                    out.push(format!("{}{new_key}{}", &line[..value_start], &line[value_end..]));
                }
                Some(_) => out.push(line.to_string()),
                None => out.push(body_lines.next().unwrap_or_default().to_string()),
            }
        }
        out.join("\n")
    }

    /// Move the sheet to `target_key` along the shortest path.
    pub fn transposed_to_key(&self, target_key: &str) -> Result<(i32, String), SheetError> {
        let key = self.key.as_deref().ok_or(SheetError::MissingKey)?;
        let semitones = theory::key_semitone_distance(key, target_key)?;
        Ok((semitones, self.transposed(semitones)))
    }
}

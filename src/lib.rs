pub mod config;
pub mod diagram;
pub mod service;
pub mod songbook;
pub mod theory;

/// Chord sheet file extensions we read
pub const SHEET_EXTENSIONS: &[&str] = &[
    "txt", "crd",
    // ChordPro
    "cho", "chordpro", "pro",
];

/// Default neck length for chord diagram checks
pub const DEFAULT_MAX_FRET: i32 = 24;

/// Application name for XDG paths
pub const APP_NAME: &str = "chordhub";

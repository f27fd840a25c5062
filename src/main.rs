use anyhow::{Context, Result};
use chordhub::diagram::{ChordDiagram, STANDARD_TUNING};
use chordhub::service::{
    self, CapoSuggestionRequest, ChordValidation, KeyChangeRequest, LyricsTransposeRequest,
    TransposeRequest,
};
use chordhub::songbook::{self, SongSheet};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chordhub", version, about = "Transpose chord charts and plan capo positions")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpose chords by a number of semitones
    Transpose {
        /// Semitones to move (negative = down)
        #[arg(allow_negative_numbers = true)]
        semitones: i32,

        /// Chords to transpose
        #[arg(required = true)]
        chords: Vec<String>,
    },

    /// Move chords from one key to another (shortest direction)
    ChangeKey {
        /// Current key (e.g. G, Bbm)
        from: String,

        /// Key to move to
        to: String,

        /// Chords to transpose
        #[arg(required = true)]
        chords: Vec<String>,
    },

    /// Suggest a capo fret for playing FROM shapes that sound in TO
    Capo {
        /// Key of the chord shapes you play
        from: String,

        /// Key you want to sound in
        to: String,
    },

    /// Transpose the chords in a chords-over-lyrics text
    Lyrics {
        /// Semitones to move (negative = down)
        #[arg(allow_negative_numbers = true)]
        semitones: i32,

        /// Text file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Check chord names and show their breakdown
    Validate {
        /// Chord names
        #[arg(required = true)]
        chords: Vec<String>,
    },

    /// List the chords found in a text
    Extract {
        /// Text file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Scan directories for chord sheets and list them
    Scan {
        /// Directories to scan (defaults to config file songbook_dirs)
        paths: Vec<PathBuf>,

        /// Number of parallel workers (0 = auto-detect from config)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },

    /// Show a chord sheet, or rewrite it in another key
    Sheet {
        /// Chord sheet (plain text or ChordPro)
        file: PathBuf,

        /// Transpose by this many semitones
        #[arg(short, long, allow_negative_numbers = true, conflicts_with = "to_key")]
        semitones: Option<i32>,

        /// Transpose to this key (the sheet must declare one)
        #[arg(short = 'k', long)]
        to_key: Option<String>,
    },

    /// Validate a chord diagram JSON document
    Diagram {
        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = chordhub::config::AppConfig::load();

    match cli.command {
        Commands::Transpose { semitones, chords } => {
            let resp = service::transpose_chords(TransposeRequest { chords, semitones })?;
            if cli.json {
                print_json(&resp)?;
            } else {
                println!("{}", resp.transposed_chords.join(" "));
            }
        }

        Commands::ChangeKey { from, to, chords } => {
            let resp = service::change_key(KeyChangeRequest {
                original_key: from,
                target_key: to,
                chords,
            })?;
            if cli.json {
                print_json(&resp)?;
            } else {
                println!(
                    "{} -> {} ({:+} semitones)",
                    resp.original_key, resp.target_key, resp.semitones
                );
                println!("{}", resp.transposed_chords.join(" "));
            }
        }

        Commands::Capo { from, to } => {
            let resp = service::capo_suggestion(CapoSuggestionRequest {
                original_key: from,
                target_key: to,
            });
            if cli.json {
                print_json(&resp)?;
            } else {
                match (resp.capo_fret, &resp.effective_key) {
                    (Some(fret), Some(key)) => println!(
                        "Capo {}: play {} shapes, sounding in {}",
                        fret, resp.original_key, key
                    ),
                    _ => println!(
                        "No capo position takes {} shapes to {}.",
                        resp.original_key, resp.target_key
                    ),
                }
            }
        }

        Commands::Lyrics { semitones, file } => {
            let text = read_input(file.as_deref())?;
            let resp = service::transpose_lyrics(LyricsTransposeRequest {
                lyrics_and_chords: text,
                semitones,
            });
            if cli.json {
                print_json(&resp)?;
            } else {
                print_text(&resp.transposed_text);
            }
        }

        Commands::Validate { chords } => {
            let results: Vec<ChordValidation> =
                chords.iter().map(|c| service::validate_chord(c)).collect();
            let invalid = results.iter().filter(|r| !r.is_valid).count();

            if cli.json {
                print_json(&results)?;
            } else {
                print_validation_table(&results);
            }
            if invalid > 0 {
                anyhow::bail!("{} of {} chords are invalid", invalid, results.len());
            }
        }

        Commands::Extract { file } => {
            let text = read_input(file.as_deref())?;
            let resp = service::extract_chords(&text);
            if cli.json {
                print_json(&resp)?;
            } else if resp.chord_count == 0 {
                println!("No chords found.");
            } else {
                println!("{}", resp.chords_found.join(" "));
            }
        }

        Commands::Scan { paths, jobs } => {
            // Resolve scan paths: CLI args > config songbook_dirs
            let scan_paths = if !paths.is_empty() {
                paths
            } else if !config.songbook_dirs.is_empty() {
                config.songbook_dirs.clone()
            } else {
                anyhow::bail!(
                    "No directories to scan. Pass paths as arguments or set songbook_dirs in config."
                );
            };

            let workers = if jobs > 0 { jobs } else { config.resolve_workers() };
            let result = songbook::scan(&scan_paths, &config.sheet_extensions, workers)
                .context("Scan failed")?;

            if cli.json {
                print_json(&result.sheets)?;
            } else {
                print_sheet_table(&result.sheets);
                println!();
                println!(
                    "Scan complete: {} scanned, {} sheets, {} errors",
                    result.scanned,
                    result.sheets.len(),
                    result.errors
                );
            }
        }

        Commands::Sheet { file, semitones, to_key } => {
            let sheet = songbook::load_sheet(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;

            let moved = match (semitones, to_key) {
                (Some(n), _) => Some((n, sheet.transposed(n))),
                (None, Some(key)) => Some(sheet.transposed_to_key(&key)?),
                (None, None) => None,
            };

            match moved {
                Some((semitones, text)) => {
                    log::info!("Moved {} by {} semitones", file.display(), semitones);
                    if cli.json {
                        print_json(&SheetTransposition {
                            path: &sheet.path,
                            semitones,
                            text,
                        })?;
                    } else {
                        print_text(&text);
                    }
                }
                None if cli.json => print_json(&sheet)?,
                None => print_sheet_summary(&sheet),
            }
        }

        Commands::Diagram { file } => {
            let json = read_input(file.as_deref())?;
            let diagram = ChordDiagram::from_json(&json, config.max_fret)
                .context("Invalid chord diagram")?;

            let notes: Vec<Option<&'static str>> = diagram
                .sounding_notes()
                .into_iter()
                .map(|n| n.map(|p| p.name()))
                .collect();

            if cli.json {
                print_json(&DiagramReport { diagram: &diagram, sounding_notes: notes })?;
            } else {
                print_diagram(&diagram, &notes);
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct SheetTransposition<'a> {
    path: &'a Path,
    semitones: i32,
    text: String,
}

#[derive(Serialize)]
struct DiagramReport<'a> {
    #[serde(flatten)]
    diagram: &'a ChordDiagram,
    sounding_notes: Vec<Option<&'static str>>,
}

/// Read a whole file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_text(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// Print one row per chord with its parsed parts.
fn print_validation_table(results: &[ChordValidation]) {
    println!(
        "{:<12} {:<7} {:<5} {:<8} {:<5}  {}",
        "Chord", "Valid", "Root", "Quality", "Bass", "Intervals"
    );
    println!("{}", "-".repeat(60));

    for r in results {
        let (root, quality, bass) = match &r.parsed {
            Some(p) => (p.root.as_str(), p.quality.as_str(), p.bass.as_deref().unwrap_or("-")),
            None => ("-", "-", "-"),
        };
        let intervals = r
            .intervals
            .as_ref()
            .map(|iv| iv.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" "))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<12} {:<7} {:<5} {:<8} {:<5}  {}",
            truncate(&r.chord, 12),
            if r.is_valid { "yes" } else { "no" },
            root,
            if quality.is_empty() { "major" } else { quality },
            bass,
            intervals,
        );
    }
}

/// Print a table of scanned chord sheets.
fn print_sheet_table(sheets: &[SongSheet]) {
    println!(
        "{:<30} {:<20} {:>4} {:>4} {:>5}  {}",
        "Title", "Artist", "Key", "Capo", "Sound", "Chords"
    );
    println!("{}", "-".repeat(90));

    for s in sheets {
        let sounding = s.effective_key().unwrap_or_else(|| "-".to_string());
        println!(
            "{:<30} {:<20} {:>4} {:>4} {:>5}  {}",
            truncate(&s.title, 30),
            truncate(s.artist.as_deref().unwrap_or("-"), 20),
            s.key.as_deref().unwrap_or("-"),
            s.capo,
            sounding,
            s.chords.len(),
        );
    }

    println!();
    println!("Sound=key heard with the capo applied  Chords=distinct chords");
}

fn print_sheet_summary(sheet: &SongSheet) {
    println!("Title:  {}", sheet.title);
    if let Some(artist) = &sheet.artist {
        println!("Artist: {}", artist);
    }
    match (&sheet.key, sheet.effective_key()) {
        (Some(key), Some(sounding)) if sheet.capo > 0 => {
            println!("Key:    {} (capo {}, sounds in {})", key, sheet.capo, sounding)
        }
        (Some(key), _) => println!("Key:    {}", key),
        (None, _) if sheet.capo > 0 => println!("Capo:   {}", sheet.capo),
        (None, _) => {}
    }
    println!("Chords: {}", sheet.chords.join(" "));
}

/// Print a diagram string by string, low E first.
fn print_diagram(diagram: &ChordDiagram, notes: &[Option<&str>]) {
    println!("{} ({} {})", diagram.name, diagram.root_note, diagram.chord_type);
    if diagram.starting_fret > 1 {
        println!("Starting fret: {}", diagram.starting_fret);
    }

    for (i, open) in STANDARD_TUNING.iter().enumerate() {
        let fret = diagram.fret_positions[i];
        let finger = diagram
            .finger_positions
            .as_ref()
            .and_then(|f| f.get(i))
            .filter(|&&f| f > 0)
            .map(|f| format!("finger {f}"))
            .unwrap_or_default();

        match notes.get(i).copied().flatten() {
            Some(note) => println!("{:<2} {:>3}  {:<3} {}", open, fret, note, finger),
            None => println!("{:<2} {:>3}  {:<3}", open, "x", "-"),
        }
    }

    if diagram.is_barre_chord {
        println!("Barre chord");
    }
    if let Some(desc) = &diagram.description {
        println!("{}", desc);
    }
}

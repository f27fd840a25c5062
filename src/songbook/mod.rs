pub mod sheet;

pub use sheet::{SheetError, SongSheet};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sheet error for {path}: {source}")]
    Sheet { path: String, source: SheetError },
    #[error("Thread pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub struct ScanResult {
    /// Parsed sheets, ordered by path.
    pub sheets: Vec<SongSheet>,
    pub scanned: u64,
    pub errors: u64,
}

fn has_sheet_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}

/// Collect chord sheet files under `paths`. A path that is itself a file is
/// taken as-is regardless of extension.
pub fn find_sheets(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && has_sheet_extension(entry.path(), extensions) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Read and parse a single chord sheet.
pub fn load_sheet(path: &Path) -> Result<SongSheet, ScanError> {
    let text = std::fs::read_to_string(path)?;
    SongSheet::parse(path, &text).map_err(|source| ScanError::Sheet {
        path: path.display().to_string(),
        source,
    })
}

/// Scan directories for chord sheets and parse them in parallel.
///
/// Files that can't be read or parsed are logged and counted, never fatal.
pub fn scan(paths: &[PathBuf], extensions: &[String], workers: usize) -> Result<ScanResult, ScanError> {
    let files = find_sheets(paths, extensions);
    log::info!("Found {} chord sheets", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("Reading sheets...");

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

    let results: Vec<Result<SongSheet, ScanError>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = load_sheet(path);
                pb.inc(1);
                result
            })
            .collect()
    });

    let mut scan = ScanResult {
        sheets: Vec::with_capacity(results.len()),
        scanned: files.len() as u64,
        errors: 0,
    };

    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(sheet) => scan.sheets.push(sheet),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                scan.errors += 1;
            }
        }
    }

    pb.finish_with_message(format!(
        "Done: {} sheets, {} errors",
        scan.sheets.len(),
        scan.errors
    ));

    Ok(scan)
}

//! First-run setup of the per-user application directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const CHEATSHEET_NAME: &str = "Markdown-Cheatsheet.md";

/// Bundled copy of the cheatsheet.
pub const CHEATSHEET: &str = include_str!("../assets/Markdown-Cheatsheet.md");

/// Make sure `dir` holds the cheatsheet and return its path.
///
/// An existing file is left alone so user edits survive.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be created.
pub fn seed_cheatsheet(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CHEATSHEET_NAME);
    if path.exists() {
        return Ok(path);
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create app dir {}", dir.display()))?;
    fs::write(&path, CHEATSHEET)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "seeded cheatsheet");
    Ok(path)
}

/// Paths to open at startup: the cheatsheet (unless disabled or unavailable)
/// followed by every command-line file that exists. Missing files are
/// skipped with a warning.
pub fn startup_files(app_dir: &Path, files: &[PathBuf], with_cheatsheet: bool) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(files.len() + 1);
    if with_cheatsheet {
        match seed_cheatsheet(app_dir) {
            Ok(path) => paths.push(path),
            Err(err) => tracing::warn!(error = %format!("{err:#}"), "cheatsheet unavailable"),
        }
    }
    for file in files {
        if file.exists() {
            paths.push(file.clone());
        } else {
            tracing::warn!(path = %file.display(), "skipping missing file");
        }
    }
    paths
}

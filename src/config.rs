//! Persistent default flags.
//!
//! Defaults live in plain flag files: one global `config` under the per-user
//! application directory and an optional `.mdtabrc` in the working directory.
//! Each file holds the same flags the command line accepts, one or more per
//! line, with `#` comments.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Preview re-render delay used when no flag sets one.
pub const DEFAULT_PREVIEW_DELAY_MS: u64 = 150;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_preview: bool,
    pub no_cheatsheet: bool,
    pub perf: bool,
    pub preview_delay_ms: Option<u64>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches accumulate, values from `other` win.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_preview: self.no_preview || other.no_preview,
            no_cheatsheet: self.no_cheatsheet || other.no_cheatsheet,
            perf: self.perf || other.perf,
            preview_delay_ms: other.preview_delay_ms.or(self.preview_delay_ms),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_delay_ms.unwrap_or(DEFAULT_PREVIEW_DELAY_MS))
    }
}

/// Per-user application directory (`mdtab`), following platform conventions.
pub fn app_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mdtab");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mdtab");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mdtab");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("mdtab");
        }
    }

    PathBuf::from(".mdtab")
}

pub fn global_config_path() -> PathBuf {
    app_dir().join("config")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mdtabrc")
}

/// Load flags from `path`; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mdtab defaults (saved with --save)".to_string()];
    if flags.no_preview {
        lines.push("--no-preview".to_string());
    }
    if flags.no_cheatsheet {
        lines.push("--no-cheatsheet".to_string());
    }
    if let Some(ms) = flags.preview_delay_ms {
        lines.push(format!("--preview-delay {ms}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(log) = &flags.debug_log {
        lines.push(format!("--debug-log {}", log.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the flag file at `path` if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list. Unknown tokens (file names,
/// other options) are ignored; a malformed delay is dropped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-preview" => flags.no_preview = true,
            "--no-cheatsheet" => flags.no_cheatsheet = true,
            "--perf" => flags.perf = true,
            "--preview-delay" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.preview_delay_ms = next.parse().ok();
                    i += 1;
                }
            }
            "--debug-log" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.debug_log = Some(PathBuf::from(next));
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--preview-delay=") {
                    flags.preview_delay_ms = value.parse().ok();
                } else if let Some(value) = token.strip_prefix("--debug-log=") {
                    flags.debug_log = Some(PathBuf::from(value));
                }
            }
        }
        i += 1;
    }
    flags
}

//! Platform-specific preset locations and a simple preset store.
//!
//! - **User presets**: `~/.config/cassette/presets/` (Linux),
//!   `~/Library/Application Support/cassette/presets/` (macOS),
//!   `%APPDATA%\cassette\presets\` (Windows)
//! - **User config**: the parent of the presets directory
//!
//! The `*_in` functions take an explicit directory so hosts and tests can
//! keep presets anywhere.
//!
//! # Example
//!
//! ```rust,no_run
//! use cassette_config::{Preset, paths};
//!
//! let dir = paths::ensure_user_presets_dir().unwrap();
//! let path = paths::save_preset_in(&dir, &Preset::new("My Tape")).unwrap();
//! assert_eq!(path.file_name().unwrap(), "My-Tape.toml");
//!
//! for preset in paths::load_presets_in(&dir) {
//!     println!("{}", preset.name);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::{ConfigError, Preset, get_factory_preset};

/// Application name used for directory paths.
const APP_NAME: &str = "cassette";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Extensions recognized as preset files.
const PRESET_EXTENSIONS: &[&str] = &["toml", "json"];

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform has no config dir.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Ensure the user presets directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// File name a preset is saved under.
///
/// Runs of ASCII letters and digits are kept and joined with `-`; a name with
/// none falls back to `Preset`.
///
/// ```rust
/// use cassette_config::paths::preset_file_name;
///
/// assert_eq!(preset_file_name("Lo-Fi  Warble!").unwrap(), "Lo-Fi-Warble.toml");
/// assert_eq!(preset_file_name("***").unwrap(), "Preset.toml");
/// ```
///
/// # Errors
///
/// [`ConfigError::EmptyName`] if the name is blank.
pub fn preset_file_name(name: &str) -> Result<String, ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    let stem = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let stem = if stem.is_empty() { "Preset" } else { stem.as_str() };
    Ok(format!("{stem}.toml"))
}

/// Saves `preset` into `dir` under [`preset_file_name`], replacing any
/// existing file of that name.
pub fn save_preset_in(dir: &Path, preset: &Preset) -> Result<PathBuf, ConfigError> {
    let path = dir.join(preset_file_name(&preset.name)?);
    preset.save(&path)?;
    Ok(path)
}

/// Preset files in `dir`, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_presets_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_preset_extension(path))
        .collect();
    paths.sort();
    paths
}

/// Loads every readable preset in `dir`, sorted by name ignoring case.
///
/// Files that fail to parse or come from a newer format are skipped.
pub fn load_presets_in(dir: &Path) -> Vec<Preset> {
    let mut presets: Vec<Preset> = list_presets_in(dir)
        .into_iter()
        .filter_map(|path| match Preset::load(&path) {
            Ok(preset) => Some(preset),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping preset");
                None
            }
        })
        .collect();
    presets.sort_by_key(|p| p.name.to_lowercase());
    presets
}

/// Finds a preset file in `dir` by path, file name, or stem.
pub fn find_preset_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let direct = dir.join(name);
    if direct.is_file() && has_preset_extension(&direct) {
        return Some(direct);
    }
    PRESET_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
}

/// Find a preset file by path or by name in the user presets directory.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }
    find_preset_in(&user_presets_dir(), name)
}

/// Resolves `key` to a preset: a factory id or name first, then a file
/// path or a preset in the user presets directory.
///
/// # Errors
///
/// [`ConfigError::PresetNotFound`] if nothing matches, or the load error of
/// the file that was found.
pub fn resolve_preset(key: &str) -> Result<Preset, ConfigError> {
    resolve_preset_in(&user_presets_dir(), key)
}

/// [`resolve_preset`] searching `dir` instead of the user presets directory.
pub fn resolve_preset_in(dir: &Path, key: &str) -> Result<Preset, ConfigError> {
    if let Some(preset) = get_factory_preset(key) {
        return Ok(preset);
    }
    let path = PathBuf::from(key);
    let found = if path.is_file() {
        Some(path)
    } else {
        find_preset_in(dir, key)
    };
    match found {
        Some(path) => Preset::load(path),
        None => Err(ConfigError::PresetNotFound(key.to_string())),
    }
}

/// Get the preset name from a file path.
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

fn has_preset_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PRESET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

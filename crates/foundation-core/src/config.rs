#![forbid(unsafe_code)]

//! User settings for create-foundation.
//!
//! A single optional TOML file discovered under the XDG config directory (or
//! `~/.config`), or given explicitly with `--config`.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::bundled_template_dir;
use crate::vocab::{Ide, Vocabulary};

/// Environment variable that overrides the template root.
pub const TEMPLATE_DIR_ENV: &str = "FOUNDATION_TEMPLATE_DIR";

pub const DEFAULT_GIT_BRANCH: &str = "main";

/// Parsed settings file contents.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory holding `base/` and `extras/`.
    pub template_dir: Option<PathBuf>,

    pub git_branch: Option<String>,

    /// Launcher command per IDE, keyed by IDE name (`cursor`, `vscode`).
    #[serde(default)]
    pub ide_commands: BTreeMap<String, String>,
}

impl Settings {
    pub fn git_branch(&self) -> &str {
        self.git_branch
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(DEFAULT_GIT_BRANCH)
    }

    pub fn ide_command(&self, ide: Ide) -> &str {
        self.ide_commands
            .get(ide.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| ide.command())
    }
}

#[derive(Debug)]
pub enum SettingsError {
    NotFound,
    Io {
        path: PathBuf,
        source: io::Error,
    },
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidSettings {
        path: PathBuf,
        message: String,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::NotFound => write!(f, "no settings file found"),
            SettingsError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            SettingsError::ParseToml { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            SettingsError::InvalidSettings { path, message } => {
                write!(f, "{}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::ParseToml { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Settings search paths in priority order.
pub fn default_settings_paths() -> Vec<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        return vec![PathBuf::from(xdg).join("create-foundation").join("config.toml")];
    }

    match env::var_os("HOME") {
        Some(home) => vec![
            PathBuf::from(home)
                .join(".config")
                .join("create-foundation")
                .join("config.toml"),
        ],
        None => Vec::new(),
    }
}

/// Load settings from disk, optionally overriding the discovery path.
pub fn load_settings(path_override: Option<&Path>) -> Result<(PathBuf, Settings), SettingsError> {
    if let Some(path) = path_override {
        debug!(path = %path.display(), "settings: load override");
        return load_settings_at(path);
    }

    for path in default_settings_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "settings: load");
            return load_settings_at(&path);
        }
    }

    Err(SettingsError::NotFound)
}

/// Like [`load_settings`], but a missing discovered file yields defaults.
///
/// A missing `--config` path is still an error.
pub fn load_settings_or_default(path_override: Option<&Path>) -> Result<Settings, SettingsError> {
    match load_settings(path_override) {
        Ok((_, settings)) => Ok(settings),
        Err(SettingsError::NotFound) => Ok(Settings::default()),
        Err(e) => Err(e),
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
fn load_settings_at(path: &Path) -> Result<(PathBuf, Settings), SettingsError> {
    let content = fs::read_to_string(path).map_err(|e| SettingsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings = toml::from_str::<Settings>(&content).map_err(|e| SettingsError::ParseToml {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate_settings(path, &settings)?;
    Ok((path.to_path_buf(), settings))
}

fn validate_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    for (name, command) in &settings.ide_commands {
        if Ide::parse(name).is_none() {
            return Err(SettingsError::InvalidSettings {
                path: path.to_path_buf(),
                message: format!(
                    "ide_commands.{name}: unknown IDE (expected one of {})",
                    Ide::valid_values()
                ),
            });
        }
        if command.trim().is_empty() {
            return Err(SettingsError::InvalidSettings {
                path: path.to_path_buf(),
                message: format!("ide_commands.{name} must not be empty"),
            });
        }
    }
    Ok(())
}

/// Template root: `FOUNDATION_TEMPLATE_DIR`, then settings, then the bundled
/// templates.
pub fn template_root(settings: &Settings) -> PathBuf {
    if let Some(dir) = env::var_os(TEMPLATE_DIR_ENV).filter(|v| !v.is_empty()) {
        debug!(dir = ?dir, "template root from environment");
        return PathBuf::from(dir);
    }
    if let Some(dir) = &settings.template_dir {
        return dir.clone();
    }
    bundled_template_dir()
}

//! Settings file (`settings.toml`) loading and location.
//!
//! Lookup order: `--config`, then `./affilink.toml`, then
//! `~/.config/affilink/settings.toml`. Every key has a default, so running
//! without any file is valid.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use affilink_catalog::{LinkConfig, LinkFormatter, SlugRules};
use affilink_store::{BackupManager, DEFAULT_RETENTION};
use serde::{Deserialize, Serialize};

use crate::CliError;

const LOCAL_SETTINGS: &str = "affilink.toml";

/// Canonical path to the user settings file: `~/.config/affilink/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("affilink").join("settings.toml")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Product CSV. Relative paths are resolved against the settings file.
    pub data_path: PathBuf,
    /// Snapshot directory; `<data dir>/backups` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
    pub retention: usize,
    pub links: LinkConfig,
    pub slugs: SlugRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("products.csv"),
            backup_dir: None,
            retention: DEFAULT_RETENTION,
            links: LinkConfig::default(),
            slugs: SlugRules::default(),
        }
    }
}

impl Settings {
    pub(crate) fn parse(contents: &str) -> Result<Self, String> {
        let settings: Settings = toml::from_str(contents).map_err(|e| e.to_string())?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<(), String> {
        if self.slugs.min_len == 0 {
            return Err("slugs.min_len must be at least 1".to_string());
        }
        if self.slugs.max_len < self.slugs.min_len {
            return Err(format!(
                "slugs.max_len ({}) is below slugs.min_len ({})",
                self.slugs.max_len, self.slugs.min_len
            ));
        }
        if self.retention == 0 {
            return Err("retention must be at least 1".to_string());
        }
        self.links.formatter().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Make relative paths relative to `base` (the settings file's directory).
    fn resolve_paths(&mut self, base: &Path) {
        if self.data_path.is_relative() {
            self.data_path = base.join(&self.data_path);
        }
        if let Some(dir) = self.backup_dir.as_mut().filter(|d| d.is_relative()) {
            *dir = base.join(&*dir);
        }
    }

    pub(crate) fn link_formatter(&self) -> Result<LinkFormatter, CliError> {
        Ok(self.links.formatter()?)
    }

    /// Backup manager for `data_path`, honoring `backup_dir` and `retention`.
    pub(crate) fn backup_manager(&self, data_path: &Path) -> BackupManager {
        let manager = match &self.backup_dir {
            Some(dir) => {
                let stem = data_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("products");
                BackupManager::new(dir, stem)
            }
            None => BackupManager::for_source(data_path),
        };
        manager.with_retention(self.retention)
    }
}

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingsSource {
    Flag(PathBuf),
    Local(PathBuf),
    User(PathBuf),
    Defaults,
}

impl SettingsSource {
    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Local(p) | Self::User(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Local(p) => write!(f, "{} (working directory)", p.display()),
            Self::User(p) => write!(f, "{} (user config)", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Pick the settings file to use. An explicit path is returned even when
/// it does not exist, so loading it reports the problem.
pub(crate) fn locate(flag: Option<&Path>) -> SettingsSource {
    locate_in(flag, Path::new("."), &settings_path())
}

fn locate_in(flag: Option<&Path>, cwd: &Path, user: &Path) -> SettingsSource {
    if let Some(p) = flag {
        return SettingsSource::Flag(p.to_path_buf());
    }
    let local = cwd.join(LOCAL_SETTINGS);
    if local.is_file() {
        return SettingsSource::Local(local);
    }
    if user.is_file() {
        return SettingsSource::User(user.to_path_buf());
    }
    SettingsSource::Defaults
}

/// Load settings from `source`, or defaults when there is no file.
pub(crate) fn load(source: &SettingsSource) -> Result<Settings, CliError> {
    let Some(path) = source.path() else {
        return Ok(Settings::default());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("Cannot read {}: {}", path.display(), e)))?;
    let mut settings = Settings::parse(&contents)
        .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    settings.resolve_paths(base);
    log::debug!("Loaded settings from {}", source);
    Ok(settings)
}

/// Write `settings` to `path`, creating parent directories.
pub(crate) fn save(settings: &Settings, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(settings).map_err(io::Error::other)?;

    // Write atomically
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) mod analyze;
pub(crate) mod backups;
pub(crate) mod bulk;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod slugs;

use std::path::PathBuf;

use affilink_catalog::LinkFormatter;
use affilink_store::{BackupManager, RecordStore};

use crate::CliError;
use crate::settings::{self, Settings, SettingsSource};

/// Effective settings plus command-line overrides.
pub(crate) struct Context {
    pub settings: Settings,
    pub source: SettingsSource,
    pub data_path: PathBuf,
}

impl Context {
    pub(crate) fn load(source: SettingsSource, data: Option<PathBuf>) -> Result<Self, CliError> {
        let settings = settings::load(&source)?;
        let data_path = data.unwrap_or_else(|| settings.data_path.clone());
        Ok(Self {
            settings,
            source,
            data_path,
        })
    }

    pub(crate) fn backups(&self) -> BackupManager {
        self.settings.backup_manager(&self.data_path)
    }

    pub(crate) fn links(&self) -> Result<LinkFormatter, CliError> {
        self.settings.link_formatter()
    }

    /// Load the product table with the configured rules and backups.
    pub(crate) fn open_store(&self) -> Result<RecordStore, CliError> {
        if !self.data_path.exists() {
            return Err(CliError::config(format!(
                "No product file at {}. Set data_path in the settings file or pass --data.",
                self.data_path.display()
            )));
        }
        let store = RecordStore::open(&self.data_path)?
            .with_rules(self.settings.slugs.clone())
            .with_backups(self.backups());
        log::debug!(
            "Loaded {} records from {}",
            store.table().len(),
            self.data_path.display()
        );
        Ok(store)
    }
}

//! The record store: the owned table plus its commit path.
//!
//! Every accepted mutation runs validate → snapshot → commit → persist, in
//! that order. The store is mutated through `&mut self`, so one mutation
//! sequence cannot interleave with another.

use std::path::{Path, PathBuf};

use affilink_catalog::{
    Matches, Record, SlugRules, Table, TableStats, load_table, save_table,
};

use crate::backup::{BackupManager, SnapshotId};
use crate::error::StoreError;

/// A slug assignment already checked against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlugChange {
    pub id: String,
    pub slug: Option<String>,
}

/// The product table bound to its source file and backup directory.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    table: Table,
    rules: SlugRules,
    backups: BackupManager,
    dirty: bool,
}

impl RecordStore {
    /// Load the table at `path` with default rules and `<dir>/backups`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = load_table(&path)?;
        Ok(Self::from_table(path, table))
    }

    /// Wrap a table that was loaded elsewhere; `path` is where it persists.
    pub fn from_table(path: impl Into<PathBuf>, table: Table) -> Self {
        let path = path.into();
        let backups = BackupManager::for_source(&path);
        Self {
            path,
            table,
            rules: SlugRules::default(),
            backups,
            dirty: false,
        }
    }

    pub fn with_rules(mut self, rules: SlugRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = backups;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn rules(&self) -> &SlugRules {
        &self.rules
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// True after a failed persist, until [`Self::persist`] succeeds.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: &str) -> Result<&Record, StoreError> {
        self.table.get(id).ok_or_else(|| StoreError::not_found(id))
    }

    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }

    pub fn search(&self, query: &str) -> Matches<'_> {
        self.table.search(query)
    }

    /// Assign `new_slug` to record `id`.
    ///
    /// Validation happens before anything is written, so a rejected slug
    /// leaves both the table and the backup directory untouched. Assigning
    /// the slug a record already has is a no-op.
    pub fn update_slug(&mut self, id: &str, new_slug: &str) -> Result<Record, StoreError> {
        self.rules.validate(new_slug)?;
        let current = self.get(id)?;
        if current.slug.as_deref() == Some(new_slug) {
            return Ok(current.clone());
        }
        self.rules.check_assignable(new_slug, &self.table, id)?;

        self.commit(vec![SlugChange {
            id: id.to_string(),
            slug: Some(new_slug.to_string()),
        }])?;
        log::debug!("Slug for {} set to '{}'", id, new_slug);
        self.get(id).cloned()
    }

    /// Remove the slug from record `id`.
    pub fn clear_slug(&mut self, id: &str) -> Result<Record, StoreError> {
        let current = self.get(id)?;
        if !current.has_slug() {
            return Ok(current.clone());
        }
        self.commit(vec![SlugChange {
            id: id.to_string(),
            slug: None,
        }])?;
        log::debug!("Slug for {} cleared", id);
        self.get(id).cloned()
    }

    /// Write the in-memory table to the source file.
    ///
    /// Use this to retry after a [`StoreError::Persist`]; it takes no new
    /// snapshot.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        save_table(&self.table, &self.path).map_err(|source| StoreError::Persist {
            path: self.path.display().to_string(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the table with a snapshot's contents.
    ///
    /// The current table is snapshotted first, so a restore can itself be
    /// undone.
    pub fn restore(&mut self, id: &SnapshotId) -> Result<(), StoreError> {
        let restored = self.backups.read_snapshot(id)?;
        let pre_image = self.backups.snapshot(&self.table)?;
        log::debug!("Pre-restore state saved as {}", pre_image);
        self.table = restored;
        self.dirty = true;
        self.persist()?;
        log::debug!("Restored {} records from snapshot {}", self.table.len(), id);
        Ok(())
    }

    /// Apply prevalidated changes as one snapshot + persist.
    ///
    /// On `Persist` failure all changes are live in memory.
    pub(crate) fn commit(&mut self, changes: Vec<SlugChange>) -> Result<usize, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }
        let snapshot = self.backups.snapshot(&self.table)?;
        log::debug!(
            "Snapshot {} taken before committing {} change(s)",
            snapshot,
            changes.len()
        );

        let count = changes.len();
        for change in changes {
            self.table.replace_slug(&change.id, change.slug);
        }
        self.dirty = true;
        self.persist()?;
        Ok(count)
    }
}

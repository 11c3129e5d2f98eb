//! Timestamped table snapshots with a retention limit.
//!
//! Every snapshot is one CSV file in the backup directory named
//! `<stem>_backup_<YYYYMMDD_HHMMSS>_<seq>.csv`. Ordering is by creation time,
//! then by the sequence number, which keeps snapshots taken within the same
//! second in the order they were written.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use affilink_catalog::{Table, load_table, save_table};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::BackupError;

/// Snapshots kept after each prune.
pub const DEFAULT_RETENTION: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Identifies a snapshot; orders by creation time, then sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId {
    created_at: NaiveDateTime,
    seq: u64,
}

impl SnapshotId {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at.and_utc()
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{:06}",
            self.created_at.format(TIMESTAMP_FORMAT),
            self.seq
        )
    }
}

impl FromStr for SnapshotId {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BackupError::InvalidId(s.to_string());
        let (timestamp, seq) = s.rsplit_once('_').ok_or_else(invalid)?;
        let created_at =
            NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| invalid())?;
        let seq = seq.parse().map_err(|_| invalid())?;
        Ok(Self { created_at, seq })
    }
}

/// A snapshot found in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub path: PathBuf,
}

impl SnapshotInfo {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

/// Writes and prunes snapshots for one source file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    stem: String,
    retention: usize,
    next_seq: u64,
}

impl BackupManager {
    /// Manage snapshots of files named `<stem>` in `dir`.
    ///
    /// The directory is created on the first snapshot.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            retention: DEFAULT_RETENTION,
            next_seq: 1,
        }
    }

    /// Backups for `source` in `<source dir>/backups`, named after its stem.
    pub fn for_source(source: &Path) -> Self {
        let dir = source
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self::new(dir, source_stem(source))
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Serialize `table` to a new snapshot, then prune to the retention limit.
    ///
    /// Prune failures are logged and do not fail the snapshot.
    pub fn snapshot(&mut self, table: &Table) -> Result<SnapshotId, BackupError> {
        fs::create_dir_all(&self.dir).map_err(|e| BackupError::io(&self.dir, e))?;
        let existing = self.list_snapshots()?;

        // Never older than the newest existing snapshot.
        let now = Utc::now().naive_utc().trunc_subsecs(0);
        let created_at = existing
            .first()
            .map_or(now, |newest| newest.id.created_at.max(now));
        let seq = existing
            .iter()
            .map(|s| s.id.seq + 1)
            .max()
            .unwrap_or(1)
            .max(self.next_seq);

        let id = SnapshotId { created_at, seq };
        let path = self.path_for(&id);
        save_table(table, &path).map_err(|e| BackupError::io(&path, e))?;
        self.next_seq = seq + 1;
        log::debug!("Snapshot {} written to {}", id, path.display());

        match self.prune(self.retention) {
            Ok(removed) if !removed.is_empty() => {
                log::debug!("Pruned {} old snapshot(s)", removed.len());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Could not prune old backups: {}", e),
        }

        Ok(id)
    }

    /// Delete the oldest snapshots beyond `retention`. Returns what was removed.
    pub fn prune(&self, retention: usize) -> Result<Vec<SnapshotId>, BackupError> {
        let snapshots = self.list_snapshots()?;
        let mut removed = Vec::new();
        for stale in snapshots.iter().skip(retention.max(1)) {
            fs::remove_file(&stale.path).map_err(|e| BackupError::io(&stale.path, e))?;
            removed.push(stale.id);
        }
        Ok(removed)
    }

    /// Snapshots on disk, newest first. A missing directory has none.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, BackupError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_backup_", self.stem);
        let mut snapshots: Vec<SnapshotInfo> = fs::read_dir(&self.dir)
            .map_err(|e| BackupError::io(&self.dir, e))?
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let id = name
                    .to_str()?
                    .strip_prefix(&prefix)?
                    .strip_suffix(".csv")?
                    .parse()
                    .ok()?;
                Some(SnapshotInfo {
                    id,
                    path: entry.path(),
                })
            })
            .collect();
        snapshots.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(snapshots)
    }

    /// Load a snapshot back into a table.
    pub fn read_snapshot(&self, id: &SnapshotId) -> Result<Table, BackupError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(BackupError::NotFound(id.to_string()));
        }
        load_table(&path).map_err(|source| BackupError::Unreadable {
            id: id.to_string(),
            source,
        })
    }

    fn path_for(&self, id: &SnapshotId) -> PathBuf {
        self.dir.join(format!("{}_backup_{}.csv", self.stem, id))
    }
}

fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("products")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_id_round_trip() {
        let id: SnapshotId = "20261017_101500_000042".parse().unwrap();
        assert_eq!(id.seq(), 42);
        assert_eq!(id.to_string(), "20261017_101500_000042");
    }

    #[test]
    fn test_snapshot_id_orders_by_time_then_seq() {
        let a: SnapshotId = "20261017_101500_000009".parse().unwrap();
        let b: SnapshotId = "20261017_101500_000010".parse().unwrap();
        let c: SnapshotId = "20261017_101501_000001".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
        let wide: SnapshotId = "20261017_101500_1000000".parse().unwrap();
        assert!(b < wide);
    }

    #[test]
    fn test_invalid_snapshot_ids() {
        assert!("garbage".parse::<SnapshotId>().is_err());
        assert!("20261017_101500_x".parse::<SnapshotId>().is_err());
        assert!("2026_000001".parse::<SnapshotId>().is_err());
    }

    #[test]
    fn test_for_source_layout() {
        let manager = BackupManager::for_source(Path::new("/data/products.csv"));
        assert_eq!(manager.dir(), Path::new("/data/backups"));
        assert_eq!(
            manager.path_for(&"20261017_101500_000001".parse().unwrap()),
            PathBuf::from("/data/backups/products_backup_20261017_101500_000001.csv")
        );
    }
}

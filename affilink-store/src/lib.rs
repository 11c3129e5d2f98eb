//! Persistence and batch operations for the product catalog.
//!
//! Wraps an `affilink-catalog` table in a [`RecordStore`] that snapshots the
//! pre-image of every change through a [`BackupManager`] before writing the
//! canonical CSV, and provides whole-table operations on top.

pub mod backup;
pub mod bulk;
pub mod error;
pub mod export;
pub mod store;

pub use backup::{BackupManager, DEFAULT_RETENTION, SnapshotId, SnapshotInfo};
pub use bulk::{
    ApplyOutcome, FillOutcome, FillPlan, InvalidSlug, RejectReason, Rejection, SlugReport,
    SlugUpdate, Suggestion, SuggestionCause, analyze, apply_updates, auto_fill, plan_auto_fill,
    read_updates,
};
pub use error::{BackupError, BulkError, StoreError};
pub use export::{LinkRow, ProgramConfig, ProgramProduct, export_links, program_config, write_links_csv};
pub use store::RecordStore;

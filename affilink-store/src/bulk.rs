//! Whole-table slug operations: analysis, auto-fill, and batch updates.
//!
//! Batches commit through a single snapshot and a single persist. Rejected
//! entries are reported per record; a backup or persist failure stops the
//! run with a [`BulkError`].

use std::collections::{BTreeMap, HashSet};

use affilink_catalog::slug::derive;
use affilink_catalog::{SlugRules, Table, ValidationReason};
use serde::Deserialize;

use crate::error::{BulkError, StoreError};
use crate::store::{RecordStore, SlugChange};

// ── Analysis ────────────────────────────────────────────────────────────────

/// A record whose stored slug breaks the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSlug {
    pub id: String,
    pub slug: String,
    pub reason: ValidationReason,
}

/// Why a suggestion was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionCause {
    Missing,
    Invalid(ValidationReason),
}

/// A proposed slug for a record that lacks a usable one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub current: Option<String>,
    pub suggested: String,
    pub cause: SuggestionCause,
}

/// Result of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlugReport {
    pub total: usize,
    pub missing_count: usize,
    pub invalid: Vec<InvalidSlug>,
    /// Lowercased slug → ids sharing it. Empty unless the source file was
    /// edited by hand into a state the store would never produce.
    pub duplicate_groups: BTreeMap<String, Vec<String>>,
    pub suggestions: Vec<Suggestion>,
}

impl SlugReport {
    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    pub fn with_slugs(&self) -> usize {
        self.total - self.missing_count
    }

    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.with_slugs() as f64 / self.total as f64 * 100.0
        }
    }
}

/// Report missing, invalid and duplicated slugs.
///
/// Duplicates are logged as a warning and left alone. Suggestions do not
/// collide with existing slugs or with each other.
pub fn analyze(table: &Table, rules: &SlugRules) -> SlugReport {
    let mut report = SlugReport {
        total: table.len(),
        ..Default::default()
    };
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut taken = table.slug_set(None);

    for record in table {
        let cause = match record.slug.as_deref() {
            None => {
                report.missing_count += 1;
                SuggestionCause::Missing
            }
            Some(slug) => {
                groups
                    .entry(slug.to_lowercase())
                    .or_default()
                    .push(record.id.clone());
                match rules.validate(slug) {
                    Ok(()) => continue,
                    Err(e) => {
                        report.invalid.push(InvalidSlug {
                            id: record.id.clone(),
                            slug: slug.to_string(),
                            reason: e.reason.clone(),
                        });
                        SuggestionCause::Invalid(e.reason)
                    }
                }
            }
        };

        if let Some(suggested) = reserve(&record.name, rules, &mut taken) {
            report.suggestions.push(Suggestion {
                id: record.id.clone(),
                name: record.name.clone(),
                current: record.slug.clone(),
                suggested,
                cause,
            });
        }
    }

    groups.retain(|_, ids| ids.len() > 1);
    if !groups.is_empty() {
        log::warn!(
            "{} slug(s) are shared by more than one record; fix them by hand",
            groups.len()
        );
    }
    report.duplicate_groups = groups;
    report
}

/// Derive and resolve a slug for `name`, marking it taken.
fn reserve(name: &str, rules: &SlugRules, taken: &mut HashSet<String>) -> Option<String> {
    let candidate = derive(name);
    if candidate.is_empty() {
        return None;
    }
    let slug = rules.resolve_among(&candidate, taken).ok()?;
    taken.insert(slug.clone());
    Some(slug)
}

// ── Auto-fill ───────────────────────────────────────────────────────────────

/// Slugs that [`auto_fill`] would assign, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillPlan {
    /// `(id, slug)` pairs.
    pub assignments: Vec<(String, String)>,
    /// Records without a slug whose name yields none.
    pub skipped: Vec<String>,
}

/// Outcome of [`auto_fill`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// Plan slugs for every record that has none, without touching the store.
///
/// Deterministic for a given table: records are visited in table order and
/// each assignment is reserved before the next is resolved.
pub fn plan_auto_fill(table: &Table, rules: &SlugRules) -> FillPlan {
    let mut plan = FillPlan::default();
    let mut taken = table.slug_set(None);

    for record in table.iter().filter(|r| !r.has_slug()) {
        match reserve(&record.name, rules, &mut taken) {
            Some(slug) => plan.assignments.push((record.id.clone(), slug)),
            None => {
                log::debug!("Skipping {}: no slug can be derived from its name", record.id);
                plan.skipped.push(record.id.clone());
            }
        }
    }
    plan
}

/// Assign a derived slug to every record that has none.
pub fn auto_fill(store: &mut RecordStore) -> Result<FillOutcome, BulkError> {
    let plan = plan_auto_fill(store.table(), store.rules());
    let updated: Vec<String> = plan.assignments.iter().map(|(id, _)| id.clone()).collect();
    let changes = plan
        .assignments
        .into_iter()
        .map(|(id, slug)| SlugChange {
            id,
            slug: Some(slug),
        })
        .collect();

    commit_batch(store, changes)?;
    log::debug!(
        "Auto-fill assigned {} slug(s), skipped {}",
        updated.len(),
        plan.skipped.len()
    );
    Ok(FillOutcome {
        updated,
        skipped: plan.skipped,
    })
}

// ── Explicit updates ────────────────────────────────────────────────────────

/// One requested assignment, e.g. a row of an updates CSV with `id,slug`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlugUpdate {
    #[serde(alias = "record_id")]
    pub id: String,
    #[serde(alias = "new_slug")]
    pub slug: String,
}

impl SlugUpdate {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
        }
    }
}

/// Why an update was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownId,
    /// The same id appeared earlier in the batch.
    RepeatedId,
    Invalid(ValidationReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub update: SlugUpdate,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: Vec<String>,
    pub rejected: Vec<Rejection>,
}

/// Apply a list of explicit assignments.
///
/// Entries are checked in order against the table as it stands after the
/// earlier accepted entries, so a batch can move a slug from one record to
/// another if the release comes first.
pub fn apply_updates(
    store: &mut RecordStore,
    updates: Vec<SlugUpdate>,
) -> Result<ApplyOutcome, BulkError> {
    let mut outcome = ApplyOutcome::default();
    let mut working = store.table().clone();
    let mut seen = HashSet::new();
    let mut changes = Vec::new();

    for update in updates {
        let reason = if !working.contains(&update.id) {
            Some(RejectReason::UnknownId)
        } else if !seen.insert(update.id.clone()) {
            Some(RejectReason::RepeatedId)
        } else {
            store
                .rules()
                .check_assignable(&update.slug, &working, &update.id)
                .err()
                .map(|e| RejectReason::Invalid(e.reason))
        };

        match reason {
            Some(reason) => {
                log::debug!("Rejected {} → '{}': {:?}", update.id, update.slug, reason);
                outcome.rejected.push(Rejection { update, reason });
            }
            None => {
                let unchanged = working
                    .get(&update.id)
                    .is_some_and(|r| r.slug.as_deref() == Some(update.slug.as_str()));
                if !unchanged {
                    working.replace_slug(&update.id, Some(update.slug.clone()));
                    changes.push(SlugChange {
                        id: update.id.clone(),
                        slug: Some(update.slug),
                    });
                }
                outcome.applied.push(update.id);
            }
        }
    }

    commit_batch(store, changes)?;
    Ok(outcome)
}

/// Read `id,slug` rows (headers `record_id`/`new_slug` also accepted).
pub fn read_updates<R: std::io::Read>(reader: R) -> Result<Vec<SlugUpdate>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let updates = reader
        .deserialize::<SlugUpdate>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(updates)
}

fn commit_batch(store: &mut RecordStore, changes: Vec<SlugChange>) -> Result<usize, BulkError> {
    let count = changes.len();
    store.commit(changes).map_err(|source| BulkError {
        committed: if matches!(source, StoreError::Persist { .. }) {
            count
        } else {
            0
        },
        source,
    })
}

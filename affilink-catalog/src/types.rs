//! Data model types for the product catalog.
//!
//! A [`Table`] is the in-memory image of the source CSV: an ordered list of
//! [`Record`]s plus the [`Schema`] describing the header row it came from.

use std::collections::{HashMap, HashSet};

use crate::error::FormatError;

// ── Record ──────────────────────────────────────────────────────────────────

/// One catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Externally assigned identifier. Never regenerated.
    pub id: String,
    /// Display name. May be empty.
    pub name: String,
    pub description: Option<String>,
    /// Affiliate slug. `None` means "not yet assigned".
    pub slug: Option<String>,
    pub image_refs: Vec<String>,
    /// Values of source columns the catalog does not interpret, in schema order.
    pub extra: Vec<String>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = non_empty(slug.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image_refs.push(image.into());
        self
    }

    pub fn has_slug(&self) -> bool {
        self.slug.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Case-insensitive substring match over name and description.
    ///
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

// ── Schema ──────────────────────────────────────────────────────────────────

/// A record field that has a dedicated CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Description,
    Slug,
    ImageRefs,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Id,
        Field::Name,
        Field::Description,
        Field::Slug,
        Field::ImageRefs,
    ];

    /// Header written for this field when the table has no source layout.
    pub fn canonical_header(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Description => "description",
            Field::Slug => "slug",
            Field::ImageRefs => "image_refs",
        }
    }

    /// Map a raw header cell to a field.
    ///
    /// Matching ignores case, surrounding whitespace and a UTF-8 BOM, and
    /// accepts the legacy spellings used by older exports (`record_id`,
    /// `URL Slug`, `Images`).
    pub fn from_header(header: &str) -> Option<Field> {
        let normalized = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        match normalized.as_str() {
            "id" | "record_id" => Some(Field::Id),
            "name" => Some(Field::Name),
            "description" => Some(Field::Description),
            "slug" | "url slug" | "url_slug" => Some(Field::Slug),
            "image_refs" | "images" => Some(Field::ImageRefs),
            _ => None,
        }
    }
}

/// What a CSV column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Field(Field),
    /// Index into [`Record::extra`].
    Extra(usize),
}

/// The header layout a table was loaded with, reused when saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    headers: Vec<String>,
    columns: Vec<Column>,
    extra_count: usize,
}

impl Default for Schema {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Schema {
    /// The five known fields under their canonical headers.
    pub fn canonical() -> Self {
        Self {
            headers: Field::ALL
                .iter()
                .map(|f| f.canonical_header().to_string())
                .collect(),
            columns: Field::ALL.iter().map(|f| Column::Field(*f)).collect(),
            extra_count: 0,
        }
    }

    /// Build a schema from a CSV header row.
    ///
    /// The `id` column is required. Known fields that are absent are simply
    /// left empty on every record; they are appended to the header on save.
    pub fn from_headers<I, S>(headers: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self {
            headers: Vec::new(),
            columns: Vec::new(),
            extra_count: 0,
        };
        let mut seen = HashSet::new();

        for raw in headers {
            let raw = raw.as_ref();
            let clean = raw.trim_start_matches('\u{feff}').trim().to_string();
            let column = match Field::from_header(raw) {
                Some(field) => {
                    if !seen.insert(field) {
                        return Err(FormatError::DuplicateColumn(clean));
                    }
                    Column::Field(field)
                }
                None => {
                    schema.extra_count += 1;
                    Column::Extra(schema.extra_count - 1)
                }
            };
            schema.headers.push(clean);
            schema.columns.push(column);
        }

        if !seen.contains(&Field::Id) {
            return Err(FormatError::MissingIdColumn);
        }

        for field in Field::ALL {
            if !seen.contains(&field) {
                log::debug!("Column '{}' not present; values left empty", field.canonical_header());
                schema.headers.push(field.canonical_header().to_string());
                schema.columns.push(Column::Field(field));
            }
        }

        Ok(schema)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn extra_count(&self) -> usize {
        self.extra_count
    }
}

// ── Table ───────────────────────────────────────────────────────────────────

/// Ordered product records keyed by id.
///
/// Row order is insertion order and is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    schema: Schema,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a table with the canonical schema from already-shaped records.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self, FormatError> {
        let mut table = Self::new(Schema::canonical());
        for record in records {
            table.push(record)?;
        }
        Ok(table)
    }

    /// Append a record, enforcing a non-empty, unique id.
    ///
    /// `extra` is padded or cut to the schema's extra column count.
    pub fn push(&mut self, mut record: Record) -> Result<(), FormatError> {
        let line = self.records.len() as u64 + 2;
        if record.id.is_empty() {
            return Err(FormatError::EmptyId { line });
        }
        if self.index.contains_key(&record.id) {
            return Err(FormatError::DuplicateId {
                id: record.id,
                line,
            });
        }
        record.extra.resize(self.schema.extra_count(), String::new());
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Overwrite a record's slug without any validation.
    ///
    /// Returns the updated record, or `None` if the id is unknown. Callers
    /// that need the slug invariants must validate first.
    pub fn replace_slug(&mut self, id: &str, slug: Option<String>) -> Option<&Record> {
        let i = *self.index.get(id)?;
        let record = &mut self.records[i];
        record.slug = slug.and_then(non_empty);
        Some(record)
    }

    /// Id of the record holding `slug` (case-insensitive), skipping `exclude_id`.
    pub fn slug_owner(&self, slug: &str, exclude_id: Option<&str>) -> Option<&str> {
        let wanted = slug.to_lowercase();
        self.records
            .iter()
            .filter(|r| exclude_id != Some(r.id.as_str()))
            .find(|r| r.slug.as_deref().is_some_and(|s| s.to_lowercase() == wanted))
            .map(|r| r.id.as_str())
    }

    /// All assigned slugs, lowercased, skipping `exclude_id`.
    pub fn slug_set(&self, exclude_id: Option<&str>) -> HashSet<String> {
        self.records
            .iter()
            .filter(|r| exclude_id != Some(r.id.as_str()))
            .filter_map(|r| r.slug.as_deref())
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Counts over the current in-memory state.
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            if !record.name.is_empty() {
                stats.with_names += 1;
            }
            if record.has_description() {
                stats.with_descriptions += 1;
            }
            if !record.image_refs.is_empty() {
                stats.with_images += 1;
            }
            if record.has_slug() {
                stats.with_slugs += 1;
            }
        }
        stats
    }

    /// Lazily match records whose name or description contains `query`,
    /// ignoring case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Matches<'_> {
        Matches {
            records: self.records.iter(),
            needle: query.to_lowercase(),
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Iterator returned by [`Table::search`]. Clone it to restart.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    records: std::slice::Iter<'a, Record>,
    needle: String,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.records.by_ref().find(|r| r.matches(needle))
    }
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary counts reported by [`Table::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub total: usize,
    pub with_names: usize,
    pub with_descriptions: usize,
    pub with_images: usize,
    pub with_slugs: usize,
}

impl TableStats {
    /// Percentage of records that have a slug (0 for an empty table).
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.with_slugs as f64 / self.total as f64 * 100.0
        }
    }
}

//! CSV loading and saving for the product table.
//!
//! The source file is a header row followed by one row per product. Images
//! share a single cell as a comma-separated list; a locator that itself
//! contains a comma or quote is quoted inside the cell.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FormatError;
use crate::types::{Column, Field, Record, Schema, Table, non_empty};

/// Load a table from a CSV file.
pub fn load_table(path: &Path) -> Result<Table, FormatError> {
    let contents = fs::read_to_string(path).map_err(|e| FormatError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let table = parse_table(&contents)?;
    log::debug!("Loaded {} records from {}", table.len(), path.display());
    Ok(table)
}

/// Parse CSV content into a table.
///
/// Fails on a missing `id` column, an empty or repeated id, or a row whose
/// field count differs from the header.
pub fn parse_table(content: &str) -> Result<Table, FormatError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let schema = Schema::from_headers(reader.headers()?.iter())?;
    let mut table = Table::new(schema.clone());

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let record = record_from_row(&schema, &row);
        table.push(record).map_err(|e| match e {
            FormatError::EmptyId { .. } => FormatError::EmptyId { line },
            FormatError::DuplicateId { id, .. } => FormatError::DuplicateId { id, line },
            other => other,
        })?;
    }

    Ok(table)
}

fn record_from_row(schema: &Schema, row: &csv::StringRecord) -> Record {
    let mut record = Record {
        extra: vec![String::new(); schema.extra_count()],
        ..Default::default()
    };
    for (column, value) in schema.columns().iter().zip(row.iter()) {
        match column {
            Column::Field(Field::Id) => record.id = value.trim().to_string(),
            Column::Field(Field::Name) => record.name = value.to_string(),
            Column::Field(Field::Description) => record.description = non_empty(value.to_string()),
            Column::Field(Field::Slug) => record.slug = non_empty(value.trim().to_string()),
            Column::Field(Field::ImageRefs) => record.image_refs = split_images(value),
            Column::Extra(i) => record.extra[*i] = value.to_string(),
        }
    }
    record
}

/// Split an image cell into trimmed, non-empty locators.
pub fn split_images(cell: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(cell.as_bytes());
    reader
        .records()
        .filter_map(Result::ok)
        .flat_map(|row| {
            row.iter()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Inverse of [`split_images`].
pub fn join_images(images: &[String]) -> Result<String, csv::Error> {
    if images.is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(images)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(io::Error::other(e.to_string())))?;
    let cell = String::from_utf8(bytes).map_err(|e| csv::Error::from(io::Error::other(e)))?;
    Ok(cell.trim_end_matches('\n').to_string())
}

fn row_for_record(schema: &Schema, record: &Record) -> Result<Vec<String>, csv::Error> {
    schema
        .columns()
        .iter()
        .map(|column| {
            Ok(match column {
                Column::Field(Field::Id) => record.id.clone(),
                Column::Field(Field::Name) => record.name.clone(),
                Column::Field(Field::Description) => {
                    record.description.clone().unwrap_or_default()
                }
                Column::Field(Field::Slug) => record.slug.clone().unwrap_or_default(),
                Column::Field(Field::ImageRefs) => join_images(&record.image_refs)?,
                Column::Extra(i) => record.extra.get(*i).cloned().unwrap_or_default(),
            })
        })
        .collect()
}

/// Serialize a table to CSV bytes using its own header layout.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.schema().headers())?;
    for record in table {
        writer.write_record(row_for_record(table.schema(), record)?)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(io::Error::other(e.to_string())))
}

/// Write a table to `path`, replacing any existing file.
///
/// The content goes to a sibling temp file first and is renamed into place,
/// so readers never observe a half-written table.
pub fn save_table(table: &Table, path: &Path) -> io::Result<()> {
    let bytes = to_csv_bytes(table).map_err(io::Error::other)?;
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, &bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    log::debug!("Wrote {} records to {}", table.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "table.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

//! Domain inventory loading.
//!
//! The inventory is a list of raw domain strings, chosen by file extension:
//!
//! - `.parquet`: the `domain` column of a Parquet file (any compression)
//! - `.csv`: a `domain` column, or one domain per line
//! - `.json`: an array of strings or of objects with a `domain` field
//! - anything else: plain text, one domain per line

use std::fs::File;
use std::path::Path;

use arrow_array::cast::AsArray;
use arrow_array::{Array, RecordBatch};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{LogoMatchError, Result};

/// Inventory file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    Parquet,
    Csv,
    Json,
    Text,
}

impl InventoryFormat {
    /// Detect format from file extension. Anything unknown is plain text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("parquet") => Self::Parquet,
            Some("csv") => Self::Csv,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Read raw domain rows from an inventory file.
pub fn load_inventory(path: &Path) -> Result<Vec<String>> {
    let read_error = |e: std::io::Error| {
        LogoMatchError::Inventory(format!("Failed to read inventory {}: {e}", path.display()))
    };

    let rows = match InventoryFormat::from_path(path) {
        InventoryFormat::Parquet => read_parquet(File::open(path).map_err(read_error)?)?,
        format => {
            let content = std::fs::read_to_string(path).map_err(read_error)?;
            match format {
                InventoryFormat::Csv => parse_csv(&content)?,
                InventoryFormat::Json => parse_json(&content)?,
                _ => parse_text(&content),
            }
        }
    };

    info!(path = %path.display(), rows = rows.len(), "Loaded inventory");
    Ok(rows)
}

/// Read the `domain` column of a Parquet file.
///
/// The column may be `Utf8` or `LargeUtf8`; null and blank values are dropped.
pub fn read_parquet(file: File) -> Result<Vec<String>> {
    let parquet_error = |e: parquet::errors::ParquetError| {
        LogoMatchError::Inventory(format!("Invalid Parquet inventory: {e}"))
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_error)?;
    debug!(
        rows = builder.metadata().file_metadata().num_rows(),
        "Opened Parquet inventory"
    );
    let reader = builder.build().map_err(parquet_error)?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| {
            LogoMatchError::Inventory(format!("Failed to read Parquet batch: {e}"))
        })?;
        domain_column(&batch, &mut rows)?;
    }

    Ok(rows)
}

fn domain_column(batch: &RecordBatch, rows: &mut Vec<String>) -> Result<()> {
    let schema = batch.schema();
    let idx = schema
        .fields()
        .iter()
        .position(|f| f.name().eq_ignore_ascii_case("domain"))
        .ok_or_else(|| LogoMatchError::Inventory("Parquet file has no 'domain' column".into()))?;
    let column = batch.column(idx);

    let mut push = |value: Option<&str>| {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            rows.push(value.to_string());
        }
    };

    if let Some(values) = column.as_string_opt::<i32>() {
        values.iter().for_each(&mut push);
    } else if let Some(values) = column.as_string_opt::<i64>() {
        values.iter().for_each(&mut push);
    } else {
        return Err(LogoMatchError::Inventory(format!(
            "Parquet 'domain' column must be a string column, found {}",
            column.data_type()
        )));
    }

    Ok(())
}

/// Parse CSV content.
///
/// When the first line names a `domain` column, that column is used;
/// otherwise the first field of every line is taken.
pub fn parse_csv(content: &str) -> Result<Vec<String>> {
    let Some(first_line) = content.lines().next() else {
        return Ok(Vec::new());
    };
    let has_header = first_line
        .split(',')
        .any(|h| h.trim().trim_matches('"').eq_ignore_ascii_case("domain"));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let domain_idx = if has_header {
        let headers = reader
            .headers()
            .map_err(|e| LogoMatchError::Inventory(format!("Failed to read CSV headers: {e}")))?;
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("domain"))
            .ok_or_else(|| LogoMatchError::Inventory("CSV has no 'domain' column".into()))?
    } else {
        0
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| LogoMatchError::Inventory(format!("Failed to parse CSV record: {e}")))?;
        if let Some(value) = record.get(domain_idx).map(str::trim) {
            if !value.is_empty() {
                rows.push(value.to_string());
            }
        }
    }

    Ok(rows)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRow {
    Plain(String),
    Object { domain: String },
}

/// Parse a JSON array of domains or of `{"domain": ...}` objects.
pub fn parse_json(content: &str) -> Result<Vec<String>> {
    let rows: Vec<JsonRow> = serde_json::from_str(content)
        .map_err(|e| LogoMatchError::Inventory(format!("Invalid JSON inventory: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|row| match row {
            JsonRow::Plain(domain) | JsonRow::Object { domain } => domain,
        })
        .filter(|d| !d.trim().is_empty())
        .collect())
}

/// One domain per line; blank lines and `#` comments are ignored.
pub fn parse_text(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

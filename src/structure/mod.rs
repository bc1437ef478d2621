//! CSV ingestion: layout detection, header cleaning and column typing.

pub mod type_row;
pub mod types;

pub use type_row::{CsvLayout, detect_layout};

use crate::config::NormalizerConfig;
use crate::keys;
use crate::model::{Column, EntityType, NormalizationLevel, Table};
use crate::vocabulary::first_match;
use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAIN_TABLE: &str = "MAIN_TABLE";

#[derive(Debug, Error)]
pub enum InferError {
    #[error("Input is empty")]
    Empty,
    #[error("Input needs a header and at least one more line, found {found} line(s)")]
    TooFewLines { found: usize },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Split raw text into trimmed records, skipping blank and whitespace-only
/// lines. Records made only of delimiters are kept.
pub fn read_records(text: &str) -> Result<Vec<Vec<String>>, InferError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Strip quotes, replace anything outside `[A-Za-z0-9_]` and trim underscores.
pub fn clean_header(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .trim_matches('"')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    replaced.trim_matches('_').to_string()
}

fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut used: IndexSet<String> = IndexSet::new();
    for (idx, header) in raw.iter().enumerate() {
        let mut base = clean_header(header);
        if base.is_empty() {
            base = format!("column_{}", idx + 1);
        }
        let mut candidate = base.clone();
        let mut n = 1;
        while used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        used.insert(candidate);
    }
    used.into_iter().collect()
}

/// Parse CSV text into the single source table.
pub fn infer_structure(text: &str, config: &NormalizerConfig) -> Result<Table, InferError> {
    if text.trim().is_empty() {
        return Err(InferError::Empty);
    }

    let records = read_records(text)?;
    if records.len() < 2 {
        return Err(InferError::TooFewLines {
            found: records.len(),
        });
    }

    let layout = detect_layout(&records);
    debug!(?layout, "detected CSV layout");

    let headers = unique_headers(&records[layout.header_row]);
    let type_row = layout.type_row.map(|idx| records[idx].clone());
    let rows = records[layout.data_start..].to_vec();
    let ragged_rows = ragged_row_numbers(&rows, headers.len());
    if !ragged_rows.is_empty() {
        warn!(
            expected = headers.len(),
            rows = ?ragged_rows,
            "data rows with an inconsistent number of cells"
        );
    }
    if rows.is_empty() {
        warn!("input has a header but no data rows");
    }

    let vocabulary = &config.vocabulary;
    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<String> = rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or_default())
                .collect();
            let samples: Vec<&str> = values
                .iter()
                .take(config.max_sample_rows)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .collect();
            let declared = type_row
                .as_ref()
                .and_then(|r| r.get(idx))
                .map(String::as_str);
            let (sql_type, source) = types::infer_type(name, declared, &samples, vocabulary);
            Column::observed(name, sql_type, source, values)
        })
        .collect();

    let primary_key = keys::tag_columns(&mut columns, vocabulary);
    let foreign_keys: Vec<String> = columns
        .iter()
        .filter(|c| c.is_foreign_key)
        .map(|c| c.name.clone())
        .collect();

    let entity_type = match (&primary_key, foreign_keys.is_empty()) {
        (_, false) => EntityType::Transaction,
        (Some(_), true) => EntityType::Lookup,
        (None, true) => EntityType::Main,
    };

    debug!(
        columns = columns.len(),
        rows = rows.len(),
        primary_key = primary_key.as_deref().unwrap_or("-"),
        "inferred source table"
    );

    Ok(Table {
        name: MAIN_TABLE.to_string(),
        purpose: table_purpose(&columns, config),
        normalization_level: normalization_level(&columns),
        columns,
        primary_key,
        foreign_keys,
        rows,
        type_row,
        ragged_rows,
        entity_type,
    })
}

/// 1-based numbers of the rows whose width differs from `width`.
fn ragged_row_numbers(rows: &[Vec<String>], width: usize) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.len() != width)
        .map(|(idx, _)| idx + 1)
        .collect()
}

fn table_purpose(columns: &[Column], config: &NormalizerConfig) -> String {
    let names = columns
        .iter()
        .map(|c| c.lower_name())
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(purpose) = first_match(&config.vocabulary.table_purposes, &names) {
        return purpose.clone();
    }

    let redundant: Vec<&str> = columns
        .iter()
        .filter(|c| c.redundancy_percentage > 70.0)
        .map(|c| c.name.as_str())
        .collect();
    if redundant.is_empty() {
        format!("Stores {MAIN_TABLE} information")
    } else {
        format!(
            "Main table with data requiring normalization ({})",
            redundant.join(", ")
        )
    }
}

fn normalization_level(columns: &[Column]) -> NormalizationLevel {
    let observed: Vec<f64> = columns
        .iter()
        .filter(|c| c.total_value_count > 0)
        .map(|c| c.redundancy_percentage)
        .collect();
    let mean = if observed.is_empty() {
        0.0
    } else {
        observed.iter().sum::<f64>() / observed.len() as f64
    };

    if mean < 30.0 {
        NormalizationLevel::ThirdNf
    } else if mean < 60.0 {
        NormalizationLevel::SecondNf
    } else if mean < 80.0 {
        NormalizationLevel::FirstNf
    } else {
        NormalizationLevel::None
    }
}

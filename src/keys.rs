//! Naming conventions for primary and foreign keys.

use crate::model::{Column, ColumnReference};
use crate::vocabulary::{Vocabulary, contains_any};

/// Name shape of a primary key: `id`, anything with `id` and `_`, or a
/// `codigo`/`numero` column.
pub fn looks_like_primary_key(lower_name: &str) -> bool {
    lower_name == "id"
        || (lower_name.contains("id") && lower_name.contains('_'))
        || lower_name.contains("codigo")
        || lower_name.contains("numero")
}

pub fn is_identifier_like(lower_name: &str, vocabulary: &Vocabulary) -> bool {
    contains_any(lower_name, &vocabulary.identifier_keywords)
}

/// Base name of an `id_<base>` / `<base>_id` column.
pub fn foreign_key_base(lower_name: &str) -> Option<&str> {
    let base = if let Some(rest) = lower_name.strip_prefix("id_") {
        rest
    } else if let Some(rest) = lower_name.strip_suffix("_id") {
        rest
    } else {
        return None;
    };
    if base.is_empty() { None } else { Some(base) }
}

/// Strip `id_` / `_id` / leading `id` the way referenced table names are derived.
pub fn strip_key_affixes(lower_name: &str) -> &str {
    let name = lower_name.strip_prefix("id_").unwrap_or(lower_name);
    let name = name.strip_suffix("_id").unwrap_or(name);
    name.strip_prefix("id").unwrap_or(name)
}

/// Index of the column chosen as primary key, if any.
///
/// The first column whose name looks like a key wins; failing that, a column is
/// the key when it is the only identifier-like column.
pub fn choose_primary_key(columns: &[Column], vocabulary: &Vocabulary) -> Option<usize> {
    if let Some(idx) = columns
        .iter()
        .position(|c| looks_like_primary_key(&c.lower_name()))
    {
        return Some(idx);
    }
    let identifiers: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| is_identifier_like(&c.lower_name(), vocabulary))
        .map(|(i, _)| i)
        .collect();
    match identifiers.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Flag primary key, foreign keys and required columns in place and return the
/// primary key's name. Foreign-key references point at the column's own name
/// until the target entity is known.
pub fn tag_columns(columns: &mut [Column], vocabulary: &Vocabulary) -> Option<String> {
    let pk = choose_primary_key(columns, vocabulary);
    for (idx, column) in columns.iter_mut().enumerate() {
        let lower = column.lower_name();
        let name = column.name.clone();
        column.is_primary_key = pk == Some(idx);
        let base = if column.is_primary_key {
            None
        } else {
            foreign_key_base(&lower)
        };
        column.is_foreign_key = base.is_some();
        column.reference = base.map(|base| ColumnReference {
            table: vocabulary.resolve_table(base),
            column: name,
        });
        column.is_required = column.is_primary_key
            || column.is_foreign_key
            || contains_any(&lower, &vocabulary.required_keywords);
    }
    pk.map(|idx| columns[idx].name.clone())
}

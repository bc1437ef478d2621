//! Identifier combinations that behave like embedded entities.

use super::dependency::{combination_count, determines, has_repeats};
use crate::keys;
use crate::model::{Table, redundancy_percentage};
use crate::vocabulary::{Vocabulary, contains_any};
use serde::Serialize;

const IDENTIFIER_PREFIXES: &[&str] = &["id", "codigo", "numero", "key"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEntity {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_key: String,
    pub redundancy_percentage: f64,
    pub should_normalize: bool,
}

/// Identifier name without its leading `id`/`codigo`/`numero`/`key` and underscores.
pub fn identifier_base(lower_name: &str) -> &str {
    let mut base = lower_name;
    for prefix in IDENTIFIER_PREFIXES {
        base = base.strip_prefix(prefix).unwrap_or(base);
    }
    base.trim_matches('_')
}

/// Candidate name: the capitalized base, `Entidad` when too short.
pub fn candidate_name(base: &str) -> String {
    if base.chars().count() < 2 {
        return "Entidad".to_string();
    }
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Entidad".to_string(),
    }
}

pub fn find_candidates(
    table: &Table,
    vocabulary: &Vocabulary,
    combination_threshold: f64,
) -> Vec<CandidateEntity> {
    let total_rows = table.rows.len();
    let mut candidates = Vec::new();

    for identifier in &table.columns {
        let lower = identifier.lower_name();
        if !keys::is_identifier_like(&lower, vocabulary) || !has_repeats(&identifier.values) {
            continue;
        }

        let related = vocabulary.related_keywords(identifier_base(&lower));
        let retained: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.name != identifier.name)
            .filter(|c| contains_any(&c.lower_name(), &related))
            .filter(|c| determines(&identifier.values, &c.values))
            .map(|c| c.name.as_str())
            .collect();
        if retained.is_empty() {
            continue;
        }

        let columns: Vec<&str> = std::iter::once(identifier.name.as_str())
            .chain(retained)
            .collect();
        let values: Vec<&[String]> = columns
            .iter()
            .filter_map(|name| table.column(name))
            .map(|c| c.values.as_slice())
            .collect();
        let unique = combination_count(&values);
        if unique >= total_rows {
            continue;
        }

        let redundancy = redundancy_percentage(unique, total_rows);
        candidates.push(CandidateEntity {
            name: candidate_name(identifier_base(&lower)),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            primary_key: identifier.name.clone(),
            redundancy_percentage: redundancy,
            should_normalize: redundancy >= combination_threshold,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::structure::infer_structure;

    fn table(text: &str) -> Table {
        infer_structure(text, &NormalizerConfig::default()).unwrap()
    }

    #[test]
    fn test_identifier_base() {
        assert_eq!(identifier_base("id_producto"), "producto");
        assert_eq!(identifier_base("codigo_categoria"), "categoria");
        assert_eq!(identifier_base("producto_id"), "producto_id");
        assert_eq!(identifier_base("id"), "");
    }

    #[test]
    fn test_candidate_name() {
        assert_eq!(candidate_name("producto"), "Producto");
        assert_eq!(candidate_name("x"), "Entidad");
        assert_eq!(candidate_name(""), "Entidad");
    }

    #[test]
    fn test_repeated_identifier_with_constant_columns() {
        let t = table(
            "id_producto,nombre_producto,precio,cantidad\n\
             1,Lapiz,0.5,10\n\
             1,Lapiz,0.5,3\n\
             2,Goma,0.3,4\n\
             1,Lapiz,0.5,7",
        );
        let candidates = find_candidates(&t, &Vocabulary::default(), 70.0);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.name, "Producto");
        assert_eq!(c.primary_key, "id_producto");
        assert_eq!(c.columns, vec!["id_producto", "nombre_producto", "precio"]);
        assert_eq!(c.redundancy_percentage, 50.0);
        assert!(!c.should_normalize);
    }

    #[test]
    fn test_unique_identifier_yields_nothing() {
        let t = table("id_producto,nombre\n1,Lapiz\n2,Lapiz");
        assert!(find_candidates(&t, &Vocabulary::default(), 70.0).is_empty());
    }

    #[test]
    fn test_inconsistent_related_column_is_dropped() {
        let t = table("id_producto,nombre\n1,Lapiz\n1,Goma");
        assert!(find_candidates(&t, &Vocabulary::default(), 70.0).is_empty());
    }
}

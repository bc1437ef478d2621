//! Partial and transitive dependency discovery on source tables.

use crate::analysis::dependency::{
    FUNCTIONAL_CONFIDENCE, combination_count, determines, has_repeats, is_constant,
};
use crate::model::{Column, Dependency, DependencyKind, Table};
use crate::vocabulary::Vocabulary;
use serde::Serialize;

/// A dependency on a source table together with the table it would move into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCandidate {
    pub table: String,
    pub candidate: String,
    pub dependency: Dependency,
}

/// `a → b` where `a` repeats and `b` varies.
pub fn non_trivial(a: &Column, b: &Column) -> bool {
    has_repeats(&a.values) && !is_constant(&b.values) && determines(&a.values, &b.values)
}

/// Non-trivial dependencies among `columns`; a mutual pair is reported once,
/// with the earlier column as determinant.
pub fn transitive_pairs<'c>(columns: &[&'c Column]) -> Vec<(&'c Column, &'c Column)> {
    let mut pairs = Vec::new();
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate() {
            if i == j || !non_trivial(a, b) {
                continue;
            }
            if j < i && non_trivial(b, a) {
                continue;
            }
            pairs.push((*a, *b));
        }
    }
    pairs
}

fn key_columns<'t>(table: &'t Table, vocabulary: &Vocabulary) -> Vec<&'t Column> {
    table
        .columns
        .iter()
        .filter(|c| vocabulary.has_key_token(&c.lower_name()))
        .collect()
}

/// Columns determined by one part of a unique composite key.
pub fn partial_dependencies(table: &Table, vocabulary: &Vocabulary) -> Vec<DependencyCandidate> {
    let keys = key_columns(table, vocabulary);
    if keys.len() < 2 || table.rows.is_empty() {
        return Vec::new();
    }
    let key_values: Vec<&[String]> = keys.iter().map(|k| k.values.as_slice()).collect();
    if combination_count(&key_values) != table.rows.len() {
        return Vec::new();
    }

    table
        .columns
        .iter()
        .filter(|c| !keys.iter().any(|k| k.name == c.name))
        .filter_map(|column| {
            keys.iter()
                .find(|k| has_repeats(&k.values) && determines(&k.values, &column.values))
                .map(|key| DependencyCandidate {
                    table: table.name.clone(),
                    candidate: format!("{}_{}", table.name, column.name),
                    dependency: Dependency::single(
                        &key.name,
                        &column.name,
                        DependencyKind::Partial,
                        FUNCTIONAL_CONFIDENCE,
                    ),
                })
        })
        .collect()
}

/// Dependencies between non-key columns of a source table.
pub fn transitive_dependencies(table: &Table, vocabulary: &Vocabulary) -> Vec<DependencyCandidate> {
    let non_key: Vec<&Column> = table
        .columns
        .iter()
        .filter(|c| !c.is_primary_key && !vocabulary.has_key_token(&c.lower_name()))
        .collect();

    transitive_pairs(&non_key)
        .into_iter()
        .map(|(a, b)| DependencyCandidate {
            table: table.name.clone(),
            candidate: format!("{}_{}", table.name, b.name),
            dependency: Dependency::single(
                &a.name,
                &b.name,
                DependencyKind::Transitive,
                FUNCTIONAL_CONFIDENCE,
            ),
        })
        .collect()
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
    fn test_composite_key_partial_dependency() {
        let t = table(
            "num_factura,id_producto,fecha_factura,cantidad\n\
             F1,P1,2024-01-01,2\n\
             F1,P2,2024-01-01,1\n\
             F2,P1,2024-02-01,5",
        );
        let found = partial_dependencies(&t, &Vocabulary::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].candidate, "MAIN_TABLE_fecha_factura");
        assert_eq!(found[0].dependency.determinant, vec!["num_factura".to_string()]);
        assert_eq!(found[0].dependency.kind, DependencyKind::Partial);
    }

    #[test]
    fn test_non_unique_composite_key_is_ignored() {
        let t = table(
            "num_factura,id_producto,fecha_factura\n\
             F1,P1,2024-01-01\n\
             F1,P1,2024-01-01",
        );
        assert!(partial_dependencies(&t, &Vocabulary::default()).is_empty());
    }

    #[test]
    fn test_single_key_column_is_ignored() {
        let t = table("id_producto,precio\n1,2.5\n1,2.5");
        assert!(partial_dependencies(&t, &Vocabulary::default()).is_empty());
    }

    #[test]
    fn test_transitive_on_source_table() {
        let t = table(
            "id,ciudad,pais\n\
             1,Quito,Ecuador\n\
             2,Lima,Peru\n\
             3,Quito,Ecuador",
        );
        let found = transitive_dependencies(&t, &Vocabulary::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].candidate, "MAIN_TABLE_pais");
        assert_eq!(found[0].dependency.determinant, vec!["ciudad".to_string()]);
    }

    #[test]
    fn test_constant_dependent_is_not_reported() {
        let t = table("id,ciudad,pais\n1,Quito,Ecuador\n2,Quito,Ecuador");
        assert!(transitive_dependencies(&t, &Vocabulary::default()).is_empty());
    }
}

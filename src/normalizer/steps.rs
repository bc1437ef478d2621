//! The four-stage normalization log.
//!
//! The 2NF and 3NF stages record candidate dependencies on entities and name
//! the tables a split would create; they never restructure entities.

use super::tables::{DependencyCandidate, transitive_pairs};
use crate::model::{Column, Dependency, DependencyKind, Entity, NormalizationStep};
use crate::vocabulary::{Vocabulary, contains_any};
use indexmap::IndexSet;
use tracing::debug;

const PARTIAL_CONFIDENCE: f64 = 0.6;
const KEYWORD_TRANSITIVE_CONFIDENCE: f64 = 0.7;
const GENERIC_TRANSITIVE_CONFIDENCE: f64 = 0.8;

fn step(
    number: usize,
    description: &str,
    action: &str,
    result: String,
    created: IndexSet<String>,
    modified: IndexSet<String>,
) -> NormalizationStep {
    NormalizationStep {
        step: number,
        description: description.to_string(),
        action: action.to_string(),
        result,
        tables_created: created.into_iter().collect(),
        tables_modified: modified.into_iter().collect(),
    }
}

pub fn run(
    entities: &mut [Entity],
    table_dependencies: &[DependencyCandidate],
    vocabulary: &Vocabulary,
) -> Vec<NormalizationStep> {
    vec![
        first_normal_form(entities),
        second_normal_form(entities, table_dependencies, vocabulary),
        third_normal_form(entities, table_dependencies, vocabulary),
        optimization(entities),
    ]
}

fn is_atomic(column: &Column) -> bool {
    !column.values.iter().any(|v| v.contains(',') || v.contains(';'))
}

fn first_normal_form(entities: &[Entity]) -> NormalizationStep {
    let modified: IndexSet<String> = entities
        .iter()
        .filter(|e| !e.columns.iter().all(is_atomic))
        .map(|e| e.name.clone())
        .collect();

    let result = if modified.is_empty() {
        "1NF satisfied".to_string()
    } else {
        format!("1NF violated: non-atomic values in {}", joined(&modified))
    };
    step(
        1,
        "Verify First Normal Form (1NF)",
        "Validate atomic values and structure",
        result,
        IndexSet::new(),
        modified,
    )
}

fn second_normal_form(
    entities: &mut [Entity],
    table_dependencies: &[DependencyCandidate],
    vocabulary: &Vocabulary,
) -> NormalizationStep {
    let mut created = IndexSet::new();
    let mut modified = IndexSet::new();

    for entity in entities.iter_mut().filter(|e| e.columns.len() > 2) {
        let Some(pk) = entity.primary_key.clone() else {
            continue;
        };
        let found: Vec<Dependency> = entity
            .columns
            .iter()
            .filter(|c| c.name != pk)
            .filter(|c| contains_any(&c.lower_name(), &vocabulary.partial_keywords))
            .map(|c| Dependency::single(&pk, &c.name, DependencyKind::Partial, PARTIAL_CONFIDENCE))
            .collect();
        record(entity, found, &mut created, &mut modified);
    }

    for candidate in partial(table_dependencies) {
        created.insert(candidate.candidate.clone());
        modified.insert(candidate.table.clone());
    }

    let result = if created.is_empty() {
        "2NF satisfied".to_string()
    } else {
        format!("2NF partially applied: {} partial dependencies logged", created.len())
    };
    step(
        2,
        "Apply Second Normal Form (2NF)",
        "Remove partial dependencies",
        result,
        created,
        modified,
    )
}

fn third_normal_form(
    entities: &mut [Entity],
    table_dependencies: &[DependencyCandidate],
    vocabulary: &Vocabulary,
) -> NormalizationStep {
    let mut created = IndexSet::new();
    let mut modified = IndexSet::new();

    for entity in entities.iter_mut().filter(|e| e.columns.len() > 2) {
        let found = entity_transitive(entity, vocabulary);
        record(entity, found, &mut created, &mut modified);
    }

    for candidate in table_dependencies
        .iter()
        .filter(|c| c.dependency.kind == DependencyKind::Transitive)
    {
        created.insert(candidate.candidate.clone());
        modified.insert(candidate.table.clone());
    }

    let result = if created.is_empty() {
        "3NF satisfied".to_string()
    } else {
        format!("3NF partially applied: {} transitive dependencies logged", created.len())
    };
    step(
        3,
        "Apply Third Normal Form (3NF)",
        "Remove transitive dependencies",
        result,
        created,
        modified,
    )
}

/// Keyword pairs plus generic non-key dependencies within one entity.
fn entity_transitive(entity: &Entity, vocabulary: &Vocabulary) -> Vec<Dependency> {
    let pk = entity.primary_key.as_deref();
    let non_key: Vec<&Column> = entity
        .columns
        .iter()
        .filter(|c| Some(c.name.as_str()) != pk)
        .collect();

    let mut found: Vec<Dependency> = Vec::new();
    for a in &non_key {
        for b in &non_key {
            if a.name != b.name && vocabulary.is_transitive_pair(&a.lower_name(), &b.lower_name()) {
                found.push(Dependency::single(
                    &a.name,
                    &b.name,
                    DependencyKind::Transitive,
                    KEYWORD_TRANSITIVE_CONFIDENCE,
                ));
            }
        }
    }
    for (a, b) in transitive_pairs(&non_key) {
        let known = found
            .iter()
            .any(|d| d.determinant[0] == a.name && d.dependent[0] == b.name);
        if !known {
            found.push(Dependency::single(
                &a.name,
                &b.name,
                DependencyKind::Transitive,
                GENERIC_TRANSITIVE_CONFIDENCE,
            ));
        }
    }
    found
}

fn record(
    entity: &mut Entity,
    found: Vec<Dependency>,
    created: &mut IndexSet<String>,
    modified: &mut IndexSet<String>,
) {
    if found.is_empty() {
        return;
    }
    for dependency in &found {
        created.insert(format!("{}_{}", entity.name, dependency.dependent.join("_")));
    }
    debug!(entity = %entity.name, count = found.len(), "dependency candidates");
    modified.insert(entity.name.clone());
    entity.dependencies.extend(found);
}

fn optimization(entities: &[Entity]) -> NormalizationStep {
    let modified: IndexSet<String> = entities
        .iter()
        .filter(|e| !e.relationships.is_empty() || e.columns.iter().any(Column::is_numeric))
        .map(|e| e.name.clone())
        .collect();
    step(
        4,
        "Final structure optimization",
        "Create indexes and constraints",
        "Optimization completed".to_string(),
        IndexSet::new(),
        modified,
    )
}

fn partial(candidates: &[DependencyCandidate]) -> impl Iterator<Item = &DependencyCandidate> {
    candidates
        .iter()
        .filter(|c| c.dependency.kind == DependencyKind::Partial)
}

fn joined(names: &IndexSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeSource;

    fn column(name: &str, values: &[&str]) -> Column {
        Column::observed(
            name,
            "VARCHAR(50)".to_string(),
            TypeSource::Content,
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    fn entity(name: &str, columns: Vec<Column>, pk: Option<&str>) -> Entity {
        let mut e = Entity::new(name, "test".to_string(), columns);
        e.primary_key = pk.map(str::to_string);
        e
    }

    #[test]
    fn test_always_four_steps() {
        let mut entities = vec![entity("E", vec![column("id", &["1"])], Some("id"))];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        let numbers: Vec<usize> = steps.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(steps[0].result, "1NF satisfied");
    }

    #[test]
    fn test_non_atomic_values() {
        let mut entities = vec![
            entity("A", vec![column("tags", &["x,y"])], None),
            entity("B", vec![column("tags", &["x"])], None),
        ];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        assert_eq!(steps[0].tables_modified, vec!["A".to_string()]);
        assert!(steps[0].result.starts_with("1NF violated"));
    }

    #[test]
    fn test_partial_candidates_on_wide_entity() {
        let mut entities = vec![entity(
            "PRODUCTOS",
            vec![
                column("id_producto", &["1", "2"]),
                column("nombre_producto", &["a", "b"]),
                column("descripcion", &["x", "y"]),
            ],
            Some("id_producto"),
        )];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        assert_eq!(
            steps[1].tables_created,
            vec![
                "PRODUCTOS_nombre_producto".to_string(),
                "PRODUCTOS_descripcion".to_string()
            ]
        );
        assert_eq!(entities[0].dependencies.len(), 2);
        assert!(entities[0]
            .dependencies
            .iter()
            .all(|d| d.kind == DependencyKind::Partial && d.confidence == PARTIAL_CONFIDENCE));
    }

    #[test]
    fn test_narrow_entities_are_skipped() {
        let mut entities = vec![entity(
            "CLIENTES",
            vec![column("id_cliente", &["1"]), column("nombre", &["a"])],
            Some("id_cliente"),
        )];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        assert!(steps[1].tables_created.is_empty());
        assert!(steps[2].tables_created.is_empty());
        assert!(entities[0].dependencies.is_empty());
    }

    #[test]
    fn test_keyword_and_generic_transitive() {
        let mut entities = vec![entity(
            "UBICACIONES",
            vec![
                column("ciudad", &["Quito", "Lima", "Quito"]),
                column("pais", &["EC", "PE", "EC"]),
                column("cliente", &["Ana", "Beto", "Ana"]),
            ],
            None,
        )];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        let deps = &entities[0].dependencies;
        // keyword pair first, then generic ciudad -> pais; mutual pairs once
        assert_eq!(deps[0].determinant, vec!["ciudad".to_string()]);
        assert_eq!(deps[0].dependent, vec!["cliente".to_string()]);
        assert_eq!(deps[0].confidence, KEYWORD_TRANSITIVE_CONFIDENCE);
        assert!(deps.iter().any(|d| d.dependent == vec!["pais".to_string()]));
        assert!(!deps
            .iter()
            .any(|d| d.determinant == vec!["pais".to_string()] && d.dependent == vec!["ciudad".to_string()]));
        assert!(steps[2].tables_created.contains(&"UBICACIONES_pais".to_string()));
    }

    #[test]
    fn test_table_candidates_are_logged() {
        let candidate = DependencyCandidate {
            table: "MAIN_TABLE".to_string(),
            candidate: "MAIN_TABLE_fecha_factura".to_string(),
            dependency: Dependency::single("num_factura", "fecha_factura", DependencyKind::Partial, 0.8),
        };
        let mut entities = vec![entity("E", vec![column("id", &["1"])], Some("id"))];
        let steps = run(&mut entities, &[candidate], &Vocabulary::default());
        assert_eq!(steps[1].tables_created, vec!["MAIN_TABLE_fecha_factura".to_string()]);
        assert_eq!(steps[1].tables_modified, vec!["MAIN_TABLE".to_string()]);
    }

    #[test]
    fn test_optimization_lists_numeric_entities_once() {
        let mut numeric = column("precio", &["1"]);
        numeric.sql_type = "DECIMAL(10,2)".to_string();
        let mut entities = vec![
            entity("FINANZAS", vec![numeric], None),
            entity("TEXTO", vec![column("nombre", &["a"])], None),
        ];
        let steps = run(&mut entities, &[], &Vocabulary::default());
        assert_eq!(steps[3].tables_modified, vec!["FINANZAS".to_string()]);
    }
}

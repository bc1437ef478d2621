//! Final analysis: scores, normal forms, issues and advisory text.

use super::tables::DependencyCandidate;
use crate::detect::DetectionSummary;
use crate::model::{
    AnalysisResult, Dependency, DependencyKind, Entity, Issue, IssueKind, NormalForms, Severity,
    Table, TypeSource, round2,
};
use std::collections::HashSet;

pub fn final_analysis(
    tables: &[Table],
    entities: &[Entity],
    table_dependencies: &[DependencyCandidate],
) -> AnalysisResult {
    let total_rows = tables.iter().map(|t| t.rows.len()).sum();
    let unique_rows = tables
        .iter()
        .map(|t| t.rows.iter().collect::<HashSet<_>>().len())
        .sum();

    let redundancies: Vec<f64> = entities
        .iter()
        .flat_map(|e| e.columns.iter().map(|c| c.redundancy_percentage))
        .collect();
    let redundancy_score = round2(mean(&redundancies));
    let scores: Vec<f64> = entities.iter().map(|e| e.normalization_score).collect();
    let normalization_score = round2(mean(&scores));

    AnalysisResult {
        total_rows,
        unique_rows,
        redundancy_score,
        normalization_score,
        normal_forms: NormalForms::from_score(normalization_score),
        issues: identify_issues(tables, entities, table_dependencies),
        suggestions: suggestions(entities),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn column_names(entity: &Entity) -> Vec<String> {
    entity.columns.iter().map(|c| c.name.clone()).collect()
}

fn dependency_issue(owner: &str, dependency: &Dependency) -> Option<Issue> {
    let determinant = dependency.determinant.join(", ");
    let dependent = dependency.dependent.join(", ");
    let affected = dependency
        .determinant
        .iter()
        .chain(&dependency.dependent)
        .cloned()
        .collect();
    match dependency.kind {
        DependencyKind::Partial => Some(Issue {
            kind: IssueKind::Dependency,
            severity: Severity::Medium,
            description: format!("Partial dependency in {owner}: {determinant} -> {dependent}"),
            affected_columns: affected,
            solution: format!("Move {dependent} to a table keyed by {determinant}"),
        }),
        DependencyKind::Transitive => Some(Issue {
            kind: IssueKind::Dependency,
            severity: Severity::Low,
            description: format!("Transitive dependency in {owner}: {determinant} -> {dependent}"),
            affected_columns: affected,
            solution: format!("Move {dependent} to a separate table keyed by {determinant}"),
        }),
        DependencyKind::Functional => None,
    }
}

pub fn identify_issues(
    tables: &[Table],
    entities: &[Entity],
    table_dependencies: &[DependencyCandidate],
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for entity in entities {
        if entity.normalization_score < 70.0 {
            issues.push(Issue {
                kind: IssueKind::Structure,
                severity: Severity::Medium,
                description: format!(
                    "Entity {} has low normalization (score: {:.1})",
                    entity.name, entity.normalization_score
                ),
                affected_columns: column_names(entity),
                solution: "Apply additional normalization".to_string(),
            });
        }
        if entity.primary_key.is_none() {
            let fallback = entity
                .columns
                .first()
                .map(|c| format!("; {} is the first candidate", c.name))
                .unwrap_or_default();
            issues.push(Issue {
                kind: IssueKind::Structure,
                severity: Severity::High,
                description: format!("Entity {} has no primary key", entity.name),
                affected_columns: column_names(entity),
                solution: format!("Define an appropriate primary key{fallback}"),
            });
        }
    }

    for entity in entities {
        issues.extend(
            entity
                .dependencies
                .iter()
                .filter_map(|d| dependency_issue(&entity.name, d)),
        );
    }
    issues.extend(
        table_dependencies
            .iter()
            .filter_map(|c| dependency_issue(&c.table, &c.dependency)),
    );

    for table in tables {
        if !table.ragged_rows.is_empty() {
            let numbers = table
                .ragged_rows
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(Issue {
                kind: IssueKind::Structure,
                severity: Severity::Low,
                description: format!(
                    "{} has rows with an inconsistent number of cells (rows {numbers})",
                    table.name
                ),
                affected_columns: Vec::new(),
                solution: format!(
                    "Give every row exactly {} cells; missing cells were read as empty and extra cells ignored",
                    table.columns.len()
                ),
            });
        }
        if table.rows.is_empty() {
            issues.push(Issue {
                kind: IssueKind::Structure,
                severity: Severity::Low,
                description: format!("{} has no data rows", table.name),
                affected_columns: table.columns.iter().map(|c| c.name.clone()).collect(),
                solution: "Add data rows so types and dependencies can be inferred".to_string(),
            });
        }

        let redundant: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.redundancy_percentage > 70.0)
            .map(|c| c.name.clone())
            .collect();
        if !redundant.is_empty() {
            issues.push(Issue {
                kind: IssueKind::Redundancy,
                severity: Severity::High,
                description: format!(
                    "{} has columns with more than 70% repeated values",
                    table.name
                ),
                affected_columns: redundant,
                solution: "Extract the repeated values into lookup tables".to_string(),
            });
        }

        let untyped: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.type_source == TypeSource::Fallback)
            .map(|c| c.name.clone())
            .collect();
        if !untyped.is_empty() {
            issues.push(Issue {
                kind: IssueKind::DataType,
                severity: Severity::Low,
                description: format!(
                    "{} has columns without values; their type defaulted to VARCHAR(255)",
                    table.name
                ),
                affected_columns: untyped,
                solution: "Declare the column types in a type row".to_string(),
            });
        }
    }

    issues
}

pub fn suggestions(entities: &[Entity]) -> Vec<String> {
    let mut suggestions = Vec::new();
    if entities.len() == 1 {
        suggestions.push(
            "Consider splitting the table into multiple entities for better normalization"
                .to_string(),
        );
    }
    for entity in entities {
        if entity.relationships.is_empty() && entity.columns.len() > 2 {
            suggestions.push(format!(
                "Add relationships to {} to improve referential integrity",
                entity.name
            ));
        }
        if entity.normalization_score < 80.0 {
            suggestions.push(format!(
                "Review the structure of {} to improve normalization",
                entity.name
            ));
        }
    }
    suggestions
}

pub fn recommendations(analysis: &AnalysisResult, summary: &DetectionSummary) -> Vec<String> {
    let mut recommendations = Vec::new();

    let band = if analysis.normalization_score < 70.0 {
        "The database needs significant normalization to reach 3NF"
    } else if analysis.normalization_score < 85.0 {
        "The database is partially normalized; consider further improvements"
    } else {
        "The database is well normalized and meets 3NF"
    };
    recommendations.push(band.to_string());

    if summary.total_entities == 1 {
        recommendations.push(
            "Consider splitting the single table into multiple entities for better organization"
                .to_string(),
        );
    } else if summary.total_entities > 5 {
        recommendations
            .push("The database is well structured with multiple specialized entities".to_string());
    }

    if !analysis.issues.is_empty() {
        recommendations.push(format!(
            "Resolve {} identified issues to improve quality",
            analysis.issues.len()
        ));
    }

    recommendations.extend(summary.recommendations.iter().cloned());
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::summarize;
    use crate::model::Column;

    fn column(name: &str, values: &[&str]) -> Column {
        Column::observed(
            name,
            "VARCHAR(50)".to_string(),
            TypeSource::Content,
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    fn entity(name: &str, columns: Vec<Column>, pk: Option<&str>, score: f64) -> Entity {
        let mut e = Entity::new(name, "test".to_string(), columns);
        e.primary_key = pk.map(str::to_string);
        e.normalization_score = score;
        e
    }

    #[test]
    fn test_structure_issues() {
        let entities = vec![
            entity("A", vec![column("id", &["1"])], Some("id"), 100.0),
            entity("B", vec![column("color", &["x"]), column("talla", &["y"])], None, 65.0),
        ];
        let issues = identify_issues(&[], &entities, &[]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[1].severity, Severity::High);
        assert!(issues[1].solution.contains("color"));
    }

    #[test]
    fn test_dependency_issues() {
        let mut e = entity("P", vec![column("id", &["1"])], Some("id"), 100.0);
        e.dependencies.push(Dependency::single("id", "nombre", DependencyKind::Partial, 0.6));
        e.dependencies.push(Dependency::single("ciudad", "pais", DependencyKind::Transitive, 0.8));
        e.dependencies.push(Dependency::single("a", "b", DependencyKind::Functional, 0.8));
        let issues = identify_issues(&[], &[e], &[]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[1].severity, Severity::Low);
        assert_eq!(issues[1].affected_columns, vec!["ciudad".to_string(), "pais".to_string()]);
    }

    fn source(text: &str) -> Table {
        crate::structure::infer_structure(text, &crate::config::NormalizerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_source_table_issues() {
        let table = source("id,color,notas\n1,rojo,\n2,rojo,\n3,rojo,\n4,rojo,\n5,rojo,");
        let issues = identify_issues(&[table], &[], &[]);
        assert_eq!(issues.len(), 2);

        assert_eq!(issues[0].kind, IssueKind::Redundancy);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].affected_columns, vec!["color".to_string()]);

        assert_eq!(issues[1].kind, IssueKind::DataType);
        assert_eq!(issues[1].severity, Severity::Low);
        assert_eq!(issues[1].affected_columns, vec!["notas".to_string()]);
    }

    #[test]
    fn test_ragged_rows_issue() {
        let table = source("id,nombre\n1,Ana\n2\n3,Eva");
        let issues = identify_issues(&[table], &[], &[]);
        let ragged = issues
            .iter()
            .find(|i| i.kind == IssueKind::Structure)
            .unwrap();
        assert_eq!(ragged.severity, Severity::Low);
        assert!(ragged.description.contains("rows 2"));
    }

    #[test]
    fn test_no_data_rows_issue() {
        let table = source("INT,TEXT\nid,nombre\n");
        let issues = identify_issues(&[table], &[], &[]);
        assert!(issues.iter().any(|i| i.kind == IssueKind::Structure
            && i.severity == Severity::Low
            && i.description == "MAIN_TABLE has no data rows"));
    }

    #[test]
    fn test_scores_and_forms() {
        let entities = vec![
            entity("A", vec![column("id", &["1", "2"])], Some("id"), 100.0),
            entity("B", vec![column("x", &["a", "a"])], Some("x"), 75.0),
        ];
        let analysis = final_analysis(&[], &entities, &[]);
        assert_eq!(analysis.normalization_score, 87.5);
        assert_eq!(analysis.redundancy_score, 25.0);
        assert!(analysis.normal_forms.third);
        assert!(!analysis.normal_forms.bcnf);
    }

    #[test]
    fn test_recommendation_bands() {
        let entities = vec![entity("A", vec![column("id", &["1"])], Some("id"), 100.0)];
        let analysis = final_analysis(&[], &entities, &[]);
        let summary = summarize(&entities);
        let recs = recommendations(&analysis, &summary);
        assert_eq!(recs[0], "The database is well normalized and meets 3NF");
        assert!(recs[1].starts_with("Consider splitting the single table"));
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_suggestions() {
        let entities = vec![entity(
            "A",
            vec![column("a", &["1"]), column("b", &["1"]), column("c", &["1"])],
            None,
            65.0,
        )];
        let s = suggestions(&entities);
        assert_eq!(s.len(), 3);
        assert!(s[1].contains("Add relationships to A"));
    }
}

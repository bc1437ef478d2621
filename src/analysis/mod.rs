//! Redundancy and dependency analysis of the source table.

pub mod combination;
pub mod dependency;
pub mod redundancy;

pub use combination::CandidateEntity;
pub use redundancy::ColumnRedundancy;

use crate::config::NormalizerConfig;
use crate::model::{Dependency, Table};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyReport {
    pub columns: Vec<ColumnRedundancy>,
    pub candidates: Vec<CandidateEntity>,
    pub dependencies: Vec<Dependency>,
    pub recommendations: Vec<String>,
}

impl RedundancyReport {
    pub fn columns_to_normalize(&self) -> usize {
        self.columns.iter().filter(|c| c.should_normalize).count() + self.candidates.len()
    }
}

pub fn analyze(table: &Table, config: &NormalizerConfig) -> RedundancyReport {
    let columns = redundancy::column_redundancy(table, config.redundancy_threshold_single_column);
    let candidates = combination::find_candidates(
        table,
        &config.vocabulary,
        config.redundancy_threshold_combination,
    );
    let dependencies = dependency::functional_dependencies(&table.columns);

    let recommendations = columns
        .iter()
        .filter(|c| c.should_normalize)
        .map(|c| format!("Create a separate table for {}", c.column_name))
        .chain(candidates.iter().map(|c| {
            format!("Create table {} for {}", c.name, c.columns.join(", "))
        }))
        .collect();

    debug!(
        table = %table.name,
        flagged = columns.iter().filter(|c| c.should_normalize).count(),
        candidates = candidates.len(),
        dependencies = dependencies.len(),
        "redundancy analysis"
    );

    RedundancyReport {
        columns,
        candidates,
        dependencies,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::infer_structure;

    #[test]
    fn test_should_normalize_at_default_threshold() {
        let config = NormalizerConfig::default();
        let table = infer_structure(
            "id_cliente,nombre,ciudad\n1,Ana,Quito\n2,Beto,Quito\n3,Ana,Quito",
            &config,
        )
        .unwrap();
        let report = analyze(&table, &config);

        let ciudad = &report.columns[2];
        assert_eq!(ciudad.redundancy_percentage, 66.67);
        assert!(ciudad.should_normalize);
        let nombre = &report.columns[1];
        assert_eq!(nombre.redundancy_percentage, 33.33);
        assert!(nombre.should_normalize);
        assert!(!report.columns[0].should_normalize);

        assert_eq!(
            report.recommendations,
            vec![
                "Create a separate table for nombre".to_string(),
                "Create a separate table for ciudad".to_string(),
            ]
        );
        assert_eq!(report.columns_to_normalize(), 2);
    }

    #[test]
    fn test_threshold_is_respected() {
        let config = NormalizerConfig {
            redundancy_threshold_single_column: 50.0,
            ..NormalizerConfig::default()
        };
        let table = infer_structure(
            "id_cliente,nombre,ciudad\n1,Ana,Quito\n2,Beto,Quito\n3,Ana,Quito",
            &config,
        )
        .unwrap();
        let report = analyze(&table, &config);
        assert!(!report.columns[1].should_normalize);
        assert!(report.columns[2].should_normalize);
    }

    #[test]
    fn test_unique_column_never_flagged() {
        let config = NormalizerConfig {
            redundancy_threshold_single_column: 0.0,
            ..NormalizerConfig::default()
        };
        let table = infer_structure("codigo,nombre\nA,x\nB,y", &config).unwrap();
        let report = analyze(&table, &config);
        assert!(report.columns.iter().all(|c| !c.should_normalize));
    }

    #[test]
    fn test_dependencies_are_reported() {
        let config = NormalizerConfig::default();
        let table = infer_structure("ciudad,pais\nQuito,EC\nLima,PE\nQuito,EC", &config).unwrap();
        let report = analyze(&table, &config);
        assert_eq!(report.dependencies.len(), 2);
    }
}

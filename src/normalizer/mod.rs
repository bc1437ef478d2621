//! The normalization pipeline: structure, analysis, detection, the
//! normal-form log, SQL generation and the final assessment.

pub mod assessment;
pub mod steps;
pub mod tables;

pub use tables::DependencyCandidate;

use crate::analysis::{self, RedundancyReport};
use crate::config::{ConfigError, NormalizerConfig};
use crate::detect::{self, DetectionSummary, EntityDetector};
use crate::model::{AnalysisResult, Entity, NormalizationStep, Table};
use crate::sql::SqlGenerator;
use crate::structure::{self, InferError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Pipeline stage named by errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Structure,
    Detection,
    Normalization,
    Sql,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Structure => "STRUCTURE",
            Stage::Detection => "DETECTION",
            Stage::Normalization => "NORMALIZATION",
            Stage::Sql => "SQL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Normalization failed at stage STRUCTURE: {0}")]
    Structure(#[from] InferError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Normalization failed at stage {stage}: {message}")]
    Invariant { stage: Stage, message: String },
}

impl NormalizeError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            NormalizeError::Structure(_) => Some(Stage::Structure),
            NormalizeError::Config(_) => None,
            NormalizeError::Invariant { stage, .. } => Some(*stage),
        }
    }
}

fn invariant(stage: Stage, message: String) -> NormalizeError {
    NormalizeError::Invariant { stage, message }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationResult {
    pub original_structure: Vec<Table>,
    pub redundancy: RedundancyReport,
    pub normalized_entities: Vec<Entity>,
    pub detection_summary: DetectionSummary,
    pub table_dependencies: Vec<DependencyCandidate>,
    pub normalization_steps: Vec<NormalizationStep>,
    pub sql_script: String,
    pub analysis: AnalysisResult,
    pub recommendations: Vec<String>,
}

pub struct Normalizer<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, csv: &str) -> Result<NormalizationResult, NormalizeError> {
        self.config.validate()?;
        let vocabulary = &self.config.vocabulary;

        let table = structure::infer_structure(csv, self.config)?;
        info!(
            columns = table.columns.len(),
            rows = table.rows.len(),
            primary_key = table.primary_key.as_deref().unwrap_or("-"),
            "inferred structure"
        );
        let redundancy = analysis::analyze(&table, self.config);
        let source = vec![table];

        let mut entities = EntityDetector::new(vocabulary).detect(&source);
        check_entities(&entities)?;
        info!(entities = entities.len(), "detected entities");

        let table_dependencies: Vec<DependencyCandidate> = source
            .iter()
            .flat_map(|t| {
                tables::partial_dependencies(t, vocabulary)
                    .into_iter()
                    .chain(tables::transitive_dependencies(t, vocabulary))
            })
            .collect();
        let normalization_steps = steps::run(&mut entities, &table_dependencies, vocabulary);
        if normalization_steps.len() != 4 {
            return Err(invariant(
                Stage::Normalization,
                format!("expected 4 normalization steps, got {}", normalization_steps.len()),
            ));
        }
        info!(
            table_dependencies = table_dependencies.len(),
            "normal-form passes complete"
        );

        let sql_script = SqlGenerator::new(self.config).generate(&entities);
        if sql_script.is_empty() {
            return Err(invariant(Stage::Sql, "generated script is empty".to_string()));
        }

        let detection_summary = detect::summarize(&entities);
        let analysis = assessment::final_analysis(&source, &entities, &table_dependencies);
        let recommendations = assessment::recommendations(&analysis, &detection_summary);
        info!(
            score = analysis.normalization_score,
            issues = analysis.issues.len(),
            "normalization complete"
        );

        Ok(NormalizationResult {
            original_structure: source,
            redundancy,
            normalized_entities: entities,
            detection_summary,
            table_dependencies,
            normalization_steps,
            sql_script,
            analysis,
            recommendations,
        })
    }
}

fn check_entities(entities: &[Entity]) -> Result<(), NormalizeError> {
    let mut names = HashSet::new();
    for entity in entities {
        if entity.columns.is_empty() {
            return Err(invariant(
                Stage::Detection,
                format!("entity {} has no columns", entity.name),
            ));
        }
        if !names.insert(entity.name.as_str()) {
            return Err(invariant(
                Stage::Detection,
                format!("duplicate entity name {}", entity.name),
            ));
        }
        if let Some(column) = entity
            .columns
            .iter()
            .find(|c| !(0.0..=100.0).contains(&c.redundancy_percentage))
        {
            return Err(invariant(
                Stage::Detection,
                format!(
                    "redundancy of {}.{} out of range: {}",
                    entity.name, column.name, column.redundancy_percentage
                ),
            ));
        }
    }
    Ok(())
}

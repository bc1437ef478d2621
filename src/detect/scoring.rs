//! Entity scoring and the detection summary.

use crate::model::Entity;
use indexmap::IndexMap;
use serde::Serialize;

/// Start at 100 and subtract for redundant columns, a missing key and a lack
/// of relationships; clamped to `[0, 100]`.
pub fn normalization_score(entity: &Entity) -> f64 {
    let mut score = 100.0;
    for column in &entity.columns {
        if column.redundancy_percentage > 50.0 {
            score -= column.redundancy_percentage * 0.5;
        }
    }
    if entity.primary_key.is_none() {
        score -= 20.0;
    }
    if entity.relationships.is_empty() && entity.columns.len() > 1 {
        score -= 15.0;
    }
    f64::clamp(score, 0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityShape {
    Lookup,
    Transaction,
    Simple,
    Complex,
}

impl EntityShape {
    pub fn of(entity: &Entity) -> Self {
        if entity.primary_key.is_some() && entity.relationships.is_empty() {
            EntityShape::Lookup
        } else if !entity.relationships.is_empty() {
            EntityShape::Transaction
        } else if entity.columns.len() == 1 {
            EntityShape::Simple
        } else {
            EntityShape::Complex
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub total_entities: usize,
    pub entities_by_type: IndexMap<EntityShape, usize>,
    pub average_score: f64,
    pub recommendations: Vec<String>,
}

pub fn summarize(entities: &[Entity]) -> DetectionSummary {
    let mut entities_by_type = IndexMap::new();
    let mut recommendations = Vec::new();

    for entity in entities {
        *entities_by_type.entry(EntityShape::of(entity)).or_insert(0) += 1;
        if entity.normalization_score < 70.0 {
            recommendations.push(format!(
                "Improve normalization of {} (score: {:.1})",
                entity.name, entity.normalization_score
            ));
        }
        if entity.primary_key.is_none() {
            recommendations.push(format!("Define a primary key for {}", entity.name));
        }
    }

    let average_score = if entities.is_empty() {
        0.0
    } else {
        entities.iter().map(|e| e.normalization_score).sum::<f64>() / entities.len() as f64
    };

    DetectionSummary {
        total_entities: entities.len(),
        entities_by_type,
        average_score,
        recommendations,
    }
}

//! Pairwise functional dependencies over aligned column values.

use crate::model::{Column, Dependency, DependencyKind};
use std::collections::{HashMap, HashSet};

pub const FUNCTIONAL_CONFIDENCE: f64 = 0.8;

/// `a → b` holds when every value of `a` maps to the first `b` value seen with
/// it. Empty cells are ordinary values.
pub fn determines(a: &[String], b: &[String]) -> bool {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    a.iter()
        .zip(b)
        .all(|(av, bv)| *seen.entry(av.as_str()).or_insert(bv.as_str()) == bv.as_str())
}

pub fn distinct_count(values: &[String]) -> usize {
    values.iter().collect::<HashSet<_>>().len()
}

pub fn has_repeats(values: &[String]) -> bool {
    distinct_count(values) < values.len()
}

pub fn is_constant(values: &[String]) -> bool {
    distinct_count(values) <= 1
}

/// Number of distinct row tuples across the given columns.
pub fn combination_count(columns: &[&[String]]) -> usize {
    let rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..rows)
        .map(|row| {
            columns
                .iter()
                .map(|c| c.get(row).map(String::as_str).unwrap_or(""))
                .collect::<Vec<_>>()
        })
        .collect::<HashSet<_>>()
        .len()
}

/// Every ordered pair `a → b` that holds.
pub fn functional_dependencies(columns: &[Column]) -> Vec<Dependency> {
    let mut dependencies = Vec::new();
    for a in columns {
        for b in columns {
            if a.name != b.name && determines(&a.values, &b.values) {
                dependencies.push(Dependency::single(
                    &a.name,
                    &b.name,
                    DependencyKind::Functional,
                    FUNCTIONAL_CONFIDENCE,
                ));
            }
        }
    }
    dependencies
}

//! Sample INSERT statements and per-entity detail views.

use crate::model::{Column, Entity};
use indexmap::IndexSet;

fn literal(column: &Column, value: &str) -> String {
    if value.is_empty() {
        "NULL".to_string()
    } else if column.is_numeric() && value.parse::<f64>().is_ok_and(f64::is_finite) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Distinct observed rows of an entity, at most `max_rows`.
pub fn inserts(entity: &Entity, max_rows: usize) -> Vec<String> {
    let height = entity.columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
    let rows: IndexSet<Vec<&str>> = (0..height)
        .map(|row| {
            entity
                .columns
                .iter()
                .map(|c| c.values.get(row).map(String::as_str).unwrap_or(""))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|v| !v.is_empty()))
        .collect();

    let names = entity
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    rows.into_iter()
        .take(max_rows)
        .map(|cells| {
            let values = entity
                .columns
                .iter()
                .zip(cells)
                .map(|(column, value)| literal(column, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!("INSERT INTO {} ({names}) VALUES ({values});\n", entity.name)
        })
        .collect()
}

/// `vw_<entity>_detalle` joining every relationship target present in `known`.
pub fn detail_view(entity: &Entity, known: &[&Entity]) -> Option<String> {
    let mut select = vec!["t0.*".to_string()];
    let mut joins = Vec::new();

    for relationship in &entity.relationships {
        let Some(target) = known
            .iter()
            .find(|e| e.name == relationship.references.table)
        else {
            continue;
        };
        let alias = format!("t{}", joins.len() + 1);
        for column in target
            .columns
            .iter()
            .filter(|c| c.name != relationship.references.column)
        {
            select.push(format!(
                "{alias}.{} AS {}_{}",
                column.name,
                target.name.to_lowercase(),
                column.name
            ));
        }
        joins.push(format!(
            "LEFT JOIN {} {alias} ON t0.{} = {alias}.{}",
            target.name, relationship.column, relationship.references.column
        ));
    }

    if joins.is_empty() {
        return None;
    }
    Some(format!(
        "CREATE VIEW vw_{}_detalle AS\nSELECT {}\nFROM {} t0\n{};\n",
        entity.name.to_lowercase(),
        select.join(", "),
        entity.name,
        joins.join("\n")
    ))
}

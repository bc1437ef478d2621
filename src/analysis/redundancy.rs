use crate::model::Table;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRedundancy {
    pub column_name: String,
    pub unique_values: usize,
    pub total_rows: usize,
    pub redundancy_percentage: f64,
    pub should_normalize: bool,
}

/// Redundancy per column; a column is flagged when it reaches `threshold` and
/// still has fewer unique values than the table has rows.
pub fn column_redundancy(table: &Table, threshold: f64) -> Vec<ColumnRedundancy> {
    let total_rows = table.rows.len();
    table
        .columns
        .iter()
        .map(|column| ColumnRedundancy {
            column_name: column.name.clone(),
            unique_values: column.unique_value_count,
            total_rows,
            redundancy_percentage: column.redundancy_percentage,
            should_normalize: column.redundancy_percentage >= threshold
                && column.unique_value_count < total_rows,
        })
        .collect()
}

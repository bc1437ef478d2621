use crate::model::Column;
use crate::vocabulary::{Vocabulary, contains_any};

/// CHECK constraints implied by a column's name and type.
pub fn column_checks(table: &str, column: &Column, vocabulary: &Vocabulary) -> Vec<String> {
    let lower = column.lower_name();
    let mut rules: Vec<(&str, String)> = Vec::new();

    if column.is_numeric() {
        if contains_any(&lower, &vocabulary.positive_keywords) {
            rules.push(("positive", format!("{} > 0", column.name)));
        }
        if contains_any(&lower, &vocabulary.non_negative_keywords) {
            rules.push(("non_negative", format!("{} >= 0", column.name)));
        }
    }
    if contains_any(&lower, &vocabulary.email_keywords) {
        rules.push(("format", format!("{} LIKE '%_@__%.__%'", column.name)));
    }
    if contains_any(&lower, &vocabulary.date_keywords) {
        rules.push(("valid", format!("{} <= CURRENT_TIMESTAMP", column.name)));
    }
    if contains_any(&lower, &vocabulary.code_keywords) {
        rules.push(("length", format!("LEN({}) >= 2", column.name)));
    }

    rules
        .into_iter()
        .map(|(suffix, condition)| {
            format!(
                "ALTER TABLE {table} ADD CONSTRAINT chk_{}_{}_{suffix}\nCHECK ({condition});\n",
                table.to_lowercase(),
                column.name
            )
        })
        .collect()
}

use super::checks::column_checks;
use super::order::creation_order;
use super::sample;
use crate::config::NormalizerConfig;
use crate::keys;
use crate::model::{Column, Entity};
use crate::vocabulary::{Vocabulary, contains_any};
use indexmap::IndexSet;
use tracing::{debug, warn};

pub struct SqlGenerator<'a> {
    vocabulary: &'a Vocabulary,
    emit_sample_data: bool,
    emit_views: bool,
    max_sample_rows: usize,
}

struct ForeignKey<'e> {
    table: &'e str,
    column: &'e str,
    target: String,
    target_column: String,
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("-- ===== {title} =====\n\n"));
}

impl<'a> SqlGenerator<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self {
            vocabulary: &config.vocabulary,
            emit_sample_data: config.emit_sample_data,
            emit_views: config.emit_views,
            max_sample_rows: config.max_sample_rows,
        }
    }

    pub fn generate(&self, entities: &[Entity]) -> String {
        let ordered = creation_order(entities);
        let mut out = String::new();

        section(&mut out, "1. TABLES");
        for entity in &ordered {
            out.push_str(&create_table(entity));
            out.push('\n');
        }

        section(&mut out, "2. FOREIGN KEYS");
        let foreign_keys = self.foreign_keys(&ordered);
        if foreign_keys.is_empty() {
            out.push_str("-- No foreign keys detected\n\n");
        }
        for fk in &foreign_keys {
            out.push_str(&format!(
                "-- {}.{} -> {}.{}\nALTER TABLE {} ADD CONSTRAINT FK_{}_{}\nFOREIGN KEY ({}) REFERENCES {}({});\n\n",
                fk.table,
                fk.column,
                fk.target,
                fk.target_column,
                fk.table,
                fk.table,
                fk.column,
                fk.column,
                fk.target,
                fk.target_column
            ));
        }

        section(&mut out, "3. INDEXES");
        for entity in &ordered {
            let indexes = self.indexes(entity);
            for column in &indexes {
                out.push_str(&format!(
                    "CREATE INDEX idx_{}_{column} ON {}({column});\n",
                    entity.name.to_lowercase(),
                    entity.name
                ));
            }
            if !indexes.is_empty() {
                out.push('\n');
            }
        }

        section(&mut out, "4. CHECK CONSTRAINTS");
        let checks: Vec<String> = ordered
            .iter()
            .flat_map(|e| {
                e.columns
                    .iter()
                    .flat_map(|c| column_checks(&e.name, c, self.vocabulary))
            })
            .collect();
        if checks.is_empty() {
            out.push_str("-- No additional check constraints required\n\n");
        }
        for check in &checks {
            out.push_str(check);
            out.push('\n');
        }

        if self.emit_sample_data {
            section(&mut out, "5. SAMPLE DATA");
            for entity in &ordered {
                let rows = sample::inserts(entity, self.max_sample_rows);
                for row in &rows {
                    out.push_str(row);
                }
                if !rows.is_empty() {
                    out.push('\n');
                }
            }
        }

        if self.emit_views {
            section(&mut out, "6. VIEWS");
            for entity in &ordered {
                if let Some(view) = sample::detail_view(entity, &ordered) {
                    out.push_str(&view);
                    out.push('\n');
                }
            }
        }

        debug!(
            tables = ordered.len(),
            foreign_keys = foreign_keys.len(),
            checks = checks.len(),
            "generated DDL"
        );
        out
    }

    /// Relationship constraints, then FK-flagged columns without a relationship.
    fn foreign_keys<'e>(&self, ordered: &[&'e Entity]) -> Vec<ForeignKey<'e>> {
        let mut seen: IndexSet<(String, String, String)> = IndexSet::new();
        let mut found = Vec::new();
        let find = |name: &str| ordered.iter().find(|e| e.name == name).copied();

        for &entity in ordered {
            let mut candidates: Vec<(&'e str, String, Option<String>)> = entity
                .relationships
                .iter()
                .map(|r| {
                    (
                        r.column.as_str(),
                        r.references.table.clone(),
                        Some(r.references.column.clone()),
                    )
                })
                .collect();
            for column in entity.columns.iter().filter(|c| {
                c.is_foreign_key
                    && !c.is_primary_key
                    && !entity.relationships.iter().any(|r| r.column == c.name)
            }) {
                let base = keys::strip_key_affixes(&column.lower_name()).to_string();
                candidates.push((column.name.as_str(), self.vocabulary.resolve_table(&base), None));
            }

            for (column, target, target_column) in candidates {
                let Some(target_entity) = find(&target) else {
                    warn!(table = %entity.name, column, target = %target, "foreign key target not found, skipping");
                    continue;
                };
                if !seen.insert((entity.name.clone(), column.to_string(), target.clone())) {
                    continue;
                }
                let target_column = target_column
                    .or_else(|| target_entity.primary_key.clone())
                    .unwrap_or_else(|| column.to_string());
                found.push(ForeignKey {
                    table: entity.name.as_str(),
                    column,
                    target,
                    target_column,
                });
            }
        }
        found
    }

    /// Indexed columns: non-key foreign keys, then every searchable column,
    /// primary keys included.
    fn indexes<'e>(&self, entity: &'e Entity) -> IndexSet<&'e str> {
        let is_key = |c: &Column| c.is_primary_key || entity.primary_key.as_deref() == Some(c.name.as_str());
        let mut columns: IndexSet<&str> = IndexSet::new();
        for relationship in &entity.relationships {
            if !entity.column(&relationship.column).is_some_and(is_key) {
                columns.insert(relationship.column.as_str());
            }
        }
        for column in entity.columns.iter().filter(|&c| c.is_foreign_key && !is_key(c)) {
            columns.insert(column.name.as_str());
        }
        for column in &entity.columns {
            if contains_any(&column.lower_name(), &self.vocabulary.index_keywords) {
                columns.insert(column.name.as_str());
            }
        }
        columns
    }
}

fn column_definition(column: &Column) -> String {
    let mut definition = format!("    {} {}", column.name, column.sql_type);
    if column.is_primary_key {
        if column.is_integer_like() && !column.lower_name().contains("num_") {
            definition.push_str(" IDENTITY(1,1) PRIMARY KEY");
        } else {
            definition.push_str(" PRIMARY KEY");
        }
    } else if column.is_required {
        definition.push_str(" NOT NULL");
    }
    definition
}

fn create_table(entity: &Entity) -> String {
    let columns = entity
        .columns
        .iter()
        .map(column_definition)
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "-- Table: {} ({})\nCREATE TABLE {} (\n{}\n);\n",
        entity.name, entity.purpose, entity.name, columns
    )
}

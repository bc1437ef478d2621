//! Entity detection: domain clusters, keys, lookup splits, support entities
//! and relationships.

pub mod domain;
pub mod scoring;

pub use scoring::{DetectionSummary, EntityShape, summarize};

use crate::keys;
use crate::model::{Column, Entity, Relationship, RelationshipKind, Strength, Table};
use crate::vocabulary::Vocabulary;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// Average redundancy above which an entity is split.
const SPLIT_AVERAGE: f64 = 80.0;
/// Columns above this redundancy move into the lookup half.
const SPLIT_COLUMN: f64 = 70.0;

pub struct EntityDetector<'a> {
    vocabulary: &'a Vocabulary,
    entities: IndexMap<String, Entity>,
}

impl<'a> EntityDetector<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self {
            vocabulary,
            entities: IndexMap::new(),
        }
    }

    pub fn detect(mut self, tables: &[Table]) -> Vec<Entity> {
        for table in tables {
            self.cluster_table(table);
        }
        self.split_redundant();
        self.synthesize_support_entities();
        self.resolve_references();
        self.materialize_relationships();
        for entity in self.entities.values_mut() {
            entity.normalization_score = scoring::normalization_score(entity);
            debug!(entity = %entity.name, score = entity.normalization_score, "scored entity");
        }

        debug_assert!(self.entities.values().all(|e| !e.columns.is_empty()));
        self.entities.into_values().collect()
    }

    fn retag(&self, entity: &mut Entity) {
        entity.primary_key = keys::tag_columns(&mut entity.columns, self.vocabulary);
    }

    /// Insert a new entity, or merge its columns into the one already holding the name.
    fn add_columns(&mut self, name: String, purpose: String, columns: Vec<Column>) {
        let vocabulary = self.vocabulary;
        if let Some(existing) = self.entities.get_mut(&name) {
            debug!(entity = %name, "merging cluster into existing entity");
            existing.columns.extend(columns);
            existing.primary_key = keys::tag_columns(&mut existing.columns, vocabulary);
            return;
        }
        let mut entity = Entity::new(&name, purpose, columns);
        self.retag(&mut entity);
        self.entities.insert(name, entity);
    }

    fn cluster_table(&mut self, table: &Table) {
        if table.columns.is_empty() {
            return;
        }
        for cluster in domain::cluster_by_domain(&table.columns, self.vocabulary) {
            let name = domain::entity_name(&cluster, self.vocabulary);
            let purpose = self.vocabulary.purpose(cluster.domain);
            debug!(entity = %name, domain = %cluster.domain, columns = cluster.columns.len(), "candidate entity");
            self.add_columns(name, purpose, cluster.columns);
        }
    }

    fn split_redundant(&mut self) {
        let names: Vec<String> = self.entities.keys().cloned().collect();
        for name in names {
            let Some(entity) = self.entities.get(&name) else {
                continue;
            };
            if entity.average_redundancy() <= SPLIT_AVERAGE {
                continue;
            }
            let mut remaining = entity.clone();
            let (high, low): (Vec<Column>, Vec<Column>) = remaining
                .columns
                .drain(..)
                .partition(|c| c.redundancy_percentage > SPLIT_COLUMN);
            if high.is_empty() || low.is_empty() {
                continue;
            }

            debug!(entity = %name, moved = high.len(), "splitting high-redundancy columns");
            remaining.columns = low;
            self.retag(&mut remaining);
            self.entities.insert(name.clone(), remaining);

            self.add_columns(
                format!("{name}_LOOKUP"),
                format!("Reference table for {name}"),
                high,
            );
        }
    }

    /// One `{ id_<base>, nombre }` entity per referenced table that was not detected.
    fn synthesize_support_entities(&mut self) {
        let mut targets: IndexMap<String, String> = IndexMap::new();
        for column in self
            .entities
            .values()
            .flat_map(|e| e.columns.iter())
            .filter(|c| c.is_foreign_key)
        {
            let lower = column.lower_name();
            if let (Some(reference), Some(base)) =
                (column.reference.as_ref(), keys::foreign_key_base(&lower))
            {
                targets
                    .entry(reference.table.clone())
                    .or_insert_with(|| base.to_string());
            }
        }

        for (table, base) in targets {
            if self.entities.contains_key(&table) {
                continue;
            }
            debug!(entity = %table, "synthesizing support entity");
            let columns = vec![
                Column::synthetic(&format!("id_{base}"), "INTEGER"),
                Column::synthetic("nombre", "VARCHAR(100)"),
            ];
            let purpose = format!("Support table for {table}");
            self.add_columns(table, purpose, columns);
        }
    }

    fn resolve_references(&mut self) {
        let primary_keys: IndexMap<String, Option<String>> = self
            .entities
            .iter()
            .map(|(name, e)| (name.clone(), e.primary_key.clone()))
            .collect();

        for entity in self.entities.values_mut() {
            for column in entity.columns.iter_mut().filter(|c| c.is_foreign_key) {
                let own_name = column.name.clone();
                if let Some(reference) = column.reference.as_mut() {
                    reference.column = primary_keys
                        .get(&reference.table)
                        .cloned()
                        .flatten()
                        .unwrap_or(own_name);
                }
            }
        }
    }

    fn materialize_relationships(&mut self) {
        for entity in self.entities.values_mut() {
            entity.relationships = entity
                .columns
                .iter()
                .filter(|c| c.is_foreign_key)
                .filter_map(|c| {
                    c.reference.as_ref().map(|reference| Relationship {
                        column: c.name.clone(),
                        references: reference.clone(),
                        kind: RelationshipKind::ForeignKey,
                        strength: if c.is_required {
                            Strength::Strong
                        } else {
                            Strength::Weak
                        },
                    })
                })
                .collect();
        }
    }
}

pub fn detect_entities(tables: &[Table], vocabulary: &Vocabulary) -> Vec<Entity> {
    EntityDetector::new(vocabulary).detect(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::model::ColumnReference;
    use crate::structure::infer_structure;

    fn detect(text: &str) -> Vec<Entity> {
        let config = NormalizerConfig::default();
        let table = infer_structure(text, &config).unwrap();
        detect_entities(&[table], &config.vocabulary)
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_domain_entities() {
        let entities = detect("id_cliente,nombre_cliente,ciudad\n1,Ana,Quito\n2,Beto,Lima");
        assert_eq!(names(&entities), vec!["CLIENTES", "UBICACIONES"]);

        let clientes = &entities[0];
        assert_eq!(clientes.primary_key.as_deref(), Some("id_cliente"));
        assert_eq!(clientes.columns.len(), 2);
        assert!(clientes.columns[1].is_required);
        assert_eq!(clientes.normalization_score, 85.0);

        let ubicaciones = &entities[1];
        assert_eq!(ubicaciones.primary_key, None);
        assert_eq!(ubicaciones.normalization_score, 80.0);
    }

    #[test]
    fn test_same_name_clusters_merge() {
        // the ORDERS cluster takes the CLIENTES name from its name-like column
        let entities = detect("id_cliente,nombre_cliente_pedido\n1,Ana\n2,Beto");
        assert_eq!(names(&entities), vec!["CLIENTES"]);
        let columns: Vec<&str> = entities[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id_cliente", "nombre_cliente_pedido"]);
        assert_eq!(entities[0].primary_key.as_deref(), Some("id_cliente"));
    }

    #[test]
    fn test_foreign_key_creates_support_entity() {
        let entities = detect("id_venta,id_factura\n1,10\n2,11");
        assert_eq!(names(&entities), vec!["IDENTIFICADORES", "FACTURAS"]);

        let ids = &entities[0];
        assert_eq!(ids.primary_key.as_deref(), Some("id_venta"));
        assert_eq!(ids.relationships.len(), 1);
        let rel = &ids.relationships[0];
        assert_eq!(rel.column, "id_factura");
        assert_eq!(
            rel.references,
            ColumnReference {
                table: "FACTURAS".to_string(),
                column: "id_factura".to_string()
            }
        );
        assert_eq!(rel.strength, Strength::Strong);

        let support = &entities[1];
        assert_eq!(support.primary_key.as_deref(), Some("id_factura"));
        assert_eq!(support.columns[0].sql_type, "INTEGER");
        assert_eq!(support.columns[1].name, "nombre");
        assert!(support.columns[1].is_required);
    }

    #[test]
    fn test_support_key_uses_column_base() {
        let entities = detect("id_venta,id_sucursal\n1,10\n2,11");
        let sucursales = entities.iter().find(|e| e.name == "SUCURSALS").unwrap();
        assert_eq!(sucursales.primary_key.as_deref(), Some("id_sucursal"));

        let entities = detect("id_cliente,id_cliente\n1,2\n3,4");
        let support = entities.iter().find(|e| e.name == "CLIENTE_2S").unwrap();
        assert_eq!(support.primary_key.as_deref(), Some("id_cliente_2"));
    }

    #[test]
    fn test_reference_resolves_to_target_key() {
        let entities = detect("codigo_cliente,id_cliente\nA,1\nB,2");
        assert_eq!(names(&entities), vec!["CLIENTES"]);
        let clientes = &entities[0];
        assert_eq!(clientes.primary_key.as_deref(), Some("codigo_cliente"));
        assert_eq!(clientes.relationships.len(), 1);
        assert_eq!(clientes.relationships[0].references.table, "CLIENTES");
        assert_eq!(clientes.relationships[0].references.column, "codigo_cliente");
    }

    #[test]
    fn test_high_redundancy_split() {
        let text = "ciudad,pais,direccion\n\
                    Quito,EC,a\n\
                    Quito,EC,b\n\
                    Quito,EC,c\n\
                    Quito,EC,d\n\
                    Quito,EC,e\n\
                    Quito,EC,f\n\
                    Quito,EC,g\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h\n\
                    Quito,EC,h";
        let entities = detect(text);
        assert_eq!(names(&entities), vec!["UBICACIONES", "UBICACIONES_LOOKUP"]);
        assert_eq!(entities[0].columns.len(), 1);
        assert_eq!(entities[0].columns[0].name, "direccion");
        let lookup: Vec<&str> = entities[1].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(lookup, vec!["ciudad", "pais"]);
    }

    #[test]
    fn test_entities_never_empty_and_unique() {
        let entities = detect("id,nombre,precio,cantidad,fecha,email,color\n1,a,2.5,3,2024-01-01,a@b.co,rojo");
        let mut seen = IndexSet::new();
        for e in &entities {
            assert!(!e.columns.is_empty());
            assert!(seen.insert(e.name.clone()));
            assert!(e.columns.iter().filter(|c| c.is_primary_key).count() <= 1);
        }
    }
}

//! Domain clustering and entity naming.

use crate::model::Column;
use crate::vocabulary::{Domain, Vocabulary, contains_any};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Cluster {
    pub domain: Domain,
    pub columns: Vec<Column>,
}

/// Group columns by domain, in order of first appearance.
pub fn cluster_by_domain(columns: &[Column], vocabulary: &Vocabulary) -> Vec<Cluster> {
    let mut clusters: IndexMap<Domain, Vec<Column>> = IndexMap::new();
    for column in columns {
        let domain = vocabulary.classify_domain(&column.lower_name());
        clusters.entry(domain).or_default().push(column.clone());
    }
    clusters
        .into_iter()
        .map(|(domain, columns)| Cluster { domain, columns })
        .collect()
}

/// Name hint from the first name-like column, else the domain's entity name.
pub fn entity_name(cluster: &Cluster, vocabulary: &Vocabulary) -> String {
    cluster
        .columns
        .iter()
        .map(Column::lower_name)
        .find(|name| contains_any(name, &vocabulary.name_like))
        .and_then(|name| vocabulary.hinted_name(&name).map(str::to_string))
        .unwrap_or_else(|| vocabulary.entity_name(cluster.domain))
}

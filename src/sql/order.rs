//! Creation order: referenced entities before the entities that reference them.

use crate::model::Entity;
use std::collections::{HashMap, HashSet};

struct Walk<'e> {
    by_name: HashMap<&'e str, &'e Entity>,
    visited: HashSet<&'e str>,
    in_progress: HashSet<&'e str>,
    order: Vec<&'e Entity>,
}

impl<'e> Walk<'e> {
    fn visit(&mut self, name: &'e str) {
        if self.visited.contains(name) || self.in_progress.contains(name) {
            return;
        }
        let Some(entity) = self.by_name.get(name).copied() else {
            return;
        };
        self.in_progress.insert(name);
        for relationship in &entity.relationships {
            self.visit(relationship.references.table.as_str());
        }
        self.in_progress.remove(name);
        self.visited.insert(name);
        self.order.push(entity);
    }
}

/// Depth-first over relationship targets. Cycles are broken by visitation order.
pub fn creation_order(entities: &[Entity]) -> Vec<&Entity> {
    let mut walk = Walk {
        by_name: entities.iter().map(|e| (e.name.as_str(), e)).collect(),
        visited: HashSet::new(),
        in_progress: HashSet::new(),
        order: Vec::with_capacity(entities.len()),
    };
    for entity in entities {
        walk.visit(entity.name.as_str());
    }
    walk.order
}

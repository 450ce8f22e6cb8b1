//! Aggregate statistics over an entity graph.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::EntityGraph;

/// Reference counters. `total == resolved + broken`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceCounts {
    /// Reference parameters seen.
    pub total: usize,
    /// References whose target is declared.
    pub resolved: usize,
    /// References whose target is missing.
    pub broken: usize,
}

/// Counts collected from one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of distinct entity ids.
    pub total_entities: usize,
    /// Number of distinct entity types.
    pub entity_types: usize,
    /// Occurrences per entity type, ordered by type name.
    pub entity_counts: BTreeMap<String, usize>,
    /// Reference counters.
    pub references: ReferenceCounts,
}

impl Stats {
    /// Collect statistics in one pass over the graph's entities.
    ///
    /// Shadowed duplicate declarations are not counted. References are
    /// resolved through the graph lookup as they are counted.
    pub fn collect(graph: &EntityGraph) -> Self {
        let mut stats = Stats::default();
        for entity in graph.entities() {
            stats.total_entities += 1;
            *stats
                .entity_counts
                .entry(entity.type_name.clone())
                .or_default() += 1;

            for param in &entity.params {
                if param.as_reference().is_none() {
                    continue;
                }
                stats.references.total += 1;
                if graph.resolve(param).is_some() {
                    stats.references.resolved += 1;
                } else {
                    stats.references.broken += 1;
                }
            }
        }
        stats.entity_types = stats.entity_counts.len();
        stats
    }

    /// Check if every counter is zero.
    pub fn is_empty(&self) -> bool {
        *self == Stats::default()
    }
}

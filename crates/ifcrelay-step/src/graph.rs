//! Entity graph: id-addressable storage for parsed entities.
//!
//! Building never fails. When two declarations share an id the first one wins
//! lookups; the later one is kept only in the declaration list so the
//! structural checks can report it.

use std::collections::HashMap;

use crate::parser::{Entity, ParamValue};

/// All entities of one data section.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    /// Every declaration in source order, duplicates included.
    declarations: Vec<Entity>,
    /// Id to index of its first declaration.
    index: HashMap<u64, usize>,
}

impl EntityGraph {
    /// Build a graph from entities in source order.
    pub fn build(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut graph = Self::default();
        for entity in entities {
            graph.insert(entity);
        }
        graph
    }

    fn insert(&mut self, entity: Entity) {
        let idx = self.declarations.len();
        self.index.entry(entity.id).or_insert(idx);
        self.declarations.push(entity);
    }

    /// Get an entity by ID.
    pub fn get(&self, id: u64) -> Option<&Entity> {
        self.index.get(&id).map(|&idx| &self.declarations[idx])
    }

    /// Check whether an id is declared.
    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Follow a reference parameter to its target. Returns `None` for
    /// non-reference values and for dangling references.
    pub fn resolve(&self, value: &ParamValue) -> Option<&Entity> {
        value.as_reference().and_then(|id| self.get(id))
    }

    /// One entity per id (the first declaration), in source order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(idx, e)| self.index.get(&e.id) == Some(idx))
            .map(|(_, e)| e)
    }

    /// Every declaration in source order, including shadowed duplicates.
    pub fn declarations(&self) -> &[Entity] {
        &self.declarations
    }

    /// Get all entities of a given type.
    pub fn entities_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities().filter(move |e| e.type_name == type_name)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the graph holds no entities.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_entity_line;

    fn graph(lines: &[&str]) -> EntityGraph {
        EntityGraph::build(
            lines
                .iter()
                .enumerate()
                .filter_map(|(i, l)| parse_entity_line(l, i + 1))
                .map(|p| p.entity),
        )
    }

    #[test]
    fn test_lookup() {
        let g = graph(&["#10=IFCPERSON('A');", "#3=IFCORGANIZATION(#10);"]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.get(10).unwrap().type_name, "IFCPERSON");
        assert!(g.contains(3));
        assert!(!g.contains(1));
        assert!(g.get(1).is_none());
    }

    #[test]
    fn test_first_insertion_wins() {
        let g = graph(&["#1=IFCPERSON('A');", "#2=IFCPERSON('C');", "#1=IFCPERSON('B');"]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.declarations().len(), 3);
        assert_eq!(g.get(1).unwrap().params[0].as_str(), Some("'A'"));

        let ids: Vec<(u64, usize)> = g.entities().map(|e| (e.id, e.line)).collect();
        assert_eq!(ids, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_resolve() {
        let g = graph(&["#1=IFCPERSON('A');", "#2=IFCACTOR(#1,#7,$);"]);
        let actor = g.get(2).unwrap();
        assert_eq!(g.resolve(&actor.params[0]).map(|e| e.id), Some(1));
        assert!(g.resolve(&actor.params[1]).is_none());
        assert!(g.resolve(&actor.params[2]).is_none());
    }

    #[test]
    fn test_entities_of_type() {
        let g = graph(&[
            "#1=IFCWALL('a');",
            "#2=IFCDOOR('b');",
            "#3=IFCWALL('c');",
        ]);
        assert_eq!(g.entities_of_type("IFCWALL").count(), 2);
        assert_eq!(g.entities_of_type("IFCSLAB").count(), 0);
    }

    #[test]
    fn test_empty() {
        let g = EntityGraph::build(Vec::new());
        assert!(g.is_empty());
        assert_eq!(g.entities().count(), 0);
    }
}

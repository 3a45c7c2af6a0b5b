//! Component Dependency Graph
//!
//! Built from `bloks` whitelists: an edge `A -> B` means component `A`
//! may nest `B`, so `B`'s schema has to be emitted first. References to
//! components that were never loaded do not become edges.

mod sort;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

use crate::component::Component;

/// The component dependency graph
pub struct DependencyGraph {
    /// Known components, node indices in first-seen order
    pub(crate) graph: DiGraph<String, ()>,

    /// Node index lookup: component name -> NodeIndex
    pub(crate) node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from loaded components
    pub fn from_components(components: &[Component]) -> Self {
        let dependencies: Vec<(String, Vec<String>)> = components
            .iter()
            .map(|c| (c.name.clone(), c.referenced_components().cloned().collect()))
            .collect();
        Self::from_dependencies(dependencies)
    }

    /// Build the graph from a name -> referenced names mapping
    pub fn from_dependencies(dependencies: Vec<(String, Vec<String>)>) -> Self {
        let mut graph = DiGraph::with_capacity(dependencies.len(), dependencies.len() * 2);
        let mut node_indices = HashMap::with_capacity(dependencies.len());

        for (name, _) in &dependencies {
            node_indices
                .entry(name.clone())
                .or_insert_with(|| graph.add_node(name.clone()));
        }

        for (name, deps) in &dependencies {
            let from = node_indices[name];
            for dep in deps {
                match node_indices.get(dep) {
                    // update_edge keeps one edge per pair, at its first-seen position
                    Some(&to) => {
                        graph.update_edge(from, to, ());
                    }
                    None => tracing::debug!(component = %name, reference = %dep, "reference to unknown component"),
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn component_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Known dependencies of a node in first-seen order.
    ///
    /// petgraph lists neighbors newest edge first, so the list is reversed.
    pub(crate) fn ordered_dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Outgoing).collect();
        deps.reverse();
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(pairs: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        pairs
            .iter()
            .map(|(n, d)| (n.to_string(), d.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_unknown_references_are_not_edges() {
        let graph = DependencyGraph::from_dependencies(deps(&[
            ("page", &["card", "ghost", "card"]),
            ("card", &[]),
        ]));

        assert_eq!(graph.component_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.node_indices.contains_key("ghost"));

        let card = graph.node_indices["card"];
        assert_eq!(graph.ordered_dependencies(graph.node_indices["page"]), [card]);
    }

    #[test]
    fn test_ordered_dependencies_follow_whitelist_order() {
        let graph = DependencyGraph::from_dependencies(deps(&[
            ("page", &["c", "a", "b", "a"]),
            ("a", &[]),
            ("b", &[]),
            ("c", &[]),
        ]));

        let idx = graph.node_indices["page"];
        let names: Vec<_> = graph
            .ordered_dependencies(idx)
            .into_iter()
            .map(|n| graph.graph[n].as_str())
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}

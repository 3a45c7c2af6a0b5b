//! Topological ordering
//!
//! Depth-first with three marks. Re-entering a node that is still on the
//! traversal path is a cycle and aborts the run.

use petgraph::graph::NodeIndex;

use super::DependencyGraph;
use crate::error::{GenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// All component names, dependencies before dependents.
    ///
    /// Independent components keep their first-seen order.
    pub fn topo_order(&self) -> Result<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.graph.node_count());

        for idx in self.graph.node_indices() {
            self.visit(idx, &mut marks, &mut path, &mut order)?;
        }

        Ok(order.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }

    fn visit(
        &self,
        idx: NodeIndex,
        marks: &mut [Mark],
        path: &mut Vec<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) -> Result<()> {
        match marks[idx.index()] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = path.iter().position(|&n| n == idx).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|&n| self.graph[n].clone()).collect();
                cycle.push(self.graph[idx].clone());
                return Err(GenError::CyclicDependency { cycle });
            }
            Mark::Unvisited => {}
        }

        marks[idx.index()] = Mark::InProgress;
        path.push(idx);

        for dep in self.ordered_dependencies(idx) {
            self.visit(dep, marks, path, order)?;
        }

        path.pop();
        marks[idx.index()] = Mark::Done;
        order.push(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(pairs: &[(&str, &[&str])]) -> DependencyGraph {
        DependencyGraph::from_dependencies(
            pairs
                .iter()
                .map(|(n, d)| (n.to_string(), d.iter().map(|s| s.to_string()).collect()))
                .collect(),
        )
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let pairs: &[(&str, &[&str])] = &[
            ("page", &["section", "teaser"]),
            ("section", &["teaser", "button"]),
            ("teaser", &["button"]),
            ("button", &[]),
        ];
        let order = graph(pairs).topo_order().unwrap();

        assert_eq!(order.len(), 4);
        for (from, deps) in pairs {
            for dep in deps.iter() {
                assert!(position(&order, dep) < position(&order, from), "{} before {}", dep, from);
            }
        }
    }

    #[test]
    fn test_independent_components_keep_input_order() {
        let g = graph(&[("c", &[]), ("a", &[]), ("b", &[])]);
        assert_eq!(g.topo_order().unwrap(), ["c", "a", "b"]);
    }

    #[test]
    fn test_article_page_after_its_blocks() {
        let g = graph(&[
            ("article-page", &["card", "button", "text-block"]),
            ("button", &[]),
            ("card", &[]),
            ("text-block", &[]),
        ]);
        let order = g.topo_order().unwrap();
        assert_eq!(order, ["card", "button", "text-block", "article-page"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        match g.topo_order() {
            Err(GenError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, ["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let g = graph(&[("grid", &["grid"])]);
        assert!(matches!(g.topo_order(), Err(GenError::CyclicDependency { .. })));
    }

    #[test]
    fn test_unknown_dependencies_are_ignored() {
        let g = graph(&[("page", &["ghost", "card"]), ("card", &[])]);
        assert_eq!(g.topo_order().unwrap(), ["card", "page"]);
    }
}

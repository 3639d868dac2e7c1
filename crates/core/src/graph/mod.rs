//! Transitive closures and circular-dependency detection.
//!
//! Works over a precomputed direct-edge map in either direction
//! (depends-on or dependants). The map is loaded into a petgraph
//! topology once; closures are DFS reachability with a per-start memo,
//! and circular pairs are mutual membership across closures.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub struct ClosureEngine {
    topology: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    memo: HashMap<NodeIndex, BTreeSet<NodeIndex>>,
}

impl ClosureEngine {
    /// Build the engine from a direct-edge map. Names appearing only as
    /// edge targets become nodes too; names absent from the map simply
    /// have no successors.
    pub fn new(edges: &BTreeMap<String, BTreeSet<String>>) -> Self {
        let mut topology = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        let mut node = |topology: &mut DiGraph<String, ()>,
                        index: &mut HashMap<String, NodeIndex>,
                        name: &str| {
            *index
                .entry(name.to_string())
                .or_insert_with(|| topology.add_node(name.to_string()))
        };

        for (from, targets) in edges {
            let from_ix = node(&mut topology, &mut index, from);
            for to in targets {
                let to_ix = node(&mut topology, &mut index, to);
                topology.add_edge(from_ix, to_ix, ());
            }
        }

        Self {
            topology,
            index,
            memo: HashMap::new(),
        }
    }

    /// Every archive reachable from `start` via chained direct edges.
    /// `start` itself appears only when some path cycles back to it.
    /// Unknown names yield the empty set.
    pub fn transitive_closure(&mut self, start: &str) -> BTreeSet<String> {
        let Some(&start_ix) = self.index.get(start) else {
            return BTreeSet::new();
        };
        let closure = self.closure_of(start_ix).clone();
        closure
            .iter()
            .map(|&ix| self.topology[ix].clone())
            .collect()
    }

    /// Cycle partners for every node: B is a partner of A iff each is in
    /// the other's transitive closure. Symmetric by construction; acyclic
    /// archives map to the empty set.
    pub fn circular_pairs(&mut self) -> BTreeMap<String, BTreeSet<String>> {
        let nodes: Vec<NodeIndex> = self.topology.node_indices().collect();
        let mut out = BTreeMap::new();

        for &a in &nodes {
            let closure_a = self.closure_of(a).clone();
            let mut partners = BTreeSet::new();
            for &b in &closure_a {
                if b == a {
                    continue;
                }
                if self.closure_of(b).contains(&a) {
                    partners.insert(self.topology[b].clone());
                }
            }
            out.insert(self.topology[a].clone(), partners);
        }
        out
    }

    /// DFS reachability from the successors of `start`; the visited set
    /// both memoizes work within one traversal and guarantees
    /// termination on cyclic graphs. Results are cached per start node.
    fn closure_of(&mut self, start: NodeIndex) -> &BTreeSet<NodeIndex> {
        if !self.memo.contains_key(&start) {
            let mut visited: HashSet<NodeIndex> = HashSet::new();
            let mut stack: Vec<NodeIndex> = self.topology.neighbors(start).collect();
            while let Some(current) = stack.pop() {
                if visited.insert(current) {
                    stack.extend(self.topology.neighbors(current));
                }
            }
            self.memo.insert(start, visited.into_iter().collect());
        }
        &self.memo[&start]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_map(edges: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
        edges
            .iter()
            .map(|(from, to)| {
                (
                    from.to_string(),
                    to.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn closure_excludes_start_on_acyclic_graphs() {
        let mut engine = ClosureEngine::new(&edge_map(&[
            ("a.jar", &["b.jar"]),
            ("b.jar", &["c.jar"]),
            ("c.jar", &[]),
        ]));
        let closure = engine.transitive_closure("a.jar");
        assert_eq!(
            closure.into_iter().collect::<Vec<_>>(),
            vec!["b.jar".to_string(), "c.jar".to_string()]
        );
        assert!(engine.transitive_closure("c.jar").is_empty());
        assert!(engine.transitive_closure("unknown.jar").is_empty());
    }

    #[test]
    fn closure_is_idempotent() {
        let mut engine = ClosureEngine::new(&edge_map(&[
            ("a.jar", &["b.jar"]),
            ("b.jar", &["a.jar", "c.jar"]),
        ]));
        let first = engine.transitive_closure("a.jar");
        let second = engine.transitive_closure("a.jar");
        assert_eq!(first, second);
    }

    #[test]
    fn start_appears_only_under_a_cycle() {
        let mut engine = ClosureEngine::new(&edge_map(&[
            ("a.jar", &["b.jar"]),
            ("b.jar", &["a.jar"]),
            ("c.jar", &["a.jar"]),
        ]));
        assert!(engine.transitive_closure("a.jar").contains("a.jar"));
        assert!(!engine.transitive_closure("c.jar").contains("c.jar"));
    }

    #[test]
    fn circular_pairs_are_symmetric() {
        let mut engine = ClosureEngine::new(&edge_map(&[
            ("d.jar", &["e.jar"]),
            ("e.jar", &["d.jar"]),
            ("f.jar", &["d.jar"]),
        ]));
        let pairs = engine.circular_pairs();
        assert_eq!(
            pairs["d.jar"],
            ["e.jar".to_string()].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(
            pairs["e.jar"],
            ["d.jar".to_string()].into_iter().collect::<BTreeSet<_>>()
        );
        assert!(pairs["f.jar"].is_empty());
    }

    #[test]
    fn three_way_cycle_flags_every_member() {
        let mut engine = ClosureEngine::new(&edge_map(&[
            ("a.jar", &["b.jar"]),
            ("b.jar", &["c.jar"]),
            ("c.jar", &["a.jar"]),
        ]));
        let pairs = engine.circular_pairs();
        for name in ["a.jar", "b.jar", "c.jar"] {
            assert_eq!(pairs[name].len(), 2, "{name} should have two partners");
        }
    }
}

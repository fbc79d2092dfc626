//! Converts a constituency graph to dependency edges by head percolation.

use itertools::Itertools;
use std::collections::{HashMap, HashSet};

use crate::types::DependencyEdge;

/// Relation of tokens which are not attached anywhere in the constituency graph.
pub const UNATTACHED_RELATION: &str = "--";

/// A labeled edge from a nonterminal to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdge {
    pub label: String,
    pub child: String,
}

/// The constituency graph of one sentence: terminal ids in sentence order,
/// nonterminals with their child edges and the id of the root node.
#[derive(Debug, Clone, Default)]
pub struct Constituency {
    terminals: Vec<String>,
    nonterminals: HashMap<String, Vec<ChildEdge>>,
    root: Option<String>,
}

impl Constituency {
    pub fn new(terminals: Vec<String>, root: Option<String>) -> Self {
        Constituency {
            terminals,
            nonterminals: HashMap::new(),
            root,
        }
    }

    pub fn add_nonterminal(&mut self, id: String, edges: Vec<ChildEdge>) {
        self.nonterminals.insert(id, edges);
    }

    pub fn is_nonterminal(&self, id: &str) -> bool {
        self.nonterminals.contains_key(id)
    }

    /// The head child of a nonterminal: the child labeled `HD`, else `PH`, else the first `CJ`,
    /// else the last `NK`, else the first child.
    fn head_child<'a>(&self, edges: &'a [ChildEdge]) -> Option<&'a ChildEdge> {
        let first = |label: &str| edges.iter().find(|x| x.label == label);

        first("HD")
            .or_else(|| first("PH"))
            .or_else(|| first("CJ"))
            .or_else(|| edges.iter().rev().find(|x| x.label == "NK"))
            .or_else(|| edges.first())
    }

    /// Follows head children down to a terminal. `None` for unknown nodes and cyclic graphs.
    pub fn lexical_head(&self, id: &str) -> Option<&str> {
        let mut current = id;

        for _ in 0..=self.nonterminals.len() {
            match self.nonterminals.get(current) {
                Some(edges) => current = self.head_child(edges)?.child.as_str(),
                None => {
                    return self
                        .terminals
                        .iter()
                        .find(|x| *x == current)
                        .map(|x| x.as_str())
                }
            }
        }

        None
    }

    /// All terminals dominated by a node in sentence order. A terminal id yields itself.
    pub fn terminal_yield(&self, id: &str) -> Vec<String> {
        let mut found = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            match self.nonterminals.get(current) {
                Some(edges) => stack.extend(edges.iter().map(|x| x.child.as_str())),
                None => {
                    found.insert(current);
                }
            }
        }

        self.terminals
            .iter()
            .filter(|x| found.contains(x.as_str()))
            .cloned()
            .collect()
    }

    /// Converts the graph to dependency edges.
    ///
    /// Each non-head child depends on the lexical head of its parent, labeled with the constituency edge label.
    /// Terminals which end up without a head (e. g. punctuation, which TIGER leaves unattached) depend on the
    /// lexical head of the root with the label [UNATTACHED_RELATION].
    /// Without a usable root no edges are created.
    pub fn dependencies(&self) -> Vec<DependencyEdge> {
        let root = match self.root.as_deref().and_then(|x| self.lexical_head(x)) {
            Some(root) => root,
            None => return Vec::new(),
        };

        let mut heads: HashMap<&str, (&str, &str)> = HashMap::new();

        // sorted for deterministic output on graphs where a node has multiple parents
        for (_, edges) in self.nonterminals.iter().sorted_by_key(|x| x.0) {
            let head_child = match self.head_child(edges) {
                Some(x) => x,
                None => continue,
            };
            let head = match self.lexical_head(&head_child.child) {
                Some(x) => x,
                None => continue,
            };

            for edge in edges.iter().filter(|x| !std::ptr::eq(*x, head_child)) {
                if let Some(dependent) = self.lexical_head(&edge.child) {
                    if dependent != head {
                        heads.entry(dependent).or_insert((head, edge.label.as_str()));
                    }
                }
            }
        }

        self.terminals
            .iter()
            .filter(|x| x.as_str() != root)
            .map(|dependent| match heads.get(dependent.as_str()) {
                Some((head, label)) => DependencyEdge::new(*head, dependent.as_str(), *label),
                None => DependencyEdge::new(root, dependent.as_str(), UNATTACHED_RELATION),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(label: &str, child: &str) -> ChildEdge {
        ChildEdge {
            label: label.to_string(),
            child: child.to_string(),
        }
    }

    /// "Der Hund bellt nicht ." with NP and S nonterminals.
    fn example() -> Constituency {
        let mut graph = Constituency::new(
            (1..=5).map(|i| format!("t{}", i)).collect(),
            Some("n2".to_string()),
        );
        graph.add_nonterminal("n1".into(), vec![edge("NK", "t1"), edge("NK", "t2")]);
        graph.add_nonterminal(
            "n2".into(),
            vec![edge("SB", "n1"), edge("HD", "t3"), edge("NG", "t4")],
        );
        graph
    }

    #[test]
    fn percolates_heads() {
        let graph = example();
        assert_eq!(graph.lexical_head("n2"), Some("t3"));
        assert_eq!(graph.lexical_head("n1"), Some("t2"));

        let mut edges = graph.dependencies();
        edges.sort_by(|a, b| a.dependent.cmp(&b.dependent));

        assert_eq!(
            edges,
            vec![
                DependencyEdge::new("t2", "t1", "NK"),
                DependencyEdge::new("t3", "t2", "SB"),
                DependencyEdge::new("t3", "t4", "NG"),
                DependencyEdge::new("t3", "t5", "--"),
            ]
        );
    }

    #[test]
    fn yield_follows_nonterminals() {
        let graph = example();

        assert_eq!(graph.terminal_yield("n1"), vec!["t1", "t2"]);
        assert_eq!(graph.terminal_yield("n2"), vec!["t1", "t2", "t3", "t4"]);
        assert_eq!(graph.terminal_yield("t4"), vec!["t4"]);
        assert!(graph.terminal_yield("x").is_empty());
    }

    #[test]
    fn first_conjunct_heads_coordination() {
        let mut graph = Constituency::new(
            vec!["a".into(), "b".into(), "c".into()],
            Some("cs".into()),
        );
        graph.add_nonterminal(
            "cs".into(),
            vec![edge("CJ", "a"), edge("CD", "b"), edge("CJ", "c")],
        );

        let mut edges = graph.dependencies();
        edges.sort_by(|a, b| a.dependent.cmp(&b.dependent));

        assert_eq!(
            edges,
            vec![
                DependencyEdge::new("a", "b", "CD"),
                DependencyEdge::new("a", "c", "CJ"),
            ]
        );
    }

    #[test]
    fn cyclic_graph_has_no_head() {
        let mut graph = Constituency::new(vec!["a".into()], Some("n1".into()));
        graph.add_nonterminal("n1".into(), vec![edge("HD", "n2")]);
        graph.add_nonterminal("n2".into(), vec![edge("HD", "n1")]);

        assert_eq!(graph.lexical_head("n1"), None);
        assert!(graph.dependencies().is_empty());
    }
}

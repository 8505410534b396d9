//! Graph compaction: in-degree counting and chain collapsing.
//!
//! Runs once, after all inserts. Traversals stamp nodes with the builder's
//! monotonically increasing visit epoch, so no per-node flags need
//! resetting between passes.

use super::builder::Builder;
use super::node::{NodeId, ROOT};

impl Builder {
    /// Finishes canonicalization and compacts the DAWG.
    ///
    /// Returns the root of the compacted graph.
    pub(crate) fn optimize(&mut self) -> NodeId {
        let root = self.canonicalize(ROOT);
        self.epoch += 1;
        self.count_degrees(root);
        self.epoch += 1;
        self.collapse_chains(root);
        self.epoch += 1;
        self.mark_singletons(root);
        root
    }

    /// Counts incoming edges per node. The first visit also stands for the
    /// owner's reference, so the root ends up with in-degree 1.
    fn count_degrees(&mut self, id: NodeId) {
        let epoch = self.epoch;
        if self.node(id).seen == epoch {
            self.node_mut(id).in_degree += 1;
            return;
        }
        self.node_mut(id).seen = epoch;
        self.node_mut(id).in_degree = 1;
        for i in 0..self.node(id).edges.len() {
            let child = self.node(id).edges[i].1;
            self.count_degrees(child);
        }
    }

    /// Fuses singleton children into their parents, bottom-up.
    ///
    /// A child with exactly one edge and no members of its own is deleted
    /// and its label appended to the parent's, provided it has a single
    /// parent or its label is a single character. The single-character
    /// case fires even for shared children: re-emitting one character per
    /// parent costs no more than the edge it replaces, though it does
    /// duplicate the child's entry in the packed output.
    fn collapse_chains(&mut self, id: NodeId) {
        let epoch = self.epoch;
        if self.node(id).seen == epoch {
            return;
        }
        self.node_mut(id).seen = epoch;
        for i in 0..self.node(id).edges.len() {
            let child = self.node(id).edges[i].1;
            self.collapse_chains(child);
            if !self.node(child).is_singleton() {
                continue;
            }
            let (child_label, grandchild) = self.node(child).edges[0].clone();
            if self.node(child).in_degree == 1 || child_label.len() == 1 {
                let fused = format!("{}{}", self.node(id).edges[i].0, child_label);
                self.node_mut(id).edges[i] = (fused, grandchild);
            }
        }
    }

    /// Tags nodes that survived collapsing in singleton shape with their
    /// sole edge label.
    fn mark_singletons(&mut self, id: NodeId) {
        let epoch = self.epoch;
        if self.node(id).seen == epoch {
            return;
        }
        self.node_mut(id).seen = epoch;
        for i in 0..self.node(id).edges.len() {
            let child = self.node(id).edges[i].1;
            self.mark_singletons(child);
        }
        let label = self
            .node(id)
            .is_singleton()
            .then(|| self.node(id).edges[0].0.clone());
        self.node_mut(id).single_label = label;
    }
}

#[cfg(test)]
mod test {
    use hashbrown::HashSet;

    use super::*;

    /// Collects the nodes reachable from `root` and the number of directed
    /// edges among them.
    fn survey(b: &Builder, root: NodeId) -> (HashSet<NodeId>, usize) {
        let mut seen = HashSet::new();
        let mut edges = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            edges += b.node(id).edges.len();
            stack.extend(b.node(id).edges.iter().map(|&(_, c)| c));
        }
        (seen, edges)
    }

    fn optimized(words: &[&str]) -> (Builder, NodeId) {
        let mut b = Builder::new();
        b.insert_all(words).unwrap();
        let root = b.optimize();
        (b, root)
    }

    #[test]
    fn in_degrees_sum_to_edge_count_plus_root() {
        let mut b = Builder::new();
        b.insert_all(["nation", "national", "nationalism", "nationalist"])
            .unwrap();
        let root = b.canonicalize(ROOT);
        b.epoch += 1;
        b.count_degrees(root);
        let (reachable, edges) = survey(&b, root);
        let total: u32 = reachable.iter().map(|&id| b.node(id).in_degree).sum();
        assert_eq!(total as usize, edges + 1);
        assert_eq!(b.node(root).in_degree, 1);
    }

    #[test]
    fn shared_nodes_accumulate_in_degree() {
        let mut b = Builder::new();
        b.insert_all(["ab", "ac", "bb", "bc"]).unwrap();
        let root = b.canonicalize(ROOT);
        b.epoch += 1;
        b.count_degrees(root);
        // both root edges land on the same canonical child
        let shared = b.node(root).edges[0].1;
        assert_eq!(b.node(root).edges[1].1, shared);
        assert_eq!(b.node(shared).in_degree, 2);
    }

    #[test]
    fn chains_collapse_into_fused_labels() {
        let (b, root) = optimized(&["nation", "national", "nationalism", "nationalist"]);
        // the whole unbranched prefix fused into a single edge
        assert_eq!(b.node(root).edges.len(), 1);
        assert_eq!(b.node(root).edges[0].0, "nation");
        let n1 = b.node(root).edges[0].1;
        assert!(b.node(n1).terminal);
        assert_eq!(b.node(n1).edges[0].0, "al");
        let n2 = b.node(n1).edges[0].1;
        assert!(b.node(n2).terminal);
        assert_eq!(b.node(n2).edges[0].0, "is");
        let n3 = b.node(n2).edges[0].1;
        assert_eq!(b.node(n3).inline.as_slice(), b"mt");
    }

    #[test]
    fn single_character_singletons_collapse_even_when_shared() {
        // "axy" and "bxy" share the canonical x-chain; its label has
        // length 1, so both parents fuse it and duplicate the reference
        // to the leaf.
        let (b, root) = optimized(&["axy", "bxy"]);
        let (reachable, _) = survey(&b, root);
        assert_eq!(reachable.len(), 2);
        let labels: Vec<&str> = b.node(root).edges.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["ax", "bx"]);
        assert_eq!(b.node(root).edges[0].1, b.node(root).edges[1].1);
    }

    #[test]
    fn shared_singletons_with_long_labels_stay_put() {
        // After its own chain collapses, the node below 'a' and 'za'
        // carries the two-character label "bc" and two parents, so it is
        // not fused again.
        let (b, root) = optimized(&["abcd", "zabcd"]);
        let labels: Vec<&str> = b.node(root).edges.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["a", "za"]);
        let shared = b.node(root).edges[0].1;
        assert_eq!(b.node(root).edges[1].1, shared);
        assert_eq!(b.node(shared).edges[0].0, "bc");
    }

    #[test]
    fn surviving_singletons_are_marked() {
        let (b, root) = optimized(&["abcd", "zabcd"]);
        let shared = b.node(root).edges[0].1;
        assert_eq!(b.node(shared).single_label.as_deref(), Some("bc"));
        // the root has two edges and no mark
        assert_eq!(b.node(root).single_label, None);
    }

    #[test]
    fn collapsing_preserves_node_sharing() {
        let (b, root) = optimized(&["ab", "ac", "bb", "bc"]);
        let (reachable, _) = survey(&b, root);
        // root plus one shared child holding the two inline terminals
        assert_eq!(reachable.len(), 2);
    }
}

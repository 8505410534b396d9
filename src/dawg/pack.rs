//! Textual packing of the compacted DAWG.
//!
//! Nodes are numbered root-first in a depth-first order in which every
//! edge points forward; for a plain tree this is exactly pre-order, and a
//! shared node takes its place once all referencing parents are placed.
//! Each node then emits
//!
//! ```text
//! node   := '!'? inline* edge*
//! inline := one character
//! edge   := ',' refnum label
//! ```
//!
//! where `refnum` is the prefix-free encoding of the child's number minus
//! this node's number (always positive), and nodes are joined with `';'`.
//! Inline terminals come first in lexicographic order, then edges in
//! lexicographic order of label. The result is a single printable string
//! with no whitespace.

use super::alphabet;
use super::builder::Builder;
use super::node::NodeId;

/// Numbers the nodes reachable from `root` and emits the packed string.
pub(crate) fn emit(b: &mut Builder, root: NodeId) -> String {
    b.epoch += 1;
    let mut order = Vec::new();
    postorder(b, root, &mut order);
    order.reverse();
    for (i, &id) in order.iter().enumerate() {
        b.node_mut(id).number = i as u32;
    }
    let mut out = String::new();
    for (i, &id) in order.iter().enumerate() {
        if i > 0 {
            out.push(alphabet::NODE_SEP as char);
        }
        emit_node(b, id, &mut out);
    }
    out
}

/// Post-order DFS with children taken in reverse label order; reversing
/// the result yields the forward-reference numbering above.
fn postorder(b: &mut Builder, id: NodeId, order: &mut Vec<NodeId>) {
    let epoch = b.epoch;
    if b.node(id).seen == epoch {
        return;
    }
    b.node_mut(id).seen = epoch;
    for i in (0..b.node(id).edges.len()).rev() {
        let child = b.node(id).edges[i].1;
        postorder(b, child, order);
    }
    order.push(id);
}

fn emit_node(b: &Builder, id: NodeId, out: &mut String) {
    let n = b.node(id);
    debug_assert_eq!(n.single_label.is_some(), n.is_singleton());
    if n.terminal {
        out.push(alphabet::TERMINAL as char);
    }
    for &c in &n.inline {
        out.push(c as char);
    }
    for (label, child) in &n.edges {
        out.push(alphabet::REF_INTRO as char);
        alphabet::encode_number(u64::from(b.node(*child).number - n.number), out);
        out.push_str(label);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn packed(words: &[&str]) -> String {
        let mut b = Builder::new();
        b.insert_all(words).unwrap();
        b.pack()
    }

    #[test]
    fn tiny_dictionaries() {
        assert_eq!(packed(&[]), "");
        assert_eq!(packed(&[""]), "!");
        assert_eq!(packed(&["a"]), "a");
        assert_eq!(packed(&["a", "b", "c"]), "abc");
    }

    #[test]
    fn forked_words_pack_by_hand() {
        // root --ca--> {t, r --r--> {!t}}; see the fork walkthrough in
        // the unpacker tests for the query side.
        assert_eq!(packed(&["cat", "car", "cart"]), ",1ca;t,1r;!t");
    }

    #[test]
    fn nested_prefix_words_pack_by_hand() {
        assert_eq!(packed(&["a", "ab", "abc"]), ",1a;!,1b;!c");
    }

    #[test]
    fn shared_subtrees_are_emitted_once() {
        let out = packed(&["ab", "ac", "bb", "bc"]);
        assert_eq!(out, ",1a,1b;bc");
        assert_eq!(out.matches("bc").count(), 1);
    }

    #[test]
    fn collapsed_chains_pack_as_long_labels() {
        assert_eq!(
            packed(&["nation", "national", "nationalism", "nationalist"]),
            ",1nation;!,1al;!,1is;mt"
        );
    }

    #[test]
    fn insertion_order_does_not_change_the_output() {
        let sorted = packed(&["bake", "baked", "cake", "caked", "lake"]);
        let shuffled = packed(&["caked", "bake", "lake", "baked", "cake"]);
        assert_eq!(sorted, shuffled);
        let with_duplicates = packed(&["cake", "cake", "bake", "baked", "lake", "caked", "bake"]);
        assert_eq!(sorted, with_duplicates);
    }

    #[test]
    fn references_always_point_forward() {
        let mut b = Builder::new();
        b.insert_all(["abcd", "zabcd", "axy", "bxy"]).unwrap();
        let root = b.optimize();
        let out = emit(&mut b, root);
        assert!(!out.is_empty());
        assert_eq!(b.node(root).number, 0);
        let mut stack = vec![root];
        let mut checked = hashbrown::HashSet::new();
        while let Some(id) = stack.pop() {
            if !checked.insert(id) {
                continue;
            }
            for &(_, child) in &b.node(id).edges {
                assert!(b.node(child).number > b.node(id).number);
                stack.push(child);
            }
        }
    }
}

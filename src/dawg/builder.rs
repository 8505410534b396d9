//! Incremental trie construction and DAWG canonicalization.
//!
//! The builder accepts words in any order. As soon as a new word diverges
//! from the previous one, the branch left behind can never change again and
//! is frozen: structurally identical subtrees are collapsed into a single
//! shared node through a signature registry, turning the trie into a DAWG
//! on the fly. Sorted input keeps the whole construction single-pass;
//! unsorted input stays correct (frozen nodes are copied on descent) and is
//! fully re-deduplicated by the final canonicalization pass in
//! [`Builder::pack`].

use std::fmt::Write as _;

use hashbrown::HashMap;

use super::alphabet;
use super::node::{common_prefix_len, Node, NodeId, ROOT};
use super::pack;

/// Errors raised while feeding words to a [`Builder`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// The word contains a character outside the packed alphabet.
    #[error("word {word:?} contains unsupported character {ch:?}")]
    UnsupportedChar {
        /// The rejected word.
        word: String,
        /// The first offending character.
        ch: char,
    },
    /// A key passed to [`Builder::insert_entry`] contains the key/value
    /// separator.
    #[error("key {key:?} contains the reserved value separator '_'")]
    SeparatorInKey {
        /// The rejected key.
        key: String,
    },
}

/// Builds a packed dictionary from a set of words.
///
/// Words may be inserted in any order; lexicographically sorted input lets
/// the builder freeze and share subtrees as it goes, which keeps peak
/// memory proportional to the DAWG rather than the trie.
///
/// # Examples
///
/// ```
/// use dawgpack::dawg::{Builder, PackedDict};
///
/// let mut builder = Builder::new();
/// builder.insert("cart").unwrap();
/// builder.insert("cat").unwrap();
/// let dict = PackedDict::new(builder.pack()).unwrap();
///
/// assert!(dict.is_word("cart").unwrap());
/// assert!(!dict.is_word("car").unwrap());
/// ```
pub struct Builder {
    pub(crate) nodes: Vec<Node>,
    /// Canonical nodes keyed by structural signature.
    registry: HashMap<String, NodeId>,
    next_canonical: u32,
    pub(crate) epoch: u32,
    last: String,
}

impl Builder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Builder {
            nodes: vec![Node::default()],
            registry: HashMap::new(),
            next_canonical: 0,
            epoch: 0,
            last: String::new(),
        }
    }

    /// Adds a word to the dictionary.
    ///
    /// The empty word is accepted and marks the root terminal. Inserting a
    /// word twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::UnsupportedChar`] if the word contains a
    /// character outside the 64-character packed alphabet
    /// (`0-9 a-z A-Z - _`).
    pub fn insert(&mut self, word: &str) -> Result<(), InsertError> {
        validate_word(word)?;
        let prev = std::mem::replace(&mut self.last, word.to_owned());
        self.freeze_diverged(&prev, word);
        self.insert_at(ROOT, word);
        Ok(())
    }

    /// Adds every word in `words`; duplicates are silently dropped.
    pub fn insert_all<I, S>(&mut self, words: I) -> Result<(), InsertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref())?;
        }
        Ok(())
    }

    /// Adds a key/value entry for a keyed dictionary.
    ///
    /// The entry is stored as `key`, the `'_'` separator, then `value`, so
    /// it can later be retrieved with
    /// [`PackedDict::lookup`](super::PackedDict::lookup). Keys must not
    /// contain `'_'`; values may.
    ///
    /// # Examples
    ///
    /// ```
    /// use dawgpack::dawg::{Builder, PackedDict};
    ///
    /// let mut builder = Builder::new();
    /// builder.insert_entry("en", "english").unwrap();
    /// builder.insert_entry("sv", "svenska").unwrap();
    /// let dict = PackedDict::new(builder.pack()).unwrap();
    ///
    /// assert_eq!(dict.lookup("sv").unwrap().as_deref(), Some("svenska"));
    /// assert_eq!(dict.lookup("de").unwrap(), None);
    /// ```
    pub fn insert_entry(&mut self, key: &str, value: &str) -> Result<(), InsertError> {
        if key.bytes().any(|b| b == alphabet::VALUE_SEP) {
            return Err(InsertError::SeparatorInKey { key: key.to_owned() });
        }
        validate_word(key)?;
        validate_word(value)?;
        let mut joined = String::with_capacity(key.len() + value.len() + 1);
        joined.push_str(key);
        joined.push(alphabet::VALUE_SEP as char);
        joined.push_str(value);
        self.insert(&joined)
    }

    /// Finalizes the dictionary and returns its packed serialization.
    ///
    /// Consumes the builder: the remaining unfrozen branches are
    /// canonicalized, the DAWG is compacted (in-degree counting plus chain
    /// collapsing) and the nodes are emitted in a depth-first order in
    /// which every child reference points forward. The trie and the
    /// signature registry are released before this returns.
    pub fn pack(mut self) -> String {
        let root = self.optimize();
        pack::emit(&mut self, root)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeId
    }

    /// Descends from `start` and records `word`, creating, promoting and
    /// splitting nodes as needed.
    fn insert_at(&mut self, start: NodeId, word: &str) {
        let mut node = start;
        let mut rest = word;
        loop {
            if rest.is_empty() {
                self.node_mut(node).terminal = true;
                return;
            }
            let first = rest.as_bytes()[0];
            if let Ok(i) = self.node(node).inline.binary_search(&first) {
                if rest.len() == 1 {
                    return; // already a member
                }
                // Promote the inline terminal to a real terminal node so
                // the longer word can hang below it.
                self.node_mut(node).inline.remove(i);
                let child = self.alloc(Node {
                    terminal: true,
                    ..Node::default()
                });
                let at = self
                    .node(node)
                    .edge_by_first(first)
                    .expect_err("inline and edge namespaces are disjoint");
                self.node_mut(node)
                    .edges
                    .insert(at, ((first as char).to_string(), child));
                node = child;
                rest = &rest[1..];
                continue;
            }
            match self.node(node).edge_by_first(first) {
                Err(at) => {
                    if rest.len() == 1 {
                        let at = self
                            .node(node)
                            .inline
                            .binary_search(&first)
                            .expect_err("no inline terminal matched above");
                        self.node_mut(node).inline.insert(at, first);
                        return;
                    }
                    let child = self.alloc(Node::default());
                    self.node_mut(node)
                        .edges
                        .insert(at, ((first as char).to_string(), child));
                    node = child;
                    rest = &rest[1..];
                }
                Ok(i) => {
                    let (label, target) = self.node(node).edges[i].clone();
                    let p = common_prefix_len(&label, rest);
                    if p == label.len() {
                        node = self.thaw(node, i);
                        rest = &rest[p..];
                    } else {
                        // The word leaves the edge mid-label: split it
                        // through a fresh intermediate node and re-hang
                        // the old target below.
                        let mid = self.alloc(Node::default());
                        self.node_mut(mid).edges.push((label[p..].to_string(), target));
                        self.node_mut(node).edges[i] = (label[..p].to_string(), mid);
                        node = mid;
                        rest = &rest[p..];
                    }
                }
            }
        }
    }

    /// Returns the target of the `i`-th edge of `parent`, replacing it
    /// with a private mutable copy if it has been frozen already.
    ///
    /// The registered original stays untouched for its other parents; a
    /// copy that ends up unmodified re-unifies with it through the
    /// registry during final canonicalization.
    fn thaw(&mut self, parent: NodeId, i: usize) -> NodeId {
        let child = self.node(parent).edges[i].1;
        if self.node(child).canonical.is_none() {
            return child;
        }
        let frozen = self.node(child);
        let copy = Node {
            terminal: frozen.terminal,
            inline: frozen.inline.clone(),
            edges: frozen.edges.clone(),
            ..Node::default()
        };
        let id = self.alloc(copy);
        self.node_mut(parent).edges[i].1 = id;
        id
    }

    /// Freezes the branch that `prev` no longer shares with `curr`.
    ///
    /// Walks `prev`'s path as far as the common prefix reaches; the child
    /// it leaves behind there can never be modified again and is handed to
    /// the canonicalizer.
    fn freeze_diverged(&mut self, prev: &str, curr: &str) {
        let shared = common_prefix_len(prev, curr);
        let mut node = ROOT;
        let mut consumed = 0;
        loop {
            let rest = &prev[consumed..];
            if rest.is_empty() {
                return; // prev is a prefix of curr; nothing diverges
            }
            let first = rest.as_bytes()[0];
            if self.node(node).inline.binary_search(&first).is_ok() {
                return; // prev ends in an inline terminal; no subtree below
            }
            let Ok(i) = self.node(node).edge_by_first(first) else {
                return;
            };
            let (label, child) = self.node(node).edges[i].clone();
            if consumed + label.len() <= shared {
                consumed += label.len();
                node = child;
            } else {
                // curr leaves the edge here: everything below is final
                let canon = self.canonicalize(child);
                self.node_mut(node).edges[i].1 = canon;
                return;
            }
        }
    }

    /// Returns a node structurally equivalent to `id`, shared with a
    /// previously canonicalized node when one exists.
    ///
    /// Children are canonicalized first (edges stay sorted by label, so
    /// signatures are deterministic); the node is then either unified with
    /// the registry entry carrying the same signature or registered under
    /// the next canonical id.
    pub(crate) fn canonicalize(&mut self, id: NodeId) -> NodeId {
        if self.node(id).canonical.is_some() {
            return id;
        }
        for i in 0..self.node(id).edges.len() {
            let child = self.node(id).edges[i].1;
            let canon = self.canonicalize(child);
            self.node_mut(id).edges[i].1 = canon;
        }
        let sig = self.signature(id);
        if let Some(&shared) = self.registry.get(&sig) {
            return shared;
        }
        let fresh_id = self.next_canonical;
        self.next_canonical += 1;
        self.node_mut(id).canonical = Some(fresh_id);
        self.registry.insert(sig, id);
        id
    }

    /// Structural signature: terminal marker, then the inline terminals
    /// and edges merged in label order, edges tagged with their child's
    /// canonical id.
    fn signature(&self, id: NodeId) -> String {
        let n = self.node(id);
        let mut sig = String::new();
        if n.terminal {
            sig.push('!');
        }
        let (mut ii, mut ei) = (0, 0);
        while ii < n.inline.len() || ei < n.edges.len() {
            let inline_first = n.inline.get(ii).copied();
            let edge_first = n.edges.get(ei).map(|(label, _)| label.as_bytes()[0]);
            sig.push(',');
            let take_inline = match (inline_first, edge_first) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                _ => false,
            };
            if take_inline {
                sig.push(n.inline[ii] as char);
                ii += 1;
            } else {
                let (label, child) = &n.edges[ei];
                let canon = self
                    .node(*child)
                    .canonical
                    .expect("children are canonicalized first");
                let _ = write!(sig, "{label}>{canon}");
                ei += 1;
            }
        }
        sig
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_word(word: &str) -> Result<(), InsertError> {
    match word
        .chars()
        .find(|&c| !(c.is_ascii() && alphabet::word_byte_ok(c as u8)))
    {
        Some(ch) => Err(InsertError::UnsupportedChar {
            word: word.to_owned(),
            ch,
        }),
        None => Ok(()),
    }
}

/// Packs an iterator of words into a dictionary string.
///
/// Convenience wrapper around [`Builder`]; words may come in any order.
///
/// # Examples
///
/// ```
/// use dawgpack::dawg::{pack_words, PackedDict};
///
/// let packed = pack_words(["bake", "cake", "lake"]).unwrap();
/// let dict = PackedDict::new(packed).unwrap();
///
/// assert!(dict.is_word("cake").unwrap());
/// assert!(!dict.is_word("ake").unwrap());
/// ```
pub fn pack_words<I, S>(words: I) -> Result<String, InsertError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = Builder::new();
    builder.insert_all(words)?;
    Ok(builder.pack())
}

//! Query engine that walks the packed string directly.
//!
//! [`PackedDict`] never reconstructs the dictionary: construction is a
//! single linear scan that records where each node's entries begin, and
//! every query walks the text from node 0, decoding entries on demand.
//! The dictionary is immutable after construction and safe to share
//! across concurrent readers.

use std::ops::Range;

use smallvec::SmallVec;

use super::alphabet;

/// Errors raised for a malformed packed string.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnpackError {
    /// A character that cannot occur at this position.
    #[error("unexpected character {ch:?} at byte {pos}")]
    UnexpectedChar {
        /// Byte offset into the packed string.
        pos: usize,
        /// The offending character.
        ch: char,
    },
    /// A child reference ran out of digits.
    #[error("truncated node reference at byte {pos}")]
    TruncatedRef {
        /// Byte offset into the packed string.
        pos: usize,
    },
    /// A child reference points outside the dictionary.
    #[error("node {from} references nonexistent node {to}")]
    DanglingRef {
        /// Number of the referencing node.
        from: usize,
        /// The out-of-range target number.
        to: usize,
    },
}

/// A read-only dictionary decoded lazily from its packed string.
///
/// # Examples
///
/// ```
/// use dawgpack::dawg::{pack_words, PackedDict};
///
/// let packed = pack_words(["nation", "national", "nationalism"]).unwrap();
/// let dict = PackedDict::new(packed).unwrap();
///
/// assert!(dict.is_word("national").unwrap());
/// assert!(!dict.is_word("nationalize").unwrap());
/// assert!(dict.has_prefix("natio").unwrap());
/// ```
pub struct PackedDict {
    packed: String,
    /// Byte offset where each node's entries begin, by node number.
    offsets: Vec<usize>,
}

/// Entries of one node, decoded from its span.
struct NodeView {
    terminal: bool,
    inline: SmallVec<[u8; 4]>,
    /// Label byte range in the packed string and target node number.
    edges: SmallVec<[(Range<usize>, usize); 4]>,
}

/// Where a prefix walk came to rest.
enum Cursor {
    /// The prefix ended exactly on a node.
    Node(usize),
    /// The prefix ended inside an edge label; `rest` is the unconsumed
    /// remainder of that label.
    MidLabel { rest: Range<usize>, child: usize },
    /// The prefix ended exactly on an inline terminal.
    InlineEnd,
}

impl PackedDict {
    /// Indexes a packed string.
    ///
    /// One linear scan records each node's start offset and validates the
    /// character set; reference targets are checked later, on the
    /// traversals that reach them.
    ///
    /// # Errors
    ///
    /// [`UnpackError::UnexpectedChar`] if the string contains a byte
    /// outside the packed alphabet or a misplaced terminal marker.
    pub fn new(packed: impl Into<String>) -> Result<Self, UnpackError> {
        let packed = packed.into();
        let mut offsets = vec![0];
        let mut at_start = true;
        for (pos, &b) in packed.as_bytes().iter().enumerate() {
            match b {
                alphabet::NODE_SEP => {
                    offsets.push(pos + 1);
                    at_start = true;
                }
                alphabet::TERMINAL if at_start => at_start = false,
                alphabet::REF_INTRO => at_start = false,
                _ if alphabet::word_byte_ok(b) => at_start = false,
                _ => {
                    return Err(UnpackError::UnexpectedChar {
                        pos,
                        ch: b as char,
                    })
                }
            }
        }
        Ok(PackedDict { packed, offsets })
    }

    /// True if `word` is a member of the dictionary.
    pub fn is_word(&self, word: &str) -> Result<bool, UnpackError> {
        Ok(match self.descend(word.as_bytes())? {
            Some(Cursor::Node(n)) => self.terminal_at(n),
            Some(Cursor::InlineEnd) => true,
            Some(Cursor::MidLabel { .. }) | None => false,
        })
    }

    /// True if any member starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> Result<bool, UnpackError> {
        Ok(match self.descend(prefix.as_bytes())? {
            Some(Cursor::Node(n)) => !self.span(n).is_empty(),
            Some(_) => true,
            None => false,
        })
    }

    /// Retrieves the value stored for `key` by
    /// [`Builder::insert_entry`](super::Builder::insert_entry), or `None`
    /// if the key is absent.
    ///
    /// Walks the key, follows the `'_'` separator and decodes the
    /// characters up to the nearest word end. Plain membership words are
    /// never returned as values.
    pub fn lookup(&self, key: &str) -> Result<Option<String>, UnpackError> {
        let mut probe = String::with_capacity(key.len() + 1);
        probe.push_str(key);
        probe.push(alphabet::VALUE_SEP as char);
        let mut value = String::new();
        let found = match self.descend(probe.as_bytes())? {
            None => return Ok(None),
            Some(Cursor::InlineEnd) => true,
            Some(Cursor::Node(n)) => self.read_leftmost(n, &mut value)?,
            Some(Cursor::MidLabel { rest, child }) => {
                for &b in &self.packed.as_bytes()[rest] {
                    value.push(b as char);
                }
                self.read_leftmost(child, &mut value)?
            }
        };
        Ok(found.then_some(value))
    }

    /// Decodes every member, in lexicographic order.
    pub fn words(&self) -> Result<Vec<String>, UnpackError> {
        let mut out = Vec::new();
        let mut prefix = String::new();
        self.collect_words(0, &mut prefix, &mut out)?;
        Ok(out)
    }

    /// Number of packed nodes.
    pub fn node_count(&self) -> usize {
        self.offsets.len()
    }

    /// The packed string this dictionary reads from.
    pub fn as_str(&self) -> &str {
        &self.packed
    }

    /// Byte span of node `num`, without the separator.
    fn span(&self, num: usize) -> &[u8] {
        let bytes = self.packed.as_bytes();
        let start = self.offsets[num];
        let end = self.offsets.get(num + 1).map_or(bytes.len(), |&o| o - 1);
        &bytes[start..end]
    }

    fn terminal_at(&self, num: usize) -> bool {
        self.span(num).first() == Some(&alphabet::TERMINAL)
    }

    /// Decodes the entries of node `num`.
    fn view(&self, num: usize) -> Result<NodeView, UnpackError> {
        let start = self.offsets[num];
        let span = self.span(num);
        let mut view = NodeView {
            terminal: false,
            inline: SmallVec::new(),
            edges: SmallVec::new(),
        };
        let mut i = 0;
        if span.first() == Some(&alphabet::TERMINAL) {
            view.terminal = true;
            i = 1;
        }
        while i < span.len() && span[i] != alphabet::REF_INTRO {
            view.inline.push(span[i]);
            i += 1;
        }
        while i < span.len() {
            i += 1; // the reference introducer
            let (delta, next) = alphabet::decode_number(span, i)
                .ok_or(UnpackError::TruncatedRef { pos: start + i })?;
            i = next;
            let label_start = i;
            while i < span.len() && span[i] != alphabet::REF_INTRO {
                i += 1;
            }
            if i == label_start {
                return Err(match span.get(i) {
                    Some(&b) => UnpackError::UnexpectedChar {
                        pos: start + i,
                        ch: b as char,
                    },
                    None => UnpackError::TruncatedRef { pos: start + i },
                });
            }
            let target = num.saturating_add(delta as usize);
            if delta == 0 || target >= self.offsets.len() {
                return Err(UnpackError::DanglingRef { from: num, to: target });
            }
            view.edges.push((start + label_start..start + i, target));
        }
        Ok(view)
    }

    fn label(&self, range: &Range<usize>) -> &[u8] {
        &self.packed.as_bytes()[range.clone()]
    }

    /// Walks `word` from the root. `None` means the walk fell off the
    /// graph; otherwise the cursor says where the last character landed.
    ///
    /// At most one entry of a node starts with any given character, so a
    /// failed prefix comparison is a definitive miss.
    fn descend(&self, word: &[u8]) -> Result<Option<Cursor>, UnpackError> {
        let mut node = 0;
        let mut rest = word;
        'walk: loop {
            if rest.is_empty() {
                return Ok(Some(Cursor::Node(node)));
            }
            let view = self.view(node)?;
            let first = rest[0];
            if view.inline.contains(&first) {
                return Ok((rest.len() == 1).then_some(Cursor::InlineEnd));
            }
            for (range, target) in &view.edges {
                let label = self.label(range);
                if label[0] != first {
                    continue;
                }
                if rest.len() >= label.len() {
                    if rest.starts_with(label) {
                        rest = &rest[label.len()..];
                        node = *target;
                        continue 'walk;
                    }
                } else if label.starts_with(rest) {
                    return Ok(Some(Cursor::MidLabel {
                        rest: range.start + rest.len()..range.end,
                        child: *target,
                    }));
                }
                return Ok(None);
            }
            return Ok(None);
        }
    }

    /// Follows the lexicographically first continuation from `node` down
    /// to a word end, appending its characters to `out`. False if the
    /// walk dead-ends on a node with no entries.
    fn read_leftmost(&self, mut node: usize, out: &mut String) -> Result<bool, UnpackError> {
        loop {
            if self.terminal_at(node) {
                return Ok(true);
            }
            let view = self.view(node)?;
            let inline_first = view.inline.first().copied();
            let edge_first = view.edges.first().map(|(r, _)| self.label(r)[0]);
            match (inline_first, edge_first) {
                (Some(c), None) => {
                    out.push(c as char);
                    return Ok(true);
                }
                (Some(c), Some(e)) if c < e => {
                    out.push(c as char);
                    return Ok(true);
                }
                (_, Some(_)) => {
                    let (range, target) = &view.edges[0];
                    for &b in self.label(range) {
                        out.push(b as char);
                    }
                    node = *target;
                }
                (None, None) => return Ok(false),
            }
        }
    }

    /// Emits every member below `node`, merging inline terminals and
    /// edges so the output stays in lexicographic order.
    fn collect_words(
        &self,
        node: usize,
        prefix: &mut String,
        out: &mut Vec<String>,
    ) -> Result<(), UnpackError> {
        let view = self.view(node)?;
        if view.terminal {
            out.push(prefix.clone());
        }
        let (mut ii, mut ei) = (0, 0);
        while ii < view.inline.len() || ei < view.edges.len() {
            let ic = view.inline.get(ii).copied();
            let ec = view.edges.get(ei).map(|(r, _)| self.label(r)[0]);
            let take_inline = match (ic, ec) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                _ => false,
            };
            if take_inline {
                prefix.push(view.inline[ii] as char);
                out.push(prefix.clone());
                prefix.pop();
                ii += 1;
            } else {
                let (range, target) = view.edges[ei].clone();
                let mark = prefix.len();
                for &b in self.label(&range) {
                    prefix.push(b as char);
                }
                self.collect_words(target, prefix, out)?;
                prefix.truncate(mark);
                ei += 1;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for PackedDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedDict")
            .field("node_count", &self.node_count())
            .field("packed_bytes", &self.packed.len())
            .finish()
    }
}

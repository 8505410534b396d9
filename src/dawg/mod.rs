/// Alphabet constants and the prefix-free number codec.
pub(crate) mod alphabet;
/// Trie builder and DAWG canonicalizer.
pub mod builder;
/// Arena node type and the common-prefix utility.
pub(crate) mod node;
/// Graph compaction passes.
pub(crate) mod optimize;
/// Node numbering and textual emission.
pub(crate) mod pack;
/// Query engine over the packed string.
pub mod unpack;

pub use builder::{pack_words, Builder, InsertError};
pub use unpack::{PackedDict, UnpackError};

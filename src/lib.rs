//! # dawgpack
//!
//! Compact, read-only dictionaries packed into a single printable string.
//!
//! A [DAWG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Directed Acyclic Word Graph) is a trie with identical subtrees merged
//! into shared nodes. This crate builds one incrementally from a set of
//! words, compacts it (chains of single-child nodes fuse into multi-character
//! edge labels) and serializes it into a URL-safe text string that a small
//! decoder can query directly, without ever reconstructing the dictionary
//! in memory. The packed form is convenient to embed in source code,
//! configuration or documents.
//!
//! ## Features
//!
//! - **Order-independent**: words can be inserted in any order and always
//!   pack to the same string; sorted input additionally keeps peak memory
//!   proportional to the DAWG instead of the trie
//! - **Compact**: shared suffixes are stored once, unbranched chains
//!   collapse into single edges
//! - **Zero-decode queries**: membership and lookup walk the packed string
//!   itself, in O(word length) node visits
//!
//! ## Quick Start
//!
//! ```
//! use dawgpack::dawg::{pack_words, PackedDict};
//!
//! let packed = pack_words(["bake", "cake", "fake", "lake"]).unwrap();
//! let dict = PackedDict::new(packed).unwrap();
//!
//! assert!(dict.is_word("cake").unwrap());
//! assert!(!dict.is_word("ake").unwrap());
//! assert!(dict.has_prefix("fa").unwrap());
//! ```
//!
//! ## Keyed dictionaries
//!
//! Entries can carry values, stored as `key`, a `'_'` separator, then the
//! value, and retrieved with [`PackedDict::lookup`](dawg::PackedDict::lookup):
//!
//! ```
//! use dawgpack::dawg::{Builder, PackedDict};
//!
//! let mut builder = Builder::new();
//! builder.insert_entry("se", "sweden").unwrap();
//! builder.insert_entry("no", "norway").unwrap();
//! let dict = PackedDict::new(builder.pack()).unwrap();
//!
//! assert_eq!(dict.lookup("no").unwrap().as_deref(), Some("norway"));
//! assert_eq!(dict.lookup("fi").unwrap(), None);
//! ```

#![warn(missing_docs)]

/// Dictionary construction, packing and querying.
pub mod dawg;

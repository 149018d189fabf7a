//! # `bittrie`
//!
//! A concurrent, memory-compact trie keyed by strings over a fixed
//! 63-symbol alphabet: digits, lowercase and uppercase Latin letters, and
//! space.
//!
//! Three ideas carry the crate:
//!
//! - **Bitmap-indexed children**: a node stores a 64-bit occupancy bitmap
//!   and a dense vector of only the children that exist, indexed by the
//!   popcount rank of the child's bit. A 63-ary branching factor costs
//!   O(actual fanout) space per node, never a 63-slot array.
//! - **Suffix-collapsing removal**: deleting a key prunes exactly the part
//!   of its path no other key needs, detaching a whole dead suffix with a
//!   single unlink instead of one unlink per level.
//! - **Per-node locking**: every node guards its bitmap, children, and
//!   value with its own reader/writer lock, and an operation holds at most
//!   one node's lock at a time.
//!
//! ## Thread Safety
//!
//! [`Trie<V>`] is `Send + Sync` when `V: Send + Sync`; share it with
//! `Arc` and call any operation from any thread. Holding one lock at a
//! time makes cross-node deadlock impossible but leaves multi-node
//! traversals non-linearizable: a lookup racing a removal along the same
//! path may briefly observe a detached-but-intact suffix. The contract is
//! documented in detail on [`trie`].
//!
//! ## Example
//!
//! ```rust
//! use bittrie::Trie;
//!
//! let trie: Trie<u64> = Trie::new();
//! trie.set("hello world", 42).unwrap();
//! trie.set("hello Rust", 43).unwrap();
//!
//! assert_eq!(trie.get("hello world").unwrap().as_deref(), Some(&42));
//!
//! // Breadth-first, symbol-code order; limit 0 means unbounded.
//! let pairs = trie.get_by_prefix("hello", 0).unwrap();
//! let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
//! assert_eq!(keys, ["hello Rust", "hello world"]);
//!
//! trie.remove("hello world").unwrap();
//! assert!(trie.get("hello world").unwrap().is_none());
//! ```
//!
//! ## Features
//!
//! | Feature   | Default | Effect |
//! |-----------|---------|--------|
//! | `tracing` | off     | Emit `tracing` events inside trie operations |
//!
//! The companion [`WordSet`] applies the same bitmap packing to a
//! single-threaded set of lowercase words.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod node;

pub mod scan;
pub mod symbol;
pub mod trie;
pub mod wordset;

// Re-export main types for convenience
pub use scan::PrefixScanner;
pub use trie::{Trie, TrieError};
pub use wordset::WordSet;

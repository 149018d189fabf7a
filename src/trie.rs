//! Filepath: src/trie.rs
//!
//! The public trie container: exact-key lookup, insertion/overwrite,
//! deletion with structural compaction, and prefix-bounded enumeration.
//!
//! # Concurrency Model
//!
//! There is no global lock. Every node carries its own reader/writer lock,
//! and an operation holds at most one node's lock at a time: it locks a
//! node, clones the `Arc` edge to the next node, releases, then locks the
//! next node. Two locks are never held together, so cross-node deadlock is
//! structurally impossible.
//!
//! The price is cross-node atomicity: between releasing a parent and
//! locking its child, a concurrent [`Trie::remove`] may detach that very
//! child. A lock holder always sees a single node's bitmap, children, and
//! value as a coherent snapshot, but a multi-node traversal as a whole is
//! not linearizable: a `get` or prefix scan racing a removal on the same
//! path may observe a child already unlinked from its parent whose own
//! fields are still intact. This weak-consistency contract is deliberate;
//! `Arc`-owned edges confine the race to staleness (a detached subtree
//! lives until the last in-flight traversal drops it), never to freed
//! memory. Operations on a single key are linearizable: a value is visible
//! to `get` the moment `set` returns and gone the moment `remove` returns.

use std::fmt as StdFmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::node::Node;
use crate::scan::PrefixScanner;
use crate::symbol;

// ============================================================================
//  Errors
// ============================================================================

/// Validation errors for [`Trie`] operations.
///
/// Both variants are detected before any node is touched; no error is ever
/// raised mid-traversal. A missing key, a missing child, or an absent
/// prefix is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieError {
    /// The key is empty or contains an unsupported character.
    InvalidKey,

    /// [`Trie::set`] was called without a value.
    InvalidValue,
}

impl StdFmt::Display for TrieError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::InvalidKey => {
                write!(f, "key is empty or contains an unsupported character")
            }

            Self::InvalidValue => {
                write!(f, "value must be present")
            }
        }
    }
}

impl std::error::Error for TrieError {}

// ============================================================================
//  Removal-path classification
// ============================================================================

/// How the next node on a removal path relates to keys other than the one
/// being removed.
///
/// Removal keeps a candidate list of edges it may prune. Each step ahead of
/// the cursor is classified before descending; anything other than
/// [`Ownership::Exclusive`] proves the node is load-bearing for other keys
/// and resets the list; pruning can only restart strictly below that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ownership {
    /// Reachable only through the key being removed; deletable with it.
    Exclusive,

    /// A branch point other keys pass through: more than one child, or
    /// children extending through the removed key's terminal node.
    SharedBranch,

    /// The terminus of a different stored key partway along the path.
    OtherKeyTerminus,
}

/// Classify one step of a removal path. `child_count` and `has_value`
/// describe the next node; `is_last` is whether it corresponds to the final
/// symbol of the key being removed.
const fn classify(child_count: usize, has_value: bool, is_last: bool) -> Ownership {
    if child_count > 1 {
        return Ownership::SharedBranch;
    }

    if !is_last && has_value {
        return Ownership::OtherKeyTerminus;
    }

    if is_last && child_count > 0 {
        return Ownership::SharedBranch;
    }

    Ownership::Exclusive
}

// ============================================================================
//  Trie
// ============================================================================

/// A concurrent, memory-compact trie keyed by strings over a 63-symbol
/// alphabet: digits, `a`-`z`, `A`-`Z`, and space.
///
/// Each node stores only the children that exist, packed densely and
/// indexed through a 64-bit occupancy bitmap ranked by population count, so
/// the 63-ary branching factor costs memory proportional to actual fanout.
/// Values are stored as `Arc<V>` and handed out as clones, the natural
/// shape for concurrent readers.
///
/// # Thread Safety
///
/// `Trie<V>` is `Send + Sync` when `V: Send + Sync`; share it via
/// `Arc<Trie<V>>` and call any operation from any thread. See the module
/// docs for the per-node locking protocol and its documented
/// weak-consistency contract.
///
/// # Example
///
/// ```rust
/// use bittrie::Trie;
///
/// let trie: Trie<u64> = Trie::new();
///
/// trie.set("some key", 7).unwrap();
/// assert_eq!(trie.get("some key").unwrap().as_deref(), Some(&7));
///
/// trie.remove("some key").unwrap();
/// assert!(trie.get("some key").unwrap().is_none());
/// ```
pub struct Trie<V> {
    /// Root node. Always allocated, never removed; the only node allowed to
    /// be simultaneously valueless and childless.
    root: Arc<Node<V>>,

    /// Number of stored keys (atomic for concurrent access).
    len: AtomicUsize,
}

impl<V> Trie<V> {
    /// Create an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::new()),
            len: AtomicUsize::new(0),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(AtomicOrdering::Relaxed)
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate `key` and translate it to its bit-index path.
    fn encode_key(key: &str) -> Result<Vec<u8>, TrieError> {
        if key.is_empty() {
            return Err(TrieError::InvalidKey);
        }

        key.chars()
            .map(|ch| symbol::encode(ch).ok_or(TrieError::InvalidKey))
            .collect()
    }

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// Accepts a plain `V` (coerced via `Into<Option<V>>`); passing `None`
    /// reproduces the absent-value contract violation and fails with
    /// [`TrieError::InvalidValue`]. Missing path nodes are allocated on the
    /// way down, one write lock at a time.
    ///
    /// # Errors
    ///
    /// [`TrieError::InvalidKey`] for an empty key or a character outside
    /// the alphabet; [`TrieError::InvalidValue`] for an absent value.
    /// Validation happens before any node is touched.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self, value)))]
    pub fn set(&self, key: &str, value: impl Into<Option<V>>) -> Result<(), TrieError> {
        let value: V = value.into().ok_or(TrieError::InvalidValue)?;
        let path: Vec<u8> = Self::encode_key(key)?;

        let mut cur: Arc<Node<V>> = Arc::clone(&self.root);
        for &bit in &path {
            let next: Arc<Node<V>> = {
                let mut inner = cur.write();

                if let Some(child) = inner.child(bit) {
                    Arc::clone(child)
                } else {
                    let child: Arc<Node<V>> = Arc::new(Node::new());
                    inner.insert_child(bit, Arc::clone(&child));
                    child
                }
            };

            cur = next;
        }

        let previous: Option<Arc<V>> = cur.write().value.replace(Arc::new(value));
        if previous.is_none() {
            self.len.fetch_add(1, AtomicOrdering::Relaxed);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(key, overwrote = previous.is_some(), "set: stored value");

        Ok(())
    }

    /// Look up the value stored under exactly `key`.
    ///
    /// Returns `Ok(None)` the moment a required child is missing, and also
    /// when the full path exists only as an interior branch that was never
    /// made a key's terminus.
    ///
    /// # Errors
    ///
    /// [`TrieError::InvalidKey`] under the same rule as [`Trie::set`].
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn get(&self, key: &str) -> Result<Option<Arc<V>>, TrieError> {
        let path: Vec<u8> = Self::encode_key(key)?;

        let mut cur: Arc<Node<V>> = Arc::clone(&self.root);
        for &bit in &path {
            let next: Option<Arc<Node<V>>> = {
                let inner = cur.read();
                inner.child(bit).map(Arc::clone)
            };

            match next {
                Some(child) => cur = child,
                None => return Ok(None),
            }
        }

        let value: Option<Arc<V>> = cur.read().value.clone();
        Ok(value)
    }

    /// Remove `key` and compact the structure it leaves behind.
    ///
    /// The walk keeps a candidate list of edges forming the longest suffix
    /// of the path owned exclusively by this key. A step whose next node is
    /// shared (more than one child, another key's terminus partway down,
    /// or children extending through this key's terminal) resets the list.
    /// After the walk the terminal value is cleared unconditionally; if
    /// candidates remain, the whole dead suffix is detached with a single
    /// unlink at its topmost edge instead of one unlink per level, and the
    /// detached nodes are cleared.
    ///
    /// Removing a key that is not stored is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// [`TrieError::InvalidKey`] under the same rule as [`Trie::set`].
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn remove(&self, key: &str) -> Result<(), TrieError> {
        let path: Vec<u8> = Self::encode_key(key)?;
        let last: usize = path.len() - 1;

        // Prunable edges as (parent, bit, child). Non-empty at the end of
        // the walk iff everything from the first edge's child down to the
        // terminal belongs to this key alone.
        let mut candidates: Vec<(Arc<Node<V>>, u8, Arc<Node<V>>)> = Vec::new();

        let mut cur: Arc<Node<V>> = Arc::clone(&self.root);
        for (i, &bit) in path.iter().enumerate() {
            let child: Arc<Node<V>> = {
                let inner = cur.read();

                match inner.child(bit) {
                    Some(child) => Arc::clone(child),
                    // Key not stored; nothing to clear, nothing to prune.
                    None => return Ok(()),
                }
            };

            let class: Ownership = {
                let inner = child.read();
                classify(inner.child_count(), inner.value.is_some(), i == last)
            };

            match class {
                Ownership::Exclusive => {
                    candidates.push((Arc::clone(&cur), bit, Arc::clone(&child)));
                }

                Ownership::SharedBranch | Ownership::OtherKeyTerminus => {
                    candidates.clear();
                }
            }

            cur = child;
        }

        // The key is logically gone from here on, whatever happens to the
        // structure below.
        let removed: Option<Arc<V>> = cur.write().value.take();
        if removed.is_some() {
            self.len.fetch_sub(1, AtomicOrdering::Relaxed);
        }

        if let Some((parent, bit, _)) = candidates.first() {
            // Detach the dead run with one unlink at its topmost edge. A
            // racing remove may have unlinked the edge first; the wipe
            // below is then redundant but harmless, the nodes are dead
            // either way.
            {
                let mut inner = parent.write();
                if inner.has_child(*bit) {
                    let _ = inner.remove_child(*bit);
                }
            }

            for (_, _, node) in &candidates {
                node.write().wipe();
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(key, pruned = candidates.len(), "remove: detached dead suffix");
        }

        Ok(())
    }

    /// Enumerate keys starting with `prefix`, lazily, in breadth-first
    /// order (shallower keys first, ascending symbol code within a level).
    ///
    /// The prefix itself is the first entry when it is a stored key. An
    /// absent prefix path yields an empty scanner, not an error.
    ///
    /// # Errors
    ///
    /// [`TrieError::InvalidKey`] if `prefix` fails key validation.
    pub fn scan_prefix(&self, prefix: &str) -> Result<PrefixScanner<V>, TrieError> {
        let path: Vec<u8> = Self::encode_key(prefix)?;

        let mut cur: Arc<Node<V>> = Arc::clone(&self.root);
        for &bit in &path {
            let next: Option<Arc<Node<V>>> = {
                let inner = cur.read();
                inner.child(bit).map(Arc::clone)
            };

            match next {
                Some(child) => cur = child,
                None => return Ok(PrefixScanner::empty()),
            }
        }

        Ok(PrefixScanner::new(prefix.to_owned(), cur))
    }

    /// Collect up to `limit` `(key, value)` pairs whose keys start with
    /// `prefix`, in the order of [`Trie::scan_prefix`]. A `limit` of zero
    /// means unbounded.
    ///
    /// # Errors
    ///
    /// [`TrieError::InvalidKey`] if `prefix` fails key validation.
    pub fn get_by_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<(String, Arc<V>)>, TrieError> {
        let scanner: PrefixScanner<V> = self.scan_prefix(prefix)?;

        Ok(match limit {
            0 => scanner.collect(),
            bound => scanner.take(bound).collect(),
        })
    }

    /// Total number of nodes, root included.
    ///
    /// Walks the whole tree locking one node at a time; a diagnostic, not a
    /// hot path. An empty trie reports 1.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count: usize = 0;
        let mut stack: Vec<Arc<Node<V>>> = vec![Arc::clone(&self.root)];

        while let Some(node) = stack.pop() {
            count += 1;

            let inner = node.read();
            for (_, child) in inner.children() {
                stack.push(Arc::clone(child));
            }
        }

        count
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StdFmt::Debug for Trie<V> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Trie")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
//  Tests
// ============================================================================

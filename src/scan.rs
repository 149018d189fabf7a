//! Filepath: src/scan.rs
//!
//! Breadth-first enumeration of the subtree under a prefix's anchor node.
//!
//! [`Trie::scan_prefix`](crate::Trie::scan_prefix) descends to the node the
//! prefix ends at (the anchor) and hands it to a [`PrefixScanner`], which
//! walks the subtree with a work queue: the front node is expanded into its
//! existing children in ascending bit order, each child's key is the
//! parent's key plus one decoded symbol, value-carrying children become
//! results, and every child is enqueued for further expansion. The yield
//! order is therefore breadth-first by depth, ties broken by ascending
//! symbol code: equivalently, ascending `(key length, symbol codes)`.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::node::Node;
use crate::symbol;

/// Lazy breadth-first iterator over `(key, value)` pairs under one prefix.
///
/// The anchor's own value, if any, is the first entry. Keys are
/// materialized one expansion at a time; nothing below the queue front has
/// been visited yet when an entry is handed out.
///
/// Like every trie operation, the scanner holds at most one node lock at a
/// time, so a scan racing a concurrent removal may still yield entries from
/// an already-detached suffix. See the concurrency notes on
/// [`Trie`](crate::Trie).
pub struct PrefixScanner<V> {
    /// Nodes awaiting expansion, each paired with its accumulated key.
    queue: VecDeque<(String, Arc<Node<V>>)>,

    /// Results discovered by the latest expansion, not yet handed out.
    ready: VecDeque<(String, Arc<V>)>,
}

impl<V> PrefixScanner<V> {
    /// Scanner over the subtree rooted at `anchor`, whose accumulated key
    /// is `prefix`.
    pub(crate) fn new(prefix: String, anchor: Arc<Node<V>>) -> Self {
        let mut ready: VecDeque<(String, Arc<V>)> = VecDeque::new();
        if let Some(value) = anchor.read().value.clone() {
            ready.push_back((prefix.clone(), value));
        }

        let mut queue: VecDeque<(String, Arc<Node<V>>)> = VecDeque::new();
        queue.push_back((prefix, anchor));

        Self { queue, ready }
    }

    /// Scanner that yields nothing, for prefixes whose path is absent.
    pub(crate) const fn empty() -> Self {
        Self {
            queue: VecDeque::new(),
            ready: VecDeque::new(),
        }
    }
}

impl<V> Iterator for PrefixScanner<V> {
    type Item = (String, Arc<V>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.ready.pop_front() {
                return Some(entry);
            }

            let (key, node) = self.queue.pop_front()?;

            // Snapshot the child edges under this node's lock, then release
            // it before any child is touched.
            let edges: Vec<(u8, Arc<Node<V>>)> = {
                let inner = node.read();
                inner
                    .children()
                    .map(|(bit, child)| (bit, Arc::clone(child)))
                    .collect()
            };

            for (bit, child) in edges {
                let mut child_key: String = key.clone();
                child_key.push(symbol::decode(bit));

                if let Some(value) = child.read().value.clone() {
                    self.ready.push_back((child_key.clone(), value));
                }

                self.queue.push_back((child_key, child));
            }
        }
    }
}

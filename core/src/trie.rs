//! Prefix tree multi-map keyed by code sequences.
use std::ops::ControlFlow;

use smallvec::SmallVec;

#[derive(Debug, Clone)]
struct Node<K, V> {
    /// Sorted by key; looked up with binary search.
    children: Vec<(K, Node<K, V>)>,
    values: SmallVec<[V; 2]>,
}

impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            values: SmallVec::new(),
        }
    }
}

impl<K: Ord + Clone, V> Node<K, V> {
    fn child(&self, key: &K) -> Option<&Node<K, V>> {
        self.children
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|i| &self.children[i].1)
    }

    fn child_or_insert(&mut self, key: &K) -> &mut Node<K, V> {
        let i = match self.children.binary_search_by(|(k, _)| k.cmp(key)) {
            Ok(i) => i,
            Err(i) => {
                self.children.insert(i, (key.clone(), Node::default()));
                i
            }
        };
        &mut self.children[i].1
    }

    fn visit<F>(&self, keys: &mut Vec<K>, depth_limit: usize, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&[K], &V) -> ControlFlow<()>,
    {
        if depth_limit == 0 {
            return ControlFlow::Continue(());
        }
        for value in &self.values {
            visit(keys.as_slice(), value)?;
        }
        if depth_limit == 1 {
            return ControlFlow::Continue(());
        }
        for (key, child) in &self.children {
            keys.push(key.clone());
            let flow = child.visit(keys, depth_limit - 1, visit);
            keys.pop();
            flow?;
        }
        ControlFlow::Continue(())
    }
}

/// A trie mapping key sequences to any number of values.
///
/// Insertion only ever appends to a node's value list or adds children, so
/// duplicate inserts accumulate. Traversal visits a node's values before its
/// children, and children in ascending key order.
///
/// # Example
/// ```
/// use std::ops::ControlFlow;
/// use pinyinkit_core::trie::TrieMultimap;
///
/// let mut trie = TrieMultimap::new();
/// trie.insert(&[1, 2], "ab");
/// trie.insert(&[1, 2, 3], "abc");
///
/// assert_eq!(trie.find(&[1, 2]), &["ab"]);
///
/// let mut seen = Vec::new();
/// let _ = trie.visit_prefix(&[1], usize::MAX, |keys, v| {
///     seen.push((keys.to_vec(), *v));
///     ControlFlow::Continue(())
/// });
/// assert_eq!(seen, vec![(vec![1, 2], "ab"), (vec![1, 2, 3], "abc")]);
/// ```
#[derive(Debug, Clone)]
pub struct TrieMultimap<K, V> {
    root: Node<K, V>,
}

impl<K, V> Default for TrieMultimap<K, V> {
    fn default() -> Self {
        Self {
            root: Node::default(),
        }
    }
}

impl<K: Ord + Clone, V> TrieMultimap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, keys: &[K]) -> Option<&Node<K, V>> {
        let mut node = &self.root;
        for key in keys {
            node = node.child(key)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, keys: &[K]) -> &mut Node<K, V> {
        let mut node = &mut self.root;
        for key in keys {
            node = node.child_or_insert(key);
        }
        node
    }

    /// Append `value` at the node for `keys`, creating the path as needed.
    pub fn insert(&mut self, keys: &[K], value: V) {
        self.node_mut(keys).values.push(value);
    }

    /// Append several values at the node for `keys`.
    pub fn batch_insert<I>(&mut self, keys: &[K], values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.node_mut(keys).values.extend(values);
    }

    /// Values stored exactly at `keys`; empty when the path does not exist.
    pub fn find(&self, keys: &[K]) -> &[V] {
        self.node(keys).map(|n| n.values.as_slice()).unwrap_or(&[])
    }

    /// Visit values at and below the node reached by `keys`.
    ///
    /// `depth_limit` counts levels including the start node: 0 visits
    /// nothing, 1 only the start node's own values, `n` descends `n - 1`
    /// levels. The visitor gets the full key sequence of each node and may
    /// return `Break` to stop the walk, which is then propagated.
    pub fn visit_prefix<F>(&self, keys: &[K], depth_limit: usize, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&[K], &V) -> ControlFlow<()>,
    {
        match self.node(keys) {
            Some(node) => {
                let mut path = keys.to_vec();
                node.visit(&mut path, depth_limit, &mut visit)
            }
            None => ControlFlow::Continue(()),
        }
    }

    /// [`visit_prefix`](Self::visit_prefix) from the root.
    pub fn visit_all<F>(&self, depth_limit: usize, visit: F) -> ControlFlow<()>
    where
        F: FnMut(&[K], &V) -> ControlFlow<()>,
    {
        self.visit_prefix(&[], depth_limit, visit)
    }

    /// Every (key sequence, value) pair in traversal order.
    pub fn items(&self) -> Vec<(Vec<K>, V)>
    where
        V: Clone,
    {
        let mut items = Vec::new();
        let _ = self.visit_all(usize::MAX, |keys, v| {
            items.push((keys.to_vec(), v.clone()));
            ControlFlow::Continue(())
        });
        items
    }

    /// Coarse erase: drop the whole subtree rooted at the node for `keys`,
    /// including every value stored below it.
    ///
    /// Returns `false` for an empty key sequence or a path that does not
    /// exist.
    pub fn erase(&mut self, keys: &[K]) -> bool {
        let Some((last, parent_keys)) = keys.split_last() else {
            return false;
        };
        let mut node = &mut self.root;
        for key in parent_keys {
            match node.children.binary_search_by(|(k, _)| k.cmp(key)) {
                Ok(i) => node = &mut node.children[i].1,
                Err(_) => return false,
            }
        }
        match node.children.binary_search_by(|(k, _)| k.cmp(last)) {
            Ok(i) => {
                node.children.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// True when no value is stored anywhere.
    pub fn is_empty(&self) -> bool {
        self.visit_all(usize::MAX, |_, _| ControlFlow::Break(()))
            .is_continue()
    }
}

//! An augmented randomized binary search tree (treap)
//!
//! A treap maintains both BST property (for keys) and heap property (for priorities).
//! Every node additionally carries an [`Aggregate`] summarising its subtree, rebuilt
//! bottom-up along every path touched by a structural edit.
//!
//! ## Design Decisions
//!
//! - **No rotations**: every mutation is expressed through `split` and `merge`. Insert
//!   splits at the new key and merges a singleton back in between; remove replaces the
//!   node with the merge of its children.
//! - **Owned splits**: [`AugmentedTreap::split`] and [`AugmentedTreap::merge`] consume
//!   their inputs, so a tree that has been split cannot be observed again.
//! - **External RNG**: priorities are drawn from a caller-provided RNG at insertion time
//!   and never reassigned.
//! - **Unique keys**: inserting a key that is already present, or merging trees whose
//!   key ranges overlap, breaks the ordering invariant. Both are checked in debug builds
//!   only.
//! - **Merge ties**: when both roots have the same priority, the right-hand root wins.

use crate::aggregate::{Aggregate, Counted};
use rand::Rng;

type Link<K, V, A> = Option<Box<Node<K, V, A>>>;

/// A node in the treap
struct Node<K, V, A> {
    key: K,
    value: V,
    priority: u32,
    aggregate: A,
    left: Link<K, V, A>,
    right: Link<K, V, A>,
}

impl<K, V, A: Aggregate<K, V>> Node<K, V, A> {
    fn new(key: K, value: V, priority: u32) -> Self {
        Node {
            aggregate: A::leaf(&key, &value),
            key,
            value,
            priority,
            left: None,
            right: None,
        }
    }

    // Recompute this node's aggregate from its own data and its children
    fn pull(&mut self) {
        let mut aggregate = A::leaf(&self.key, &self.value);
        if let Some(left) = &self.left {
            aggregate.absorb(&left.aggregate);
        }
        if let Some(right) = &self.right {
            aggregate.absorb(&right.aggregate);
        }
        self.aggregate = aggregate;
    }
}

/// A treap keyed by `K`, storing a `V` per key and an `A` per subtree
pub struct AugmentedTreap<K, V, A> {
    root: Link<K, V, A>,
}

impl<K: Ord, V, A: Aggregate<K, V>> AugmentedTreap<K, V, A> {
    /// Create a new empty treap
    pub fn new() -> Self {
        AugmentedTreap { root: None }
    }

    /// Check if the treap is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The aggregate of the whole tree, `None` when empty
    pub fn aggregate(&self) -> Option<&A> {
        self.root.as_ref().map(|root| &root.aggregate)
    }

    /// Insert a key with a random priority
    ///
    /// The key must not already be present.
    pub fn insert<R: Rng>(&mut self, key: K, value: V, rng: &mut R) {
        let priority = rng.gen();
        self.insert_with_priority(key, value, priority);
    }

    /// Insert a key with a caller-chosen priority
    ///
    /// The key must not already be present.
    pub fn insert_with_priority(&mut self, key: K, value: V, priority: u32) {
        debug_assert!(!self.contains(&key), "duplicate key inserted into treap");
        let (left, right) = Self::split_node(self.root.take(), &key);
        let singleton = Some(Box::new(Node::new(key, value, priority)));
        self.root = Self::merge_node(Self::merge_node(left, singleton), right);
    }

    /// Remove a key from the treap, returning its value
    ///
    /// Absent keys leave the tree untouched.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (new_root, removed) = Self::remove_node(self.root.take(), key);
        self.root = new_root;
        removed
    }

    /// Check if the treap contains a key
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Look up the value stored under a key
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;
        while let Some(node) = link {
            if *key < node.key {
                link = &node.left;
            } else if node.key < *key {
                link = &node.right;
            } else {
                return Some(&node.value);
            }
        }
        None
    }

    /// Smallest key
    pub fn first(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Largest key
    pub fn last(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// Partition into keys `< key` and keys `>= key`
    pub fn split(self, key: &K) -> (Self, Self) {
        let (left, right) = Self::split_node(self.root, key);
        (AugmentedTreap { root: left }, AugmentedTreap { root: right })
    }

    /// Concatenate with a tree whose keys are all greater than ours
    pub fn merge(self, other: Self) -> Self {
        debug_assert!(
            match (self.last(), other.first()) {
                (Some(last), Some(first)) => last < first,
                _ => true,
            },
            "merged treaps overlap"
        );
        AugmentedTreap {
            root: Self::merge_node(self.root, other.root),
        }
    }

    /// In-order traversal over `(key, value)` pairs
    pub fn iter(&self) -> Iter<'_, K, V, A> {
        Iter::new(&self.root)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        fn height_of<K, V, A>(link: &Link<K, V, A>) -> usize {
            link.as_ref()
                .map_or(0, |n| 1 + height_of(&n.left).max(height_of(&n.right)))
        }
        height_of(&self.root)
    }

    /// Every node's priority is at least both children's
    pub fn is_heap_ordered(&self) -> bool {
        fn check<K, V, A>(link: &Link<K, V, A>) -> bool {
            match link {
                None => true,
                Some(n) => {
                    n.left.as_ref().map_or(true, |l| l.priority <= n.priority)
                        && n.right.as_ref().map_or(true, |r| r.priority <= n.priority)
                        && check(&n.left)
                        && check(&n.right)
                }
            }
        }
        check(&self.root)
    }

    /// In-order keys are strictly increasing
    pub fn is_search_ordered(&self) -> bool {
        let mut keys = self.keys();
        let Some(mut previous) = keys.next() else {
            return true;
        };
        for key in keys {
            if previous >= key {
                return false;
            }
            previous = key;
        }
        true
    }

    /// Every stored aggregate equals the one recomputed from scratch
    pub fn aggregates_consistent(&self) -> bool
    where
        A: PartialEq,
    {
        // returns the recomputed aggregate of a consistent subtree
        fn check<K, V, A: Aggregate<K, V> + PartialEq>(link: &Link<K, V, A>) -> Option<Option<A>> {
            let Some(n) = link else {
                return Some(None);
            };
            let left = check(&n.left)?;
            let right = check(&n.right)?;
            let mut expected = A::leaf(&n.key, &n.value);
            if let Some(left) = &left {
                expected.absorb(left);
            }
            if let Some(right) = &right {
                expected.absorb(right);
            }
            (expected == n.aggregate).then_some(Some(expected))
        }
        check(&self.root).is_some()
    }

    // Helper function to split a subtree into keys < key and keys >= key
    fn split_node(node: Link<K, V, A>, key: &K) -> (Link<K, V, A>, Link<K, V, A>) {
        match node {
            None => (None, None),
            Some(mut n) => {
                if n.key < *key {
                    let (left, right) = Self::split_node(n.right.take(), key);
                    n.right = left;
                    n.pull();
                    (Some(n), right)
                } else {
                    let (left, right) = Self::split_node(n.left.take(), key);
                    n.left = right;
                    n.pull();
                    (left, Some(n))
                }
            }
        }
    }

    // Merge two subtrees, every key of `left` below every key of `right`
    fn merge_node(left: Link<K, V, A>, right: Link<K, V, A>) -> Link<K, V, A> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(mut l), Some(mut r)) => {
                if l.priority > r.priority {
                    l.right = Self::merge_node(l.right.take(), Some(r));
                    l.pull();
                    Some(l)
                } else {
                    r.left = Self::merge_node(Some(l), r.left.take());
                    r.pull();
                    Some(r)
                }
            }
        }
    }

    // Helper function to remove a node
    fn remove_node(node: Link<K, V, A>, key: &K) -> (Link<K, V, A>, Option<V>) {
        match node {
            None => (None, None),
            Some(mut n) => {
                if *key < n.key {
                    let (new_left, removed) = Self::remove_node(n.left.take(), key);
                    n.left = new_left;
                    if removed.is_some() {
                        n.pull();
                    }
                    (Some(n), removed)
                } else if n.key < *key {
                    let (new_right, removed) = Self::remove_node(n.right.take(), key);
                    n.right = new_right;
                    if removed.is_some() {
                        n.pull();
                    }
                    (Some(n), removed)
                } else {
                    // Found the node to remove, its children take its place
                    let Node {
                        value, left, right, ..
                    } = *n;
                    (Self::merge_node(left, right), Some(value))
                }
            }
        }
    }
}

impl<K: Ord, V, A: Aggregate<K, V> + Counted> AugmentedTreap<K, V, A> {
    /// Get the number of elements in the treap
    pub fn len(&self) -> usize {
        self.aggregate().map_or(0, Counted::count)
    }

    /// Count the keys strictly less than `key`
    pub fn count_less(&self, key: &K) -> usize {
        let mut count = 0;
        let mut link = &self.root;
        while let Some(node) = link {
            if node.key < *key {
                count += 1 + node.left.as_ref().map_or(0, |l| l.aggregate.count());
                link = &node.right;
            } else {
                link = &node.left;
            }
        }
        count
    }
}

impl<K: Ord, V, A: Aggregate<K, V>> Default for AugmentedTreap<K, V, A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy in-order traversal of an [`AugmentedTreap`]
pub struct Iter<'a, K, V, A> {
    stack: Vec<&'a Node<K, V, A>>,
}

impl<'a, K, V, A> Iter<'a, K, V, A> {
    fn new(root: &'a Link<K, V, A>) -> Self {
        let mut iter = Iter { stack: Vec::new() };
        iter.descend_left(root.as_deref());
        iter
    }

    fn descend_left(&mut self, mut node: Option<&'a Node<K, V, A>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K, V, A> Iterator for Iter<'a, K, V, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

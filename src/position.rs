//! A single recency treap over every position
//!
//! Range queries isolate `[lo, hi]` with two splits, read the middle tree's root
//! aggregate and merge the three pieces back before returning.

use crate::aggregate::RecencyAggregate;
use crate::treap::AugmentedTreap;
use crate::{Position, Stamp};
use rand::Rng;
use std::mem;

type RecencyTreap = AugmentedTreap<Position, Stamp, RecencyAggregate>;

#[derive(Default)]
pub struct PositionForest {
    tree: RecencyTreap,
}

impl PositionForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position that is not yet present
    pub fn plant<R: Rng>(&mut self, position: Position, stamp: Stamp, rng: &mut R) {
        self.tree.insert(position, stamp, rng);
    }

    /// Overwrite the stamp at `position`, returning the previous one
    ///
    /// The node is removed and reinserted, so it draws a fresh priority.
    pub fn replace_at<R: Rng>(
        &mut self,
        position: Position,
        stamp: Stamp,
        rng: &mut R,
    ) -> Option<Stamp> {
        let previous = self.tree.remove(&position);
        self.tree.insert(position, stamp, rng);
        previous
    }

    pub fn stamp_at(&self, position: Position) -> Option<&Stamp> {
        self.tree.get(&position)
    }

    /// The most recently stamped entry within `lo..=hi`, `None` if the range holds nothing
    pub fn strongest(&mut self, lo: Position, hi: Position) -> Option<RecencyAggregate> {
        let tree = mem::take(&mut self.tree);
        let (left, rest) = tree.split(&lo);
        let (middle, right) = match hi.checked_add(1) {
            Some(end) => rest.split(&end),
            None => (rest, RecencyTreap::new()),
        };
        let best = middle.aggregate().copied();
        self.tree = left.merge(middle.merge(right));
        best
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Stamp)> + '_ {
        self.tree.iter().map(|(position, stamp)| (*position, stamp))
    }

    pub(crate) fn tree(&self) -> &RecencyTreap {
        &self.tree
    }
}

//! Subtree summaries carried by every treap node
//!
//! An aggregate is rebuilt from a node's own key and value plus the aggregates of
//! its two children. The treap calls [`Aggregate::leaf`] for the node itself and then
//! [`Aggregate::absorb`] once per present child, so `absorb` must not depend on
//! whether the child sits on the left or the right.

use crate::{Category, Position, Stamp, Timestamp};

/// A value summarising a subtree
pub trait Aggregate<K, V>: Clone {
    /// The aggregate of a node with no children
    fn leaf(key: &K, value: &V) -> Self;

    /// Fold a child subtree's aggregate into this one
    fn absorb(&mut self, child: &Self);
}

/// Aggregates that know how many nodes they summarise
pub trait Counted {
    fn count(&self) -> usize;
}

/// Subtree size, for order-statistic queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankAggregate {
    size: usize,
}

impl RankAggregate {
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<K, V> Aggregate<K, V> for RankAggregate {
    fn leaf(_key: &K, _value: &V) -> Self {
        RankAggregate { size: 1 }
    }

    fn absorb(&mut self, child: &Self) {
        self.size += child.size;
    }
}

impl Counted for RankAggregate {
    fn count(&self) -> usize {
        self.size
    }
}

/// The most recently stamped entry of a subtree
///
/// Among all entries, the winner has the greatest timestamp; equal timestamps go to the
/// smallest position. The subtree size is tracked alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyAggregate {
    size: usize,
    timestamp: Timestamp,
    position: Position,
    category: Category,
}

impl RecencyAggregate {
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Leftmost position holding the maximum timestamp
    pub fn position(&self) -> Position {
        self.position
    }

    /// Category stored at [`Self::position`]
    pub fn category(&self) -> Category {
        self.category
    }

    fn beats(&self, other: &Self) -> bool {
        self.timestamp > other.timestamp
            || (self.timestamp == other.timestamp && self.position < other.position)
    }
}

impl Aggregate<Position, Stamp> for RecencyAggregate {
    fn leaf(key: &Position, value: &Stamp) -> Self {
        RecencyAggregate {
            size: 1,
            timestamp: value.timestamp,
            position: *key,
            category: value.category,
        }
    }

    fn absorb(&mut self, child: &Self) {
        self.size += child.size;
        if child.beats(self) {
            self.timestamp = child.timestamp;
            self.position = child.position;
            self.category = child.category;
        }
    }
}

impl Counted for RecencyAggregate {
    fn count(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(position: Position, category: Category, timestamp: Timestamp) -> RecencyAggregate {
        RecencyAggregate::leaf(
            &position,
            &Stamp {
                category,
                timestamp,
            },
        )
    }

    #[test]
    fn test_rank_sums_children() {
        let mut agg = <RankAggregate as Aggregate<u32, ()>>::leaf(&7, &());
        <RankAggregate as Aggregate<u32, ()>>::absorb(&mut agg, &RankAggregate { size: 3 });
        <RankAggregate as Aggregate<u32, ()>>::absorb(&mut agg, &RankAggregate { size: 4 });
        assert_eq!(agg.size(), 8);
        assert_eq!(agg.count(), 8);
    }

    #[test]
    fn test_recency_prefers_newer() {
        let mut agg = leaf(5, 1, 2);
        agg.absorb(&leaf(9, 4, 7));
        assert_eq!(agg.timestamp(), 7);
        assert_eq!(agg.position(), 9);
        assert_eq!(agg.category(), 4);
        assert_eq!(agg.count(), 2);
    }

    #[test]
    fn test_recency_tie_goes_to_smallest_position() {
        // same timestamp on both sides, absorb order must not matter
        let mut from_right = leaf(5, 1, 3);
        from_right.absorb(&leaf(8, 2, 3));
        from_right.absorb(&leaf(2, 6, 3));
        assert_eq!(from_right.position(), 2);
        assert_eq!(from_right.category(), 6);

        let mut from_left = leaf(5, 1, 3);
        from_left.absorb(&leaf(2, 6, 3));
        from_left.absorb(&leaf(8, 2, 3));
        assert_eq!(from_left, from_right);
    }

    #[test]
    fn test_recency_keeps_self_on_older_child() {
        let mut agg = leaf(4, 3, 10);
        agg.absorb(&leaf(1, 9, 9));
        assert_eq!(agg.position(), 4);
        assert_eq!(agg.category(), 3);
    }
}

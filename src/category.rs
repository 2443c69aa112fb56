//! One rank treap per category
//!
//! Each tree holds the positions currently planted with its category. Writes create a
//! category's tree on first use; reads treat an unseen category as an empty tree.

use crate::aggregate::RankAggregate;
use crate::treap::AugmentedTreap;
use crate::{Category, Position};
use rand::Rng;
use rustc_hash::FxHashMap;

type RankTreap = AugmentedTreap<Position, (), RankAggregate>;

#[derive(Default)]
pub struct CategoryForest {
    trees: FxHashMap<Category, RankTreap>,
}

impl CategoryForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `position` as a member of `category`
    ///
    /// The position must not already be a member.
    pub fn plant<R: Rng>(&mut self, category: Category, position: Position, rng: &mut R) {
        self.trees
            .entry(category)
            .or_default()
            .insert(position, (), rng);
    }

    /// Drop `position` from `category`, reporting whether it was a member
    pub fn uproot(&mut self, category: Category, position: Position) -> bool {
        self.trees
            .entry(category)
            .or_default()
            .remove(&position)
            .is_some()
    }

    /// Move `position` from one category's tree to another's
    pub fn relocate<R: Rng>(
        &mut self,
        position: Position,
        from: Category,
        to: Category,
        rng: &mut R,
    ) {
        let was_member = self.uproot(from, position);
        debug_assert!(was_member, "position {position} was not in category {from}");
        self.plant(to, position, rng);
    }

    /// How many members of `category` sit at a position below `position`
    pub fn count_less(&self, category: Category, position: Position) -> usize {
        self.trees
            .get(&category)
            .map_or(0, |tree| tree.count_less(&position))
    }

    pub fn contains(&self, category: Category, position: Position) -> bool {
        self.trees
            .get(&category)
            .is_some_and(|tree| tree.contains(&position))
    }

    /// Number of positions currently holding `category`
    pub fn population(&self, category: Category) -> usize {
        self.trees.get(&category).map_or(0, RankTreap::len)
    }

    /// Categories seen so far, including ones whose trees have since emptied
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.trees.keys().copied()
    }

    pub(crate) fn trees(&self) -> impl Iterator<Item = (Category, &RankTreap)> + '_ {
        self.trees.iter().map(|(category, tree)| (*category, tree))
    }
}

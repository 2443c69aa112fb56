//! A farm simulation built on augmented treaps.
//!
//! Every plot of the farm grows one category and remembers when it was last replanted.
//! Two independently augmented treaps answer queries over the plots:
//!
//! - a rank treap per category counts how many plots below a position grow that category
//! - one recency treap over all plots finds the most recently replanted plot in a range
//!
//! Replanting is recorded in an undo ledger so that the most recent replacements can be
//! reversed.

pub mod aggregate;
pub mod category;
pub mod command;
pub mod drill;
pub mod error;
pub mod ledger;
pub mod position;
pub mod treap;

#[cfg(test)]
mod proptests;

use crate::category::CategoryForest;
use crate::command::{Answer, Command};
use crate::error::FarmError;
use crate::ledger::{Delta, UndoLedger};
use crate::position::PositionForest;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use crate::command::Session;

/// Index of a plot, in `0..N`
pub type Position = usize;
/// Identifier of what grows on a plot
pub type Category = i64;
/// Value of the farm clock when a plot was last replanted
pub type Timestamp = u64;

/// What a plot holds: its category and when it was planted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp {
    pub category: Category,
    pub timestamp: Timestamp,
}

/// Builder for constructing a [`Farm`]
///
/// # Examples
///
/// ```
/// use treapfarm::Farm;
///
/// // Reproducible tree shapes
/// let farm = Farm::builder().plots([1, 1, 2, 1, 2]).seed(42).build();
/// assert_eq!(farm.count(3, 1), 2);
///
/// // Entropy-seeded
/// let farm = Farm::builder().plots(vec![7; 10]).build();
/// assert_eq!(farm.len(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FarmBuilder {
    plots: Vec<Category>,
    seed: Option<u64>,
}

impl FarmBuilder {
    /// Create a new builder with no plots
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial category of every plot, in position order
    pub fn plots<I>(mut self, plots: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        self.plots = plots.into_iter().collect();
        self
    }

    /// Seed the priority generator
    ///
    /// Answers never depend on the seed, only the shapes of the trees do.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the farm, planting every plot at timestamp 0
    pub fn build(self) -> Farm {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Farm::with_rng(self.plots, rng)
    }
}

/// A farm of plots answering count and recency queries, with undoable replanting
///
/// The per-category forest, the position forest and the plain plot table are updated
/// together by every mutating call, so queries always see one consistent state.
pub struct Farm {
    categories: CategoryForest,
    positions: PositionForest,
    ledger: UndoLedger,
    plots: Vec<Stamp>,
    clock: Timestamp,
    rng: StdRng,
}

impl Farm {
    /// Create a new builder for constructing farms
    pub fn builder() -> FarmBuilder {
        FarmBuilder::new()
    }

    /// Plant `plots` in position order with an entropy-seeded priority generator
    pub fn new<I>(plots: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        Farm::builder().plots(plots).build()
    }

    fn with_rng(initial: Vec<Category>, mut rng: StdRng) -> Self {
        let mut categories = CategoryForest::new();
        let mut positions = PositionForest::new();
        let plots: Vec<Stamp> = initial
            .into_iter()
            .map(|category| Stamp {
                category,
                timestamp: 0,
            })
            .collect();
        for (position, stamp) in plots.iter().enumerate() {
            categories.plant(stamp.category, position, &mut rng);
            positions.plant(position, *stamp, &mut rng);
        }
        log::info!(
            "planted {} plots across {} categories",
            plots.len(),
            categories.categories().count()
        );
        Farm {
            categories,
            positions,
            ledger: UndoLedger::new(),
            plots,
            clock: 0,
            rng,
        }
    }

    /// Number of plots
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Current state of a plot
    pub fn stamp_at(&self, position: Position) -> Option<Stamp> {
        self.plots.get(position).copied()
    }

    /// Timestamp given to the most recent replacement
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Number of replacements that can still be undone
    pub fn pending_undos(&self) -> usize {
        self.ledger.len()
    }

    /// How many plots at a position below `position` grow `category`
    pub fn count(&self, position: Position, category: Category) -> usize {
        let count = self.categories.count_less(category, position);
        log::trace!("count({position}, {category}) = {count}");
        count
    }

    /// Replant `position` with `category`, recording the old state for undo
    pub fn replace(&mut self, position: Position, category: Category) -> Result<(), FarmError> {
        let previous = self.plot(position)?;
        self.ledger.push(Delta { position, previous });
        self.clock += 1;
        let stamp = Stamp {
            category,
            timestamp: self.clock,
        };
        log::debug!("replace {position}: {previous:?} -> {stamp:?}");
        self.apply(position, stamp);
        Ok(())
    }

    /// Reverse the `steps` most recent replacements
    ///
    /// Fails without changing anything when fewer than `steps` are recorded. Undone
    /// replacements are gone for good, and the clock keeps its value.
    pub fn undo(&mut self, steps: usize) -> Result<(), FarmError> {
        let deltas = self.ledger.rewind(steps)?;
        for Delta { position, previous } in deltas {
            log::debug!("undo {position}: back to {previous:?}");
            self.apply(position, previous);
        }
        Ok(())
    }

    /// Category of the most recently replanted plot in `lo..=hi`
    ///
    /// Plots sharing the latest timestamp resolve to the smallest position.
    pub fn strongest(&mut self, lo: Position, hi: Position) -> Result<Category, FarmError> {
        if lo > hi {
            return Err(FarmError::EmptyRange { lo, hi });
        }
        self.plot(hi)?;
        let best = self
            .positions
            .strongest(lo, hi)
            .ok_or(FarmError::EmptyRange { lo, hi })?;
        log::trace!(
            "strongest({lo}, {hi}) = category {} at {}",
            best.category(),
            best.position()
        );
        Ok(best.category())
    }

    /// Run one command, returning its answer if it is a query
    pub fn execute(&mut self, command: Command) -> Result<Option<Answer>, FarmError> {
        match command {
            Command::Count { position, category } => {
                Ok(Some(Answer::Count(self.count(position, category))))
            }
            Command::Replace { position, category } => {
                self.replace(position, category)?;
                Ok(None)
            }
            Command::Undo { steps } => {
                self.undo(steps)?;
                Ok(None)
            }
            Command::Strongest { lo, hi } => {
                Ok(Some(Answer::Strongest(self.strongest(lo, hi)?)))
            }
        }
    }

    /// Run every command in order, stopping at the first failure
    pub fn run<I>(&mut self, commands: I) -> Result<Vec<Answer>, FarmError>
    where
        I: IntoIterator<Item = Command>,
    {
        let mut answers = Vec::new();
        for command in commands {
            if let Some(answer) = self.execute(command)? {
                answers.push(answer);
            }
        }
        Ok(answers)
    }

    /// Check that both forests agree with the plot table
    ///
    /// Every plot must be a member of exactly its own category's tree and carry the same
    /// stamp in the position tree, and both trees must satisfy their treap invariants.
    pub fn is_consistent(&self) -> bool {
        let positions = self.positions.tree();
        let positions_agree = positions.len() == self.plots.len()
            && self
                .positions
                .iter()
                .zip(self.plots.iter().enumerate())
                .all(|((tree_pos, tree_stamp), (pos, stamp))| {
                    tree_pos == pos && tree_stamp == stamp
                })
            && positions.is_heap_ordered()
            && positions.aggregates_consistent();

        let members: usize = self.categories.trees().map(|(_, tree)| tree.len()).sum();
        let categories_agree = members == self.plots.len()
            && self
                .plots
                .iter()
                .enumerate()
                .all(|(pos, stamp)| self.categories.contains(stamp.category, pos))
            && self.categories.trees().all(|(_, tree)| {
                tree.is_heap_ordered() && tree.is_search_ordered() && tree.aggregates_consistent()
            });

        positions_agree && categories_agree
    }

    // Overwrite a plot in all three views at once
    fn apply(&mut self, position: Position, stamp: Stamp) {
        let current = self.plots[position];
        self.categories
            .relocate(position, current.category, stamp.category, &mut self.rng);
        self.positions.replace_at(position, stamp, &mut self.rng);
        self.plots[position] = stamp;
    }

    fn plot(&self, position: Position) -> Result<Stamp, FarmError> {
        self.stamp_at(position)
            .ok_or(FarmError::PositionOutOfRange {
                position,
                plots: self.plots.len(),
            })
    }
}

use crate::aggregate::{Counted, RankAggregate, RecencyAggregate};
use crate::command::{Answer, Command};
use crate::error::FarmError;
use crate::treap::AugmentedTreap;
use crate::{Category, Farm, Stamp, Timestamp};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

type RankTreap = AugmentedTreap<i32, (), RankAggregate>;

fn validate_rank(t: &RankTreap, reference: &BTreeSet<i32>) {
    assert!(t.is_heap_ordered(), "priority heap order violated");
    assert!(t.is_search_ordered(), "in-order keys must strictly increase");
    assert!(t.aggregates_consistent(), "stale size aggregate");
    assert_eq!(t.len(), reference.len());
    assert!(t.keys().eq(reference.iter()), "in-order keys differ");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(i32),
    Remove(i32),
    CountLess(i32),
    Contains(i32),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = -200i32..200;
    let op = prop_oneof![
        50 => key.clone().prop_map(Op::Insert),
        25 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::CountLess),
        10 => key.prop_map(Op::Contains),
    ];
    prop::collection::vec(op, 0..=400)
}

fn build(keys: &BTreeSet<i32>, seed: u64) -> RankTreap {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = RankTreap::new();
    for &key in keys {
        t.insert(key, (), &mut rng);
    }
    t
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn treap_matches_sorted_set(ops in ops_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut t = RankTreap::new();
        let mut reference = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    if reference.insert(k) {
                        t.insert(k, (), &mut rng);
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(t.remove(&k).is_some(), reference.remove(&k));
                }
                Op::CountLess(k) => {
                    prop_assert_eq!(t.count_less(&k), reference.range(..k).count());
                }
                Op::Contains(k) => {
                    prop_assert_eq!(t.contains(&k), reference.contains(&k));
                }
            }
        }
        validate_rank(&t, &reference);
    }

    #[test]
    fn split_then_merge_round_trips(
        keys in prop::collection::btree_set(-100i32..100, 0..120),
        pivot in -120i32..120,
        seed in any::<u64>(),
    ) {
        let t = build(&keys, seed);
        let (left, right) = t.split(&pivot);

        prop_assert!(left.keys().all(|k| *k < pivot));
        prop_assert!(right.keys().all(|k| *k >= pivot));
        prop_assert_eq!(left.len() + right.len(), keys.len());
        prop_assert!(left.aggregates_consistent() && right.aggregates_consistent());
        prop_assert!(left.is_heap_ordered() && right.is_heap_ordered());

        let merged = left.merge(right);
        validate_rank(&merged, &keys);
    }

    #[test]
    fn removing_absent_key_changes_nothing(
        keys in prop::collection::btree_set(0i32..50, 0..40),
        absent in 50i32..100,
        seed in any::<u64>(),
    ) {
        let mut t = build(&keys, seed);
        prop_assert_eq!(t.remove(&absent), None);
        validate_rank(&t, &keys);
    }

    #[test]
    fn recency_aggregate_is_true_maximum(
        stamps in prop::collection::vec((0i64..4, 0u64..6), 1..80),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut t: AugmentedTreap<usize, Stamp, RecencyAggregate> = AugmentedTreap::new();
        for (position, &(category, timestamp)) in stamps.iter().enumerate() {
            t.insert(position, Stamp { category, timestamp }, &mut rng);
        }
        prop_assert!(t.aggregates_consistent());

        let best = *t.aggregate().unwrap();
        let max_time = stamps.iter().map(|&(_, ts)| ts).max().unwrap();
        let leftmost = stamps.iter().position(|&(_, ts)| ts == max_time).unwrap();
        prop_assert_eq!(best.timestamp(), max_time);
        prop_assert_eq!(best.position(), leftmost);
        prop_assert_eq!(best.category(), stamps[leftmost].0);
        prop_assert_eq!(best.count(), stamps.len());
    }
}

/// Brute-force farm used as the reference model
struct NaiveFarm {
    plots: Vec<Stamp>,
    history: Vec<(usize, Stamp)>,
    clock: Timestamp,
}

impl NaiveFarm {
    fn new(initial: &[Category]) -> Self {
        NaiveFarm {
            plots: initial
                .iter()
                .map(|&category| Stamp {
                    category,
                    timestamp: 0,
                })
                .collect(),
            history: Vec::new(),
            clock: 0,
        }
    }

    fn execute(&mut self, command: Command) -> Result<Option<Answer>, FarmError> {
        match command {
            Command::Count { position, category } => Ok(Some(Answer::Count(
                self.plots
                    .iter()
                    .take(position)
                    .filter(|s| s.category == category)
                    .count(),
            ))),
            Command::Replace { position, category } => {
                let previous = *self.plots.get(position).ok_or(FarmError::PositionOutOfRange {
                    position,
                    plots: self.plots.len(),
                })?;
                self.history.push((position, previous));
                self.clock += 1;
                self.plots[position] = Stamp {
                    category,
                    timestamp: self.clock,
                };
                Ok(None)
            }
            Command::Undo { steps } => {
                if steps > self.history.len() {
                    return Err(FarmError::UndoUnderflow {
                        requested: steps,
                        available: self.history.len(),
                    });
                }
                for _ in 0..steps {
                    if let Some((position, previous)) = self.history.pop() {
                        self.plots[position] = previous;
                    }
                }
                Ok(None)
            }
            Command::Strongest { lo, hi } => {
                if lo > hi {
                    return Err(FarmError::EmptyRange { lo, hi });
                }
                if hi >= self.plots.len() {
                    return Err(FarmError::PositionOutOfRange {
                        position: hi,
                        plots: self.plots.len(),
                    });
                }
                let mut best = lo;
                for position in lo..=hi {
                    if self.plots[position].timestamp > self.plots[best].timestamp {
                        best = position;
                    }
                }
                Ok(Some(Answer::Strongest(self.plots[best].category)))
            }
        }
    }
}

fn command_strategy(plots: usize) -> impl Strategy<Value = Command> {
    let position = 0..plots + 1;
    let category = 0i64..5;
    prop_oneof![
        3 => (position.clone(), category.clone())
            .prop_map(|(position, category)| Command::Count { position, category }),
        4 => (position.clone(), category)
            .prop_map(|(position, category)| Command::Replace { position, category }),
        2 => (0usize..4).prop_map(|steps| Command::Undo { steps }),
        3 => (position.clone(), position)
            .prop_map(|(lo, hi)| Command::Strongest { lo, hi }),
    ]
}

fn farm_case() -> impl Strategy<Value = (Vec<Category>, Vec<Command>)> {
    prop::collection::vec(0i64..5, 1..30).prop_flat_map(|plots| {
        let commands = prop::collection::vec(command_strategy(plots.len()), 0..150);
        (Just(plots), commands)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    #[test]
    fn farm_matches_brute_force((plots, commands) in farm_case(), seed in any::<u64>()) {
        let mut farm = Farm::builder().plots(plots.iter().copied()).seed(seed).build();
        let mut naive = NaiveFarm::new(&plots);

        for command in commands {
            let expected = naive.execute(command);
            let actual = farm.execute(command);
            prop_assert_eq!(&actual, &expected, "command {:?}", command);
            prop_assert!(farm.is_consistent(), "views diverged after {:?}", command);
        }
        prop_assert_eq!(farm.clock(), naive.clock);
        prop_assert_eq!(farm.pending_undos(), naive.history.len());
        for (position, stamp) in naive.plots.iter().enumerate() {
            prop_assert_eq!(farm.stamp_at(position), Some(*stamp));
        }
    }
}

//! Line-oriented exercises for a bare [`AugmentedTreap`]
//!
//! ```text
//! Basic            Merge              Split
//! n                n1 n2              n
//! <n ops>          <n1 ops, n2 ops>   <n ops>
//!                                     <split key>
//! ```
//!
//! Each op is `Insert k`, `Delete k`, `Search k` or `Inorder`. Inserting a key that is
//! already present is ignored and deleting an absent key does nothing.

use crate::aggregate::RankAggregate;
use crate::command::Tokens;
use crate::error::{DrillError, ParseError};
use crate::treap::AugmentedTreap;
use rand::Rng;
use std::fmt::Write;
use std::str::Lines;

type DrillTreap = AugmentedTreap<i64, (), RankAggregate>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Insert(i64),
    Delete(i64),
    Search(i64),
    Inorder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Basic(Vec<Op>),
    Merge(Vec<Op>, Vec<Op>),
    Split(Vec<Op>, i64),
}

/// A parsed drill, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drill {
    mode: Mode,
}

impl Drill {
    pub fn parse(input: &str) -> Result<Self, DrillError> {
        let mut lines = input.lines();
        let mode = next_line(&mut lines, "drill mode")?.trim();
        let mut args = Tokens::new(next_line(&mut lines, "drill arguments")?);
        let mode = match mode {
            "Basic" => {
                let n = args.number("operation count")?;
                Mode::Basic(read_ops(&mut lines, n)?)
            }
            "Merge" => {
                let first = args.number("first operation count")?;
                let second = args.number("second operation count")?;
                let first = read_ops(&mut lines, first)?;
                Mode::Merge(first, read_ops(&mut lines, second)?)
            }
            "Split" => {
                let n = args.number("operation count")?;
                let ops = read_ops(&mut lines, n)?;
                let key = Tokens::new(next_line(&mut lines, "split key")?).number("split key")?;
                Mode::Split(ops, key)
            }
            other => return Err(DrillError::UnknownMode(other.to_string())),
        };
        Ok(Drill { mode })
    }

    /// Run the drill, returning the report lines
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<Vec<String>, DrillError> {
        let mut out = Vec::new();
        match &self.mode {
            Mode::Basic(ops) => {
                run_ops(ops, rng, &mut out);
            }
            Mode::Merge(first, second) => {
                let left = run_ops(first, rng, &mut out);
                let right = run_ops(second, rng, &mut out);
                if let (Some(&left_max), Some(&right_min)) = (left.last(), right.first()) {
                    if left_max >= right_min {
                        return Err(DrillError::Overlapping {
                            left_max,
                            right_min,
                        });
                    }
                }
                out.push(report("Merged inorder", &left.merge(right)));
            }
            Mode::Split(ops, key) => {
                let treap = run_ops(ops, rng, &mut out);
                let (left, right) = treap.split(key);
                out.push(report("Left treap inorder", &left));
                out.push(report("Right treap inorder", &right));
            }
        }
        log::debug!("drill produced {} lines", out.len());
        Ok(out)
    }
}

fn next_line<'a>(lines: &mut Lines<'a>, expected: &'static str) -> Result<&'a str, ParseError> {
    lines.next().ok_or(ParseError::UnexpectedEnd { expected })
}

fn read_ops(lines: &mut Lines<'_>, count: usize) -> Result<Vec<Op>, DrillError> {
    (0..count)
        .map(|_| -> Result<Op, DrillError> {
            let mut tokens = Tokens::new(next_line(lines, "treap operation")?);
            match tokens.word("treap operation")? {
                "Insert" => Ok(Op::Insert(tokens.number("key")?)),
                "Delete" => Ok(Op::Delete(tokens.number("key")?)),
                "Search" => Ok(Op::Search(tokens.number("key")?)),
                "Inorder" => Ok(Op::Inorder),
                other => Err(DrillError::UnknownOperation(other.to_string())),
            }
        })
        .collect()
}

fn run_ops<R: Rng>(ops: &[Op], rng: &mut R, out: &mut Vec<String>) -> DrillTreap {
    let mut treap = DrillTreap::new();
    for op in ops {
        match *op {
            Op::Insert(key) => {
                if !treap.contains(&key) {
                    treap.insert(key, (), rng);
                }
            }
            Op::Delete(key) => {
                treap.remove(&key);
            }
            Op::Search(key) => {
                let found = if treap.contains(&key) {
                    "Found"
                } else {
                    "Not Found"
                };
                out.push(format!("Search {key}: {found}"));
            }
            Op::Inorder => out.push(report("Inorder", &treap)),
        }
    }
    treap
}

fn report(label: &str, treap: &DrillTreap) -> String {
    let mut line = format!("{label}: [");
    for (i, key) in treap.keys().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        // writing to a String cannot fail
        let _ = write!(line, "{key}");
    }
    line.push(']');
    line
}

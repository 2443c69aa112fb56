use crate::Position;
use thiserror::Error;

/// Malformed input tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input ended while expecting {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected {expected}, found `{token}`")]
    InvalidNumber {
        token: String,
        expected: &'static str,
    },

    #[error("unknown command `{token}`")]
    UnknownCommand { token: String },
}

/// Failures reported by a [`crate::Farm`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FarmError {
    #[error("cannot undo {requested} replacements, only {available} recorded")]
    UndoUnderflow { requested: usize, available: usize },

    #[error("position {position} is outside a farm of {plots} plots")]
    PositionOutOfRange { position: Position, plots: usize },

    #[error("range {lo}..={hi} is empty")]
    EmptyRange { lo: Position, hi: Position },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures reported by a [`crate::drill::Drill`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillError {
    #[error("unknown drill mode `{0}`")]
    UnknownMode(String),

    #[error("unknown treap operation `{0}`")]
    UnknownOperation(String),

    #[error("cannot merge: left treap reaches {left_max}, right treap starts at {right_min}")]
    Overlapping { left_max: i64, right_min: i64 },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

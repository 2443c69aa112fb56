use crate::error::FarmError;
use crate::{Position, Stamp};

/// The state a position held before one replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub position: Position,
    pub previous: Stamp,
}

/// Stack of replacements that can still be reversed
#[derive(Debug, Default)]
pub struct UndoLedger {
    deltas: Vec<Delta>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: Delta) {
        self.deltas.push(delta);
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Pop the `steps` most recent deltas, newest first
    ///
    /// Nothing is popped when fewer than `steps` deltas are recorded.
    pub fn rewind(&mut self, steps: usize) -> Result<Vec<Delta>, FarmError> {
        let available = self.deltas.len();
        if steps > available {
            return Err(FarmError::UndoUnderflow {
                requested: steps,
                available,
            });
        }
        let mut popped = self.deltas.split_off(available - steps);
        popped.reverse();
        Ok(popped)
    }
}

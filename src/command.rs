//! Farm commands and the whitespace-separated input format
//!
//! ```text
//! N Q
//! v_0 v_1 ... v_{N-1}
//! C i v | R i v | U k | S l r      (Q times)
//! ```
//!
//! Tokens may be split across lines arbitrarily.

use crate::error::ParseError;
use crate::{Category, Position};
use std::fmt;
use std::str::{FromStr, SplitAsciiWhitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `C i v`: how many plots below `position` grow `category`
    Count {
        position: Position,
        category: Category,
    },
    /// `R i v`: replant `position` with `category`
    Replace {
        position: Position,
        category: Category,
    },
    /// `U k`: reverse the `steps` most recent replacements
    Undo { steps: usize },
    /// `S l r`: category of the most recently replanted plot in `lo..=hi`
    Strongest { lo: Position, hi: Position },
}

impl Command {
    fn read(tokens: &mut Tokens<'_>) -> Result<Self, ParseError> {
        let tag = tokens.word("command")?;
        match tag {
            "C" => Ok(Command::Count {
                position: tokens.number("position")?,
                category: tokens.number("category")?,
            }),
            "R" => Ok(Command::Replace {
                position: tokens.number("position")?,
                category: tokens.number("category")?,
            }),
            "U" => Ok(Command::Undo {
                steps: tokens.number("undo step count")?,
            }),
            "S" => Ok(Command::Strongest {
                lo: tokens.number("range start")?,
                hi: tokens.number("range end")?,
            }),
            other => Err(ParseError::UnknownCommand {
                token: other.to_string(),
            }),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::read(&mut Tokens::new(s))
    }
}

/// Output of a query command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Count(usize),
    Strongest(Category),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Count(count) => write!(f, "{count}"),
            Answer::Strongest(category) => write!(f, "{category}"),
        }
    }
}

/// A fully parsed input: initial plots followed by commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub plots: Vec<Category>,
    pub commands: Vec<Command>,
}

impl Session {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut tokens = Tokens::new(input);
        let plot_count: usize = tokens.number("plot count")?;
        let command_count: usize = tokens.number("command count")?;
        let plots = (0..plot_count)
            .map(|_| tokens.number("initial category"))
            .collect::<Result<Vec<_>, _>>()?;
        let commands = (0..command_count)
            .map(|_| Command::read(&mut tokens))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Session { plots, commands })
    }
}

impl FromStr for Session {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Session::parse(s)
    }
}

/// Whitespace tokenizer shared by the farm and drill formats
pub(crate) struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Tokens {
            inner: input.split_ascii_whitespace(),
        }
    }

    pub(crate) fn word(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        self.inner
            .next()
            .ok_or(ParseError::UnexpectedEnd { expected })
    }

    pub(crate) fn number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let token = self.word(expected)?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            expected,
        })
    }
}

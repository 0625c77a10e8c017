//! Generator for streak-detecting Moore tables.
//!
//! The generated table encodes the run length in its state names: reading
//! symbol `x` for the first time moves to `x1`, repeating it moves through
//! `x2`, `x3` and so on up to `x{n+1}`, which loops on itself. Any other
//! symbol `y` restarts at `y1`.

use crate::builder::error::TableError;
use crate::builder::table::TableBuilder;
use crate::core::{Symbol, TriggerPolicy};
use crate::machine::TransitionTable;
use std::fmt::Display;

const PLACEHOLDER: &str = "{symbol}";

/// Builder for the canonical streak-detector table.
///
/// # Example
///
/// ```rust
/// use streakfsm::builder::StreakDetector;
///
/// let table = StreakDetector::new(vec!['S', 'L'])
///     .streak(3)
///     .on_streak("Error! Too many {symbol} lollipops!")
///     .table()
///     .unwrap();
///
/// assert_eq!(table.states().len(), 9);
/// assert_eq!(table.output(&"L3".to_string()), Some("Error! Too many L lollipops!"));
/// ```
#[derive(Clone, Debug)]
pub struct StreakDetector<Y: Symbol + Display> {
    alphabet: Vec<Y>,
    streak: usize,
    initial: String,
    below: Option<String>,
    at: Option<String>,
    above: Option<String>,
}

impl<Y: Symbol + Display> StreakDetector<Y> {
    /// Detector for streaks of 3 starting in `Q0`.
    pub fn new(alphabet: Vec<Y>) -> Self {
        Self {
            alphabet,
            streak: 3,
            initial: "Q0".to_string(),
            below: None,
            at: Some(format!("{PLACEHOLDER} streak detected!")),
            above: None,
        }
    }

    /// Number of repeats that counts as a streak (at least 1).
    pub fn streak(mut self, n: usize) -> Self {
        self.streak = n;
        self
    }

    /// Name of the state before any input.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = name.into();
        self
    }

    /// Output template for run lengths below the streak.
    pub fn below_streak(mut self, template: impl Into<String>) -> Self {
        self.below = Some(template.into());
        self
    }

    /// Output template for the state where the streak is reached.
    pub fn on_streak(mut self, template: impl Into<String>) -> Self {
        self.at = Some(template.into());
        self
    }

    /// Output template for run lengths past the streak.
    pub fn above_streak(mut self, template: impl Into<String>) -> Self {
        self.above = Some(template.into());
        self
    }

    /// Remove all output templates.
    pub fn silent(mut self) -> Self {
        self.below = None;
        self.at = None;
        self.above = None;
        self
    }

    /// Run-length policy matching the table's streak length.
    pub fn policy(&self) -> TriggerPolicy {
        TriggerPolicy::run_length(self.streak)
    }

    /// Name of the state reached after `count` repeats of `symbol`.
    pub fn state_name(symbol: &Y, count: usize) -> String {
        format!("{symbol}{count}")
    }

    /// Generate the table.
    pub fn table(&self) -> Result<TransitionTable<String, Y>, TableError> {
        if self.streak == 0 {
            return Err(TableError::InvalidStreakLength { length: 0 });
        }
        let last = self.streak + 1;

        let mut builder = TableBuilder::new()
            .alphabet(self.alphabet.iter().cloned())
            .state(self.initial.clone())
            .initial(self.initial.clone());

        for symbol in &self.alphabet {
            builder = builder.edge(
                self.initial.clone(),
                symbol.clone(),
                Self::state_name(symbol, 1),
            );
        }

        for symbol in &self.alphabet {
            for count in 1..=last {
                let state = Self::state_name(symbol, count);
                builder = builder.state(state.clone());

                for input in &self.alphabet {
                    let next = if input == symbol {
                        Self::state_name(symbol, (count + 1).min(last))
                    } else {
                        Self::state_name(input, 1)
                    };
                    builder = builder.edge(state.clone(), input.clone(), next);
                }

                let template = match count.cmp(&self.streak) {
                    std::cmp::Ordering::Less => self.below.as_ref(),
                    std::cmp::Ordering::Equal => self.at.as_ref(),
                    std::cmp::Ordering::Greater => self.above.as_ref(),
                };
                if let Some(template) = template {
                    builder = builder.output(state, template.replace(PLACEHOLDER, &symbol.to_string()));
                }
            }
        }

        builder.build()
    }
}

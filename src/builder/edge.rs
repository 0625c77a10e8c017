//! Edge declarations fed to the table builder.

use crate::core::{State, Symbol};
use serde::{Deserialize, Serialize};

/// One `(from, symbol) -> to` transition declaration.
///
/// # Example
///
/// ```rust
/// use streakfsm::builder::Edge;
///
/// let edge: Edge<String, char> = ("Q0".to_string(), 'S', "S1".to_string()).into();
/// assert_eq!(edge.symbol, 'S');
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Edge<S: State, Y: Symbol> {
    pub from: S,
    pub symbol: Y,
    pub to: S,
}

impl<S: State, Y: Symbol> Edge<S, Y> {
    pub fn new(from: S, symbol: Y, to: S) -> Self {
        Self { from, symbol, to }
    }

    /// Check if the edge leaves and re-enters the same state.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl<S: State, Y: Symbol> From<(S, Y, S)> for Edge<S, Y> {
    fn from((from, symbol, to): (S, Y, S)) -> Self {
        Self::new(from, symbol, to)
    }
}

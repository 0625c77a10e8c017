//! Builder API for constructing validated transition tables.
//!
//! This module provides the fluent [`TableBuilder`], the [`edges!`](crate::edges)
//! macro for compact edge listings, and the [`StreakDetector`] generator.

pub mod edge;
pub mod error;
pub mod macros;
pub mod streak;
pub mod table;

pub use edge::Edge;
pub use error::{EdgeFault, TableError};
pub use streak::StreakDetector;
pub use table::TableBuilder;

use crate::core::{State, Symbol};

/// Build edges mapping every symbol of `alphabet` from `state` back to itself.
///
/// Handy for absorbing states that should ignore all further input.
///
/// # Example
///
/// ```
/// use streakfsm::builder::self_loops;
///
/// let edges = self_loops(&"done".to_string(), &['a', 'b']);
/// assert_eq!(edges.len(), 2);
/// assert!(edges.iter().all(|e| e.is_self_loop()));
/// ```
pub fn self_loops<S: State, Y: Symbol>(state: &S, alphabet: &[Y]) -> Vec<Edge<S, Y>> {
    alphabet
        .iter()
        .map(|symbol| Edge::new(state.clone(), symbol.clone(), state.clone()))
        .collect()
}

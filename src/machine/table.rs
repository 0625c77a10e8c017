//! Immutable, validated transition table.

use crate::builder::{Edge, TableBuilder};
use crate::core::{label, State, Symbol};
use crate::machine::error::StepError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// What the table does with a `(state, symbol)` pair that has no edge.
///
/// This is always an explicit choice made when the table is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "snake_case")]
pub enum MissingTransitions<S: State> {
    /// Every pair must be defined; a gap fails the build
    Reject,

    /// Gaps are allowed; looking one up is a `NoTransition` error
    Fail,

    /// Gaps are allowed; looking one up keeps the current state
    Stay,

    /// Gaps are filled with edges into this sink state, which is added to
    /// the state set if it was not declared
    ErrorState(S),
}

impl<S: State> Default for MissingTransitions<S> {
    fn default() -> Self {
        Self::Reject
    }
}

/// Validated `(state, symbol) -> state` mapping.
///
/// Built once with [`TableBuilder`] and read-only afterwards. Transitions
/// are stored as a dense `states x alphabet` grid of target indices.
///
/// # Example
///
/// ```rust
/// use streakfsm::edges;
/// use streakfsm::machine::TransitionTable;
///
/// let table = TransitionTable::build(
///     vec!["off".to_string(), "on".to_string()],
///     vec!['t'],
///     edges! {
///         "off" => { 't' => "on" },
///         "on" => { 't' => "off" },
///     },
///     "off".to_string(),
/// )
/// .unwrap();
///
/// assert_eq!(table.lookup(&"off".to_string(), &'t').unwrap(), "on");
/// ```
#[derive(Clone, Debug)]
pub struct TransitionTable<S: State, Y: Symbol> {
    states: Vec<S>,
    alphabet: Vec<Y>,
    state_index: HashMap<S, usize>,
    symbol_index: HashMap<Y, usize>,
    targets: Vec<Option<usize>>,
    initial: usize,
    missing: MissingTransitions<S>,
    outputs: HashMap<usize, String>,
    accepting: HashSet<usize>,
    fingerprint: String,
}

/// SHA-256 over the parts of a table that give a run state its meaning:
/// state order, alphabet order, every target and the missing-transition
/// policy. Output labels and accepting states are not included.
fn fingerprint_of<S: State, Y: Symbol>(
    states: &[S],
    alphabet: &[Y],
    targets: &[Option<usize>],
    missing: &MissingTransitions<S>,
) -> String {
    let mut hasher = Sha256::new();
    // Debug renderings never contain a raw NUL, so it separates entries.
    for state in states {
        hasher.update(label(state).as_bytes());
        hasher.update([0x00]);
    }
    hasher.update([0x01]);
    for symbol in alphabet {
        hasher.update(label(symbol).as_bytes());
        hasher.update([0x00]);
    }
    hasher.update([0x01]);
    for target in targets {
        let encoded = target.map_or(u64::MAX, |t| t as u64);
        hasher.update(encoded.to_le_bytes());
    }
    hasher.update(label(missing).as_bytes());
    hex::encode(hasher.finalize())
}

impl<S: State, Y: Symbol> TransitionTable<S, Y> {
    /// Start building a table.
    pub fn builder() -> TableBuilder<S, Y> {
        TableBuilder::new()
    }

    /// Build a strictly total table from its four essential parts.
    ///
    /// Every `(state, symbol)` pair must have an edge. Use [`TableBuilder`]
    /// for other missing-transition policies, reachability checks, outputs
    /// or accepting states.
    pub fn build<E>(
        states: Vec<S>,
        alphabet: Vec<Y>,
        edges: Vec<E>,
        initial_state: S,
    ) -> Result<Self, crate::builder::TableError>
    where
        E: Into<Edge<S, Y>>,
    {
        TableBuilder::new()
            .states(states)
            .alphabet(alphabet)
            .edges(edges)
            .initial(initial_state)
            .build()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        states: Vec<S>,
        alphabet: Vec<Y>,
        targets: Vec<Option<usize>>,
        initial: usize,
        missing: MissingTransitions<S>,
        outputs: HashMap<usize, String>,
        accepting: HashSet<usize>,
    ) -> Self {
        let state_index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let symbol_index = alphabet
            .iter()
            .enumerate()
            .map(|(i, y)| (y.clone(), i))
            .collect();
        let fingerprint = fingerprint_of(&states, &alphabet, &targets, &missing);

        Self {
            states,
            alphabet,
            state_index,
            symbol_index,
            targets,
            initial,
            missing,
            outputs,
            accepting,
            fingerprint,
        }
    }

    /// Next state for `symbol` in `state` (pure).
    ///
    /// The symbol is checked before the state, so an out-of-alphabet symbol
    /// always reports `UnknownSymbol`.
    pub fn lookup(&self, state: &S, symbol: &Y) -> Result<&S, StepError> {
        let y = self
            .symbol_index
            .get(symbol)
            .copied()
            .ok_or_else(|| StepError::UnknownSymbol {
                symbol: label(symbol),
            })?;
        let s = self
            .state_index
            .get(state)
            .copied()
            .ok_or_else(|| StepError::UnknownState {
                state: label(state),
            })?;

        match self.targets[s * self.alphabet.len() + y] {
            Some(target) => Ok(&self.states[target]),
            None => match self.missing {
                MissingTransitions::Stay => Ok(&self.states[s]),
                _ => Err(StepError::NoTransition {
                    state: label(state),
                    symbol: label(symbol),
                }),
            },
        }
    }

    /// Stable identity of the table's structure, recorded in snapshots.
    ///
    /// Tables with the same states and symbols in the same order, the same
    /// transitions and the same missing-transition policy share a
    /// fingerprint; any structural difference changes it.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Declared states, in declaration order (an added error state last).
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Declared symbols, in declaration order.
    pub fn alphabet(&self) -> &[Y] {
        &self.alphabet
    }

    pub fn initial_state(&self) -> &S {
        &self.states[self.initial]
    }

    pub fn contains_state(&self, state: &S) -> bool {
        self.state_index.contains_key(state)
    }

    pub fn contains_symbol(&self, symbol: &Y) -> bool {
        self.symbol_index.contains_key(symbol)
    }

    pub fn missing_transitions(&self) -> &MissingTransitions<S> {
        &self.missing
    }

    /// Check if every `(state, symbol)` pair has an explicit edge.
    pub fn is_total(&self) -> bool {
        self.targets.iter().all(Option::is_some)
    }

    /// Output label attached to `state` (Moore output).
    pub fn output(&self, state: &S) -> Option<&str> {
        self.state_index
            .get(state)
            .and_then(|i| self.outputs.get(i))
            .map(String::as_str)
    }

    /// Check if `state` is an accepting state.
    pub fn is_accepting(&self, state: &S) -> bool {
        self.state_index
            .get(state)
            .is_some_and(|i| self.accepting.contains(i))
    }

    /// Output labels in state declaration order.
    pub fn outputs(&self) -> Vec<(&S, &str)> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| self.outputs.get(&i).map(|o| (s, o.as_str())))
            .collect()
    }

    /// Accepting states in declaration order.
    pub fn accepting_states(&self) -> Vec<&S> {
        self.states
            .iter()
            .enumerate()
            .filter(|(i, _)| self.accepting.contains(i))
            .map(|(_, s)| s)
            .collect()
    }

    /// All explicit edges, row by row in state then symbol order.
    pub fn edges(&self) -> Vec<Edge<S, Y>> {
        let width = self.alphabet.len();
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(slot, target)| {
                target.map(|t| {
                    Edge::new(
                        self.states[slot / width].clone(),
                        self.alphabet[slot % width].clone(),
                        self.states[t].clone(),
                    )
                })
            })
            .collect()
    }
}

//! Builder for constructing validated transition tables.

use crate::builder::edge::Edge;
use crate::builder::error::{EdgeFault, TableError};
use crate::core::{label, State, Symbol};
use crate::machine::{MissingTransitions, TransitionTable};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

/// First problem found plus everything found alongside it.
type Problems = (TableError, Vec<TableError>);

fn settle(problems: Vec<TableError>) -> Result<(), Problems> {
    let mut problems = problems.into_iter();
    match problems.next() {
        Some(first) => Err((first, problems.collect())),
        None => Ok(()),
    }
}

/// Builder for transition tables with a fluent API.
///
/// Defaults: strict totality (`MissingTransitions::Reject`), no
/// reachability check, no outputs, no accepting states.
///
/// # Example
///
/// ```rust
/// use streakfsm::builder::TableBuilder;
/// use streakfsm::machine::MissingTransitions;
///
/// let table = TableBuilder::new()
///     .states(["idle", "busy"].map(String::from))
///     .alphabet(['g', 's'])
///     .edge("idle".to_string(), 'g', "busy".to_string())
///     .edge("busy".to_string(), 's', "idle".to_string())
///     .initial("idle".to_string())
///     .on_missing(MissingTransitions::Stay)
///     .build()
///     .unwrap();
///
/// assert_eq!(table.lookup(&"idle".to_string(), &'s').unwrap(), "idle");
/// ```
pub struct TableBuilder<S: State, Y: Symbol> {
    states: Vec<S>,
    alphabet: Vec<Y>,
    edges: Vec<Edge<S, Y>>,
    initial: Option<S>,
    missing: MissingTransitions<S>,
    strict_reachability: bool,
    outputs: Vec<(S, String)>,
    accepting: Vec<S>,
}

impl<S: State, Y: Symbol> TableBuilder<S, Y> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            alphabet: Vec::new(),
            edges: Vec::new(),
            initial: None,
            missing: MissingTransitions::Reject,
            strict_reachability: false,
            outputs: Vec::new(),
            accepting: Vec::new(),
        }
    }

    /// Declare states (appends).
    pub fn states<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    /// Declare a single state.
    pub fn state(mut self, state: S) -> Self {
        self.states.push(state);
        self
    }

    /// Declare symbols (appends).
    pub fn alphabet<I: IntoIterator<Item = Y>>(mut self, symbols: I) -> Self {
        self.alphabet.extend(symbols);
        self
    }

    /// Declare a single symbol.
    pub fn symbol(mut self, symbol: Y) -> Self {
        self.alphabet.push(symbol);
        self
    }

    /// Add one edge.
    pub fn edge(mut self, from: S, symbol: Y, to: S) -> Self {
        self.edges.push(Edge::new(from, symbol, to));
        self
    }

    /// Add multiple edges at once.
    pub fn edges<I, E>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge<S, Y>>,
    {
        self.edges.extend(edges.into_iter().map(Into::into));
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Choose how undefined `(state, symbol)` pairs are handled.
    pub fn on_missing(mut self, policy: MissingTransitions<S>) -> Self {
        self.missing = policy;
        self
    }

    /// Reject states that have no inbound edge from another state.
    pub fn strict_reachability(mut self, strict: bool) -> Self {
        self.strict_reachability = strict;
        self
    }

    /// Attach a Moore output label to a state.
    pub fn output(mut self, state: S, output: impl Into<String>) -> Self {
        self.outputs.push((state, output.into()));
        self
    }

    /// Mark states as accepting (appends).
    pub fn accepting<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.accepting.extend(states);
        self
    }

    /// Report every configuration problem at once.
    ///
    /// Problems are grouped in stages (declarations, then edges and labels,
    /// then completeness and reachability); a failing stage hides the
    /// stages after it because their checks would be meaningless.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TableError>> {
        match self.compile() {
            Ok(_) => Validation::success(()),
            Err((first, rest)) => {
                let checks: Vec<Validation<(), NonEmptyVec<TableError>>> = std::iter::once(first)
                    .chain(rest)
                    .map(|problem| Validation::fail(problem))
                    .collect();
                Validation::all_vec(checks).map(|_| ())
            }
        }
    }

    /// Build the table, failing with the first problem found.
    pub fn build(self) -> Result<TransitionTable<S, Y>, TableError> {
        self.compile().map_err(|(first, _)| first)
    }

    fn compile(&self) -> Result<TransitionTable<S, Y>, Problems> {
        let initial = self.check_declarations()?;

        let mut states = self.states.clone();
        let mut index: HashMap<S, usize> = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let symbols: HashMap<&Y, usize> = self
            .alphabet
            .iter()
            .enumerate()
            .map(|(i, y)| (y, i))
            .collect();
        let width = self.alphabet.len();

        let mut problems = Vec::new();
        let mut targets: Vec<Option<usize>> = vec![None; states.len() * width];

        for edge in &self.edges {
            let from = index.get(&edge.from).copied();
            let symbol = symbols.get(&edge.symbol).copied();
            let to = index.get(&edge.to).copied();

            let (from, symbol, to) = match (from, symbol, to) {
                (Some(f), Some(y), Some(t)) => (f, y, t),
                (f, y, _) => {
                    let fault = if f.is_none() {
                        EdgeFault::UnknownSource
                    } else if y.is_none() {
                        EdgeFault::UnknownSymbol
                    } else {
                        EdgeFault::UnknownTarget
                    };
                    problems.push(TableError::InvalidEdge {
                        from: label(&edge.from),
                        symbol: label(&edge.symbol),
                        to: label(&edge.to),
                        fault,
                    });
                    continue;
                }
            };

            let slot = &mut targets[from * width + symbol];
            match *slot {
                Some(existing) if existing != to => problems.push(TableError::DuplicateEdge {
                    from: label(&edge.from),
                    symbol: label(&edge.symbol),
                    existing: label(&states[existing]),
                    conflicting: label(&edge.to),
                }),
                _ => *slot = Some(to),
            }
        }

        // Labels may name the sink state even when it is added implicitly.
        let implicit_sink = match &self.missing {
            MissingTransitions::ErrorState(s) if !index.contains_key(s) => Some(s),
            _ => None,
        };
        let known = |s: &S| index.contains_key(s) || implicit_sink == Some(s);

        for (state, _) in &self.outputs {
            if !known(state) {
                problems.push(TableError::UnknownOutputState {
                    state: label(state),
                });
            }
        }

        let mut seen_accepting = HashSet::new();
        for state in &self.accepting {
            if !known(state) {
                problems.push(TableError::UnknownAcceptingState {
                    state: label(state),
                });
            } else if !seen_accepting.insert(state) {
                problems.push(TableError::DuplicateAcceptingState {
                    state: label(state),
                });
            }
        }

        settle(problems)?;

        let mut problems = Vec::new();
        match &self.missing {
            MissingTransitions::Reject => {
                for (s, state) in states.iter().enumerate() {
                    let missing: Vec<String> = self
                        .alphabet
                        .iter()
                        .enumerate()
                        .filter(|(y, _)| targets[s * width + y].is_none())
                        .map(|(_, symbol)| label(symbol))
                        .collect();
                    if !missing.is_empty() {
                        problems.push(TableError::IncompleteTable {
                            state: label(state),
                            missing,
                        });
                    }
                }
            }
            MissingTransitions::ErrorState(sink) => {
                let labelled = self.outputs.iter().any(|(s, _)| s == sink)
                    || self.accepting.contains(sink);
                if labelled || targets.iter().any(Option::is_none) {
                    let declared = index.get(sink).copied();
                    let sink_index = match declared {
                        Some(i) => i,
                        None => {
                            states.push(sink.clone());
                            index.insert(sink.clone(), states.len() - 1);
                            targets.extend(std::iter::repeat(None).take(width));
                            states.len() - 1
                        }
                    };
                    for slot in targets.iter_mut().filter(|t| t.is_none()) {
                        *slot = Some(sink_index);
                    }
                }
            }
            MissingTransitions::Fail | MissingTransitions::Stay => {}
        }

        if self.strict_reachability {
            for (s, state) in states.iter().enumerate() {
                if s == initial {
                    continue;
                }
                let has_inbound = targets
                    .iter()
                    .enumerate()
                    .any(|(slot, t)| *t == Some(s) && slot / width != s);
                if !has_inbound {
                    problems.push(TableError::UnreachableState {
                        state: label(state),
                    });
                }
            }
        }

        settle(problems)?;

        let outputs = self
            .outputs
            .iter()
            .filter_map(|(state, output)| index.get(state).map(|&i| (i, output.clone())))
            .collect();
        let accepting = self
            .accepting
            .iter()
            .filter_map(|state| index.get(state).copied())
            .collect();

        debug!(
            states = states.len(),
            symbols = width,
            edges = targets.iter().filter(|t| t.is_some()).count(),
            "Built transition table"
        );

        Ok(TransitionTable::from_parts(
            states,
            self.alphabet.clone(),
            targets,
            initial,
            self.missing.clone(),
            outputs,
            accepting,
        ))
    }

    /// Validate alphabet, state set and initial state; returns the initial
    /// state's index.
    fn check_declarations(&self) -> Result<usize, Problems> {
        let mut problems = Vec::new();

        if self.alphabet.is_empty() {
            problems.push(TableError::EmptyAlphabet);
        }
        let mut seen = HashSet::new();
        for symbol in &self.alphabet {
            if !seen.insert(symbol) {
                problems.push(TableError::DuplicateSymbol {
                    symbol: label(symbol),
                });
            }
        }

        if self.states.is_empty() {
            problems.push(TableError::EmptyStates);
        }
        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(state) {
                problems.push(TableError::DuplicateState {
                    state: label(state),
                });
            }
        }

        let initial = match &self.initial {
            None => {
                problems.push(TableError::MissingInitialState);
                None
            }
            Some(initial) => {
                let position = self.states.iter().position(|s| s == initial);
                if position.is_none() {
                    problems.push(TableError::UnknownInitialState {
                        state: label(initial),
                    });
                }
                position
            }
        };

        settle(problems)?;
        initial.ok_or((TableError::MissingInitialState, Vec::new()))
    }
}

impl<S: State, Y: Symbol> Default for TableBuilder<S, Y> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges;

    fn lollipop_states() -> Vec<String> {
        ["Q0", "S1", "S2", "S3", "S4", "L1", "L2", "L3", "L4"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn lollipop_edges() -> Vec<Edge<String, char>> {
        edges! {
            "Q0" => { 'S' => "S1", 'L' => "L1" },
            "S1" => { 'S' => "S2", 'L' => "L1" },
            "S2" => { 'S' => "S3", 'L' => "L1" },
            "S3" => { 'S' => "S4", 'L' => "L1" },
            "S4" => { 'S' => "S4", 'L' => "L1" },
            "L1" => { 'S' => "S1", 'L' => "L2" },
            "L2" => { 'S' => "S1", 'L' => "L3" },
            "L3" => { 'S' => "S1", 'L' => "L4" },
            "L4" => { 'S' => "S1", 'L' => "L4" },
        }
    }

    fn lollipop() -> TableBuilder<String, char> {
        TableBuilder::new()
            .states(lollipop_states())
            .alphabet(vec!['S', 'L'])
            .edges(lollipop_edges())
            .initial("Q0".to_string())
    }

    #[test]
    fn builds_total_table() {
        let table = lollipop().build().unwrap();
        assert_eq!(table.states().len(), 9);
        assert!(table.is_total());
        assert_eq!(table.lookup(&"S3".to_string(), &'S').unwrap(), "S4");
    }

    #[test]
    fn builder_requires_initial_state() {
        let result = TableBuilder::<String, char>::new()
            .states(lollipop_states())
            .alphabet(vec!['S', 'L'])
            .edges(lollipop_edges())
            .build();

        assert!(matches!(result, Err(TableError::MissingInitialState)));
    }

    #[test]
    fn rejects_empty_alphabet() {
        let result = TableBuilder::<String, char>::new()
            .state("Q0".to_string())
            .initial("Q0".to_string())
            .build();

        assert!(matches!(result, Err(TableError::EmptyAlphabet)));
    }

    #[test]
    fn rejects_repeated_symbol() {
        let result = TableBuilder::<String, char>::new()
            .state("Q0".to_string())
            .alphabet(vec!['S', 'S'])
            .initial("Q0".to_string())
            .build();

        assert_eq!(
            result.unwrap_err(),
            TableError::DuplicateSymbol {
                symbol: "'S'".to_string()
            }
        );
    }

    #[test]
    fn rejects_empty_and_repeated_states() {
        let empty = TableBuilder::<String, char>::new()
            .symbol('S')
            .initial("Q0".to_string())
            .build();
        assert!(matches!(empty, Err(TableError::EmptyStates)));

        let repeated = TableBuilder::<String, char>::new()
            .states(vec!["Q".to_string(), "Q".to_string()])
            .symbol('S')
            .initial("Q".to_string())
            .build();
        assert!(matches!(repeated, Err(TableError::DuplicateState { .. })));
    }

    #[test]
    fn rejects_unknown_initial_state() {
        let result = lollipop().initial("Q9".to_string()).build();
        assert!(matches!(result, Err(TableError::UnknownInitialState { .. })));
    }

    #[test]
    fn rejects_edge_to_undeclared_state() {
        let result = lollipop()
            .edge("Q0".to_string(), 'S', "S9".to_string())
            .build();

        assert_eq!(
            result.unwrap_err(),
            TableError::InvalidEdge {
                from: "\"Q0\"".to_string(),
                symbol: "'S'".to_string(),
                to: "\"S9\"".to_string(),
                fault: EdgeFault::UnknownTarget,
            }
        );
    }

    #[test]
    fn rejects_edge_with_foreign_symbol_or_source() {
        let foreign = lollipop()
            .edge("Q0".to_string(), 'X', "S1".to_string())
            .build();
        assert!(matches!(
            foreign,
            Err(TableError::InvalidEdge {
                fault: EdgeFault::UnknownSymbol,
                ..
            })
        ));

        let source = lollipop()
            .edge("Z".to_string(), 'S', "S1".to_string())
            .build();
        assert!(matches!(
            source,
            Err(TableError::InvalidEdge {
                fault: EdgeFault::UnknownSource,
                ..
            })
        ));
    }

    #[test]
    fn conflicting_edges_fail_construction() {
        let result = lollipop()
            .edge("Q0".to_string(), 'S', "L1".to_string())
            .build();

        assert_eq!(
            result.unwrap_err(),
            TableError::DuplicateEdge {
                from: "\"Q0\"".to_string(),
                symbol: "'S'".to_string(),
                existing: "\"S1\"".to_string(),
                conflicting: "\"L1\"".to_string(),
            }
        );
    }

    #[test]
    fn repeating_identical_edge_is_accepted() {
        let result = lollipop()
            .edge("Q0".to_string(), 'S', "S1".to_string())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn strict_totality_reports_missing_pairs() {
        let result = TableBuilder::<String, char>::new()
            .states(vec!["Q0".to_string(), "S1".to_string()])
            .alphabet(vec!['S', 'L'])
            .edges(edges! {
                "Q0" => { 'S' => "S1", 'L' => "Q0" },
                "S1" => { 'S' => "S1" },
            })
            .initial("Q0".to_string())
            .build();

        assert_eq!(
            result.unwrap_err(),
            TableError::IncompleteTable {
                state: "\"S1\"".to_string(),
                missing: vec!["'L'".to_string()],
            }
        );
    }

    #[test]
    fn empty_edge_set_is_incomplete() {
        let result = TableBuilder::<String, char>::new()
            .states(vec!["Q0".to_string(), "S1".to_string()])
            .symbol('S')
            .initial("Q0".to_string())
            .build();

        assert!(matches!(result, Err(TableError::IncompleteTable { .. })));
    }

    #[test]
    fn error_state_fills_gaps_and_is_appended() {
        let table = TableBuilder::<String, char>::new()
            .states(vec!["Q0".to_string(), "S1".to_string()])
            .alphabet(vec!['S', 'L'])
            .edges(edges! {
                "Q0" => { 'S' => "S1" },
                "S1" => { 'S' => "S1" },
            })
            .initial("Q0".to_string())
            .on_missing(MissingTransitions::ErrorState("ERR".to_string()))
            .build()
            .unwrap();

        assert_eq!(table.states().last().unwrap(), "ERR");
        assert!(table.is_total());
        assert_eq!(table.lookup(&"Q0".to_string(), &'L').unwrap(), "ERR");
        assert_eq!(table.lookup(&"ERR".to_string(), &'S').unwrap(), "ERR");
    }

    #[test]
    fn error_state_is_not_added_to_total_table() {
        let table = lollipop()
            .on_missing(MissingTransitions::ErrorState("ERR".to_string()))
            .build()
            .unwrap();

        assert_eq!(table.states().len(), 9);
        assert!(!table.contains_state(&"ERR".to_string()));
    }

    #[test]
    fn labelled_error_state_is_kept_in_total_table() {
        let table = lollipop()
            .on_missing(MissingTransitions::ErrorState("ERR".to_string()))
            .output("ERR".to_string(), "sensor fault")
            .build()
            .unwrap();

        assert_eq!(table.states().len(), 10);
        assert_eq!(table.output(&"ERR".to_string()), Some("sensor fault"));
        assert_eq!(table.lookup(&"ERR".to_string(), &'L').unwrap(), "ERR");
    }

    #[test]
    fn strict_reachability_rejects_orphan_state() {
        let result = TableBuilder::<String, char>::new()
            .states(vec!["Q0".to_string(), "A".to_string(), "B".to_string()])
            .symbol('x')
            .edges(edges! {
                "Q0" => { 'x' => "A" },
                "A" => { 'x' => "Q0" },
                "B" => { 'x' => "B" },
            })
            .initial("Q0".to_string())
            .strict_reachability(true)
            .build();

        assert_eq!(
            result.unwrap_err(),
            TableError::UnreachableState {
                state: "\"B\"".to_string()
            }
        );
    }

    #[test]
    fn lenient_reachability_allows_orphan_state() {
        let result = TableBuilder::<String, char>::new()
            .states(vec!["Q0".to_string(), "B".to_string()])
            .symbol('x')
            .edges(edges! {
                "Q0" => { 'x' => "Q0" },
                "B" => { 'x' => "B" },
            })
            .initial("Q0".to_string())
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn outputs_and_accepting_states_are_checked() {
        let unknown_output = lollipop().output("Z".to_string(), "boom").build();
        assert!(matches!(
            unknown_output,
            Err(TableError::UnknownOutputState { .. })
        ));

        let unknown_accepting = lollipop().accepting(vec!["Z".to_string()]).build();
        assert!(matches!(
            unknown_accepting,
            Err(TableError::UnknownAcceptingState { .. })
        ));

        let repeated = lollipop()
            .accepting(vec!["S3".to_string(), "S3".to_string()])
            .build();
        assert!(matches!(
            repeated,
            Err(TableError::DuplicateAcceptingState { .. })
        ));
    }

    #[test]
    fn outputs_and_accepting_states_are_stored() {
        let table = lollipop()
            .output("S3".to_string(), "Too many strawberry")
            .accepting(vec!["L3".to_string(), "L4".to_string()])
            .build()
            .unwrap();

        assert_eq!(table.output(&"S3".to_string()), Some("Too many strawberry"));
        assert_eq!(table.output(&"S2".to_string()), None);
        assert!(table.is_accepting(&"L4".to_string()));
        assert!(!table.is_accepting(&"Q0".to_string()));
        assert_eq!(table.accepting_states().len(), 2);
        assert_eq!(table.outputs().len(), 1);
    }

    #[test]
    fn validate_accumulates_all_problems() {
        let builder = lollipop()
            .edge("Q0".to_string(), 'S', "L1".to_string())
            .edge("Q0".to_string(), 'X', "S1".to_string())
            .output("Z".to_string(), "nope");

        match builder.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::DuplicateEdge { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::InvalidEdge { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::UnknownOutputState { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn validate_succeeds_for_valid_table() {
        assert!(lollipop().validate().is_success());
    }
}

//! End-to-end behavior of the lollipop streak detector.

use streakfsm::builder::{StreakDetector, TableBuilder, TableError};
use streakfsm::checkpoint::CheckpointError;
use streakfsm::core::{AnomalyEvent, TriggerPolicy};
use streakfsm::driver::{CollectingSink, Driver};
use streakfsm::edges;
use streakfsm::machine::{MissingTransitions, Runtime, StepError, TransitionTable};

fn lollipops() -> Runtime<String, char> {
    let detector = StreakDetector::new(vec!['S', 'L'])
        .on_streak("Error! Too many {symbol} lollipops!");
    Runtime::from_table(detector.table().unwrap(), detector.policy()).unwrap()
}

#[test]
fn lollipop_stream_reports_each_streak_once() {
    let input = ['S', 'L', 'L', 'L', 'L', 'S', 'S', 'S', 'S', 'S', 'S', 'L', 'L', 'L'];
    let mut runtime = lollipops();

    let events: Vec<AnomalyEvent<char>> = runtime
        .run(input)
        .unwrap()
        .into_iter()
        .filter_map(|o| o.event)
        .collect();

    assert_eq!(
        events,
        vec![
            AnomalyEvent { symbol: 'L', run_length: 3, position: 3 },
            AnomalyEvent { symbol: 'S', run_length: 3, position: 7 },
            AnomalyEvent { symbol: 'L', run_length: 3, position: 13 },
        ]
    );
    assert_eq!(runtime.current_state(), "L3");
    assert_eq!(
        runtime.current_output(),
        Some("Error! Too many L lollipops!")
    );
}

#[test]
fn streak_states_carry_output_labels() {
    let mut runtime = lollipops();
    let labels: Vec<Option<String>> = "LLLL"
        .chars()
        .map(|symbol| {
            runtime.step(symbol).unwrap();
            runtime.current_output().map(str::to_string)
        })
        .collect();

    assert_eq!(
        labels,
        vec![
            None,
            None,
            Some("Error! Too many L lollipops!".to_string()),
            None,
        ]
    );
}

#[test]
fn driver_delivers_the_same_events() {
    let mut sink = CollectingSink::new();
    let mut driver = Driver::new(lollipops());
    let summary = driver.drive("SLLLLSSSSSSLLL".chars(), &mut sink).unwrap();

    assert_eq!(summary.steps, 14);
    assert_eq!(summary.events, 3);
    let positions: Vec<u64> = sink.into_events().into_iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![3, 7, 13]);
}

#[test]
fn two_runtimes_share_one_table() {
    let table = StreakDetector::new(vec!['S', 'L']).table().unwrap();
    let mut a = Runtime::from_table(table.clone(), TriggerPolicy::run_length(2)).unwrap();
    let mut b = Runtime::from_table(table, TriggerPolicy::run_length(2)).unwrap();

    let a_events = a.run("SSSS".chars()).unwrap().iter().filter(|o| o.is_anomaly()).count();
    let b_events = b.run("SLSL".chars()).unwrap().iter().filter(|o| o.is_anomaly()).count();

    assert_eq!(a_events, 1);
    assert_eq!(b_events, 0);
    assert_eq!(a.current_state(), "S4");
    assert_eq!(b.current_state(), "L1");
}

#[test]
fn conflicting_edges_fail_construction() {
    let result: Result<TransitionTable<String, char>, _> = TransitionTable::build(
        vec!["a".to_string(), "b".to_string()],
        vec!['x'],
        edges! {
            "a" => { 'x' => "a", 'x' => "b" },
            "b" => { 'x' => "a" },
        },
        "a".to_string(),
    );

    assert!(matches!(result, Err(TableError::DuplicateEdge { .. })));
}

#[test]
fn restore_against_a_different_state_set_is_refused() {
    let other = TableBuilder::new()
        .states(vec!["idle".to_string(), "busy".to_string()])
        .alphabet(vec!['S', 'L'])
        .edges(edges! {
            "idle" => { 'S' => "busy", 'L' => "idle" },
            "busy" => { 'S' => "busy", 'L' => "idle" },
        })
        .initial("idle".to_string())
        .build()
        .unwrap();
    let mut foreign = Runtime::from_table(other, TriggerPolicy::run_length(3)).unwrap();
    foreign.run("SS".chars()).unwrap();
    let snapshot = foreign.snapshot();

    let mut runtime = lollipops();
    runtime.run("LL".chars()).unwrap();
    let before = runtime.run_state().clone();

    let err = runtime.restore(snapshot).unwrap_err();
    assert!(matches!(err, CheckpointError::InvalidSnapshot { .. }));
    assert_eq!(runtime.run_state(), &before);

    // The untouched run continues normally.
    let outcome = runtime.step('L').unwrap();
    assert!(outcome.is_anomaly());
}

#[test]
fn restore_from_a_smaller_table_sharing_state_names_is_refused() {
    let small = TransitionTable::build(
        vec!["Q0".to_string(), "S1".to_string()],
        vec!['S', 'L'],
        edges! {
            "Q0" => { 'S' => "S1", 'L' => "Q0" },
            "S1" => { 'S' => "S1", 'L' => "Q0" },
        },
        "Q0".to_string(),
    )
    .unwrap();
    let mut foreign = Runtime::from_table(small, TriggerPolicy::run_length(3)).unwrap();
    foreign.step('S').unwrap();
    assert_eq!(foreign.current_state(), "S1");
    let snapshot = foreign.snapshot();

    let mut runtime = lollipops();
    let before = runtime.run_state().clone();

    let err = runtime.restore(snapshot).unwrap_err();
    assert!(matches!(err, CheckpointError::InvalidSnapshot { .. }));
    assert_eq!(runtime.run_state(), &before);
    assert_eq!(runtime.current_state(), "Q0");
}

#[test]
fn partial_table_policies() {
    let declare = |missing: MissingTransitions<String>| {
        TableBuilder::new()
            .states(vec!["a".to_string(), "b".to_string()])
            .alphabet(vec!['x', 'y'])
            .edges(edges! {
                "a" => { 'x' => "b" },
                "b" => { 'x' => "a" },
            })
            .initial("a".to_string())
            .on_missing(missing)
            .build()
    };

    assert!(matches!(
        declare(MissingTransitions::Reject),
        Err(TableError::IncompleteTable { .. })
    ));

    let mut failing =
        Runtime::from_table(declare(MissingTransitions::Fail).unwrap(), TriggerPolicy::Disabled)
            .unwrap();
    assert!(matches!(
        failing.step('y'),
        Err(StepError::NoTransition { .. })
    ));
    assert_eq!(failing.current_state(), "a");

    let mut staying =
        Runtime::from_table(declare(MissingTransitions::Stay).unwrap(), TriggerPolicy::Disabled)
            .unwrap();
    staying.step('y').unwrap();
    assert_eq!(staying.current_state(), "a");
    assert_eq!(staying.run_state().position, 1);

    let mut sinking = Runtime::from_table(
        declare(MissingTransitions::ErrorState("error".to_string())).unwrap(),
        TriggerPolicy::Disabled,
    )
    .unwrap();
    sinking.run("xy".chars()).unwrap();
    assert_eq!(sinking.current_state(), "error");
    sinking.step('x').unwrap();
    assert_eq!(sinking.current_state(), "error");
}

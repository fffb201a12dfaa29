//! Forward exploration: reachability, counterexample shape, terminal
//! handling, and error propagation.

mod common;

use common::{cfg, values, TableModel, TwinCounters};
use stator_mc::{CheckError, CheckOutcome, Config, Explorer};
use stator_model::LayoutBuilder;

#[test]
fn explores_exactly_the_reachable_states() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 4, vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::Ok { states, edges } => {
            assert_eq!(states, 4);
            assert_eq!(edges, 4);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn unreachable_edges_stay_unexplored() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 4, vec![(0, 1), (5, 6)]);
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::Ok { states, edges } => {
            assert_eq!(states, 2);
            assert_eq!(edges, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn safety_counterexample_is_shortest() {
    // the bad value is reachable in one step or in two; breadth-first
    // search must report the one-step history
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2), (0, 2)]);
    model.bad = Some((2, "boom"));
    let x = model.x;
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::SafetyViolation { message, trace } => {
            assert_eq!(message, "boom");
            assert_eq!(values(x, &trace), vec![0, 2]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn try_forward_finds_the_same_violation() {
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2), (0, 2)]);
    model.bad = Some((2, "boom"));
    let x = model.x;
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            try_forward: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::SafetyViolation { message, trace } => {
            assert_eq!(message, "boom");
            assert_eq!(values(x, &trace), vec![0, 2]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn bad_initial_state_stops_immediately() {
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2)]);
    model.bad = Some((0, "bad"));
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::SafetyViolation { message, trace } => {
            assert_eq!(message, "bad");
            assert_eq!(trace.len(), 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(ex.stats().states, 1);
}

#[test]
fn illegal_deadlock_reports_history_to_the_terminal() {
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2)]);
    model.deadlock_msg = Some("unexpected termination");
    let x = model.x;
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_deadlock: true,
            ..cfg()
        },
    );
    match ex.check().unwrap() {
        CheckOutcome::IllegalDeadlock { message, trace } => {
            assert_eq!(message, "unexpected termination");
            assert_eq!(values(x, &trace), vec![0, 1, 2]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn terminals_are_fine_without_deadlock_checking() {
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2)]);
    model.deadlock_msg = Some("never consulted");
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    assert!(matches!(
        ex.check().unwrap(),
        CheckOutcome::Ok { states: 3, edges: 2 }
    ));
}

#[test]
fn model_errors_surface_with_history() {
    let mut b = LayoutBuilder::new();
    let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2)]);
    model.fire_error_at = Some((1, "model bug"));
    let x = model.x;
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    match ex.check() {
        Err(CheckError::Firing { message, trace }) => {
            assert_eq!(message, "model bug");
            assert_eq!(values(x, &trace), vec![0, 1]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn out_of_range_writes_are_firing_errors() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 2, vec![(0, 7)]);
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            ..cfg()
        },
    );
    assert!(matches!(ex.check(), Err(CheckError::Firing { .. })));

    // with sanity checking off the value is silently truncated
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 2, vec![(0, 7)]);
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            sanity_checks: false,
            ..cfg()
        },
    );
    assert!(matches!(
        ex.check().unwrap(),
        CheckOutcome::Ok { states: 2, .. }
    ));
}

#[test]
fn state_limit_aborts_construction() {
    let mut b = LayoutBuilder::new();
    let edges = (0..9).map(|v| (v, v + 1)).collect();
    let model = TableModel::new(&mut b, 4, edges);
    let mut ex = Explorer::new(
        model,
        b.finish(),
        Config {
            check_state: true,
            stop_count: 4,
            ..cfg()
        },
    );
    assert!(matches!(
        ex.check(),
        Err(CheckError::CapacityExceeded { states: 4 })
    ));
}

#[test]
fn no_selected_property_is_rejected() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 4, vec![(0, 1)]);
    let mut ex = Explorer::new(model, b.finish(), cfg());
    assert!(matches!(ex.check(), Err(CheckError::NoPropertySelected)));
}

#[test]
fn identical_runs_agree_bit_for_bit() {
    let run = || {
        let mut b = LayoutBuilder::new();
        let mut model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2), (2, 0), (1, 3)]);
        model.bad = Some((3, "boom"));
        let x = model.x;
        let mut ex = Explorer::new(
            model,
            b.finish(),
            Config {
                check_state: true,
                ..cfg()
            },
        );
        let outcome = ex.check().unwrap();
        (format!("{outcome:?}"), ex.stats(), x)
    };
    let (first, stats1, _) = run();
    let (second, stats2, _) = run();
    assert_eq!(first, second);
    assert_eq!(stats1, stats2);
}

#[test]
fn symmetry_reduction_collapses_twins_without_missing_the_bug() {
    let full = {
        let mut b = LayoutBuilder::new();
        let model = TwinCounters::new(&mut b, 2);
        let mut ex = Explorer::new(
            model,
            b.finish(),
            Config {
                check_state: true,
                ..cfg()
            },
        );
        let outcome = ex.check().unwrap();
        (ex.stats(), format!("{outcome:?}"))
    };
    let reduced = {
        let mut b = LayoutBuilder::new();
        let model = TwinCounters::new(&mut b, 2);
        let mut ex = Explorer::new(
            model,
            b.finish(),
            Config {
                check_state: true,
                symmetry: true,
                ..cfg()
            },
        );
        let outcome = ex.check().unwrap();
        (ex.stats(), format!("{outcome:?}"))
    };

    assert!(reduced.0.states < full.0.states);
    assert!(full.1.contains("both counters at top"));
    assert!(reduced.1.contains("both counters at top"));
}

#[test]
fn typical_walk_reaches_a_cycle_or_terminal() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2), (2, 1)]);
    let x = model.x;
    let mut ex = Explorer::new(model, b.finish(), cfg());
    match ex.typical().unwrap() {
        CheckOutcome::Typical { lasso, states } => {
            // ascending trial order walks 0, 1, 2 and closes back on 1
            assert_eq!(values(x, &lasso.stem), vec![0]);
            assert_eq!(values(x, &lasso.cycle), vec![1, 2]);
            assert_eq!(states, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn typical_walk_ends_at_a_terminal() {
    let mut b = LayoutBuilder::new();
    let model = TableModel::new(&mut b, 4, vec![(0, 1), (1, 2)]);
    let x = model.x;
    let mut ex = Explorer::new(model, b.finish(), cfg());
    match ex.typical().unwrap() {
        CheckOutcome::Typical { lasso, .. } => {
            assert_eq!(values(x, &lasso.stem), vec![0, 1]);
            assert_eq!(values(x, &lasso.cycle), vec![2]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

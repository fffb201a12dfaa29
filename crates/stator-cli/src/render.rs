//! Rendering of verdicts, counterexamples, and summaries.

use stator_mc::{CheckError, CheckOutcome, Lasso, Trace};
use stator_model::Model;

/// Separator between the approach to a non-progress state and the lasso
/// demonstrating the failure.
const APPROACH_SEP: &str = "==========";
/// Separator between a lasso's stem and its cycle.
const CYCLE_SEP: &str = "----------";

pub fn print_trace<M: Model>(model: &M, trace: &Trace) {
    for state in trace.states() {
        println!("{}", model.format_state(state));
    }
}

pub fn print_lasso<M: Model>(model: &M, lasso: &Lasso) {
    print_trace(model, &lasso.stem);
    println!("{CYCLE_SEP}");
    print_trace(model, &lasso.cycle);
}

/// Prints the counterexample (if any) and the error line of a verdict.
pub fn print_outcome<M: Model>(model: &M, outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Ok { .. } => {}
        CheckOutcome::SafetyViolation { message, trace } => {
            print_trace(model, trace);
            println!("!!! Safety error: {message}");
        }
        CheckOutcome::IllegalDeadlock { message, trace } => {
            print_trace(model, trace);
            println!("!!! Illegal deadlock: {message}");
        }
        CheckOutcome::MayProgressViolation { approach, lasso } => {
            print_trace(model, approach);
            println!("{APPROACH_SEP}");
            print_lasso(model, lasso);
            println!("!!! May-type non-progress error");
        }
        CheckOutcome::MustProgressViolation { approach, lasso } => {
            print_trace(model, approach);
            println!("{APPROACH_SEP}");
            print_lasso(model, lasso);
            println!("!!! Must-type non-progress error");
        }
        CheckOutcome::TerminationUnreachable { approach, lasso } => {
            print_trace(model, approach);
            println!("{APPROACH_SEP}");
            print_lasso(model, lasso);
            println!("!!! State was reached from which termination is unreachable");
        }
        CheckOutcome::Typical { lasso, .. } => {
            print_lasso(model, lasso);
        }
    }
}

/// Prints a hard error, with its counterexample where one exists.
pub fn print_error<M: Model>(model: &M, err: &CheckError) {
    match err {
        CheckError::Firing { message, trace } => {
            print_trace(model, trace);
            println!("!!! Transition firing error: {message}");
        }
        CheckError::Stubborn { message, trace } => {
            print_trace(model, trace);
            println!("!!! Stubborn set error: {message}");
        }
        CheckError::CapacityExceeded { .. } => {
            println!("!!! Maximum number of states exceeded");
        }
        other => println!("!!! {other}"),
    }
}

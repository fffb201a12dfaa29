//! Breadth-first explicit-state exploration and property verification for
//! compiled-in finite-state models.
//!
//! The checker enumerates the reachable states of a [`stator_model::Model`]
//! in breadth-first order — so counterexamples are shortest — and verifies
//! up to four property classes: state safety, legal termination, may
//! progress, and must progress. Two reductions supplied by the model can
//! shrink the constructed state space: a symmetry representative function
//! and a stubborn-set obligation function.

mod arena;
pub mod config;
pub mod explorer;
mod progress;
mod stubborn;
pub mod trace;

pub use config::Config;
pub use explorer::{CheckError, CheckOutcome, CheckResult, Explorer, Stats};
pub use trace::{Lasso, Trace};

//! The contract between a compiled-in model and the explorer.

use crate::state::{StateMut, StateRef};
use crate::stubborn::Obligations;
use thiserror::Error;

/// An error raised by the model itself during initialisation or firing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ModelError(pub String);

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A finite-state model: numbered structural transitions over the packed
/// state vector.
///
/// The structural transitions are known by numbers `0..nr_trans`. Two
/// logically distinct transitions may share a number if they are never
/// simultaneously enabled. Counterexamples read best when transitions that
/// model unusual events (timeouts, message loss) get bigger numbers than
/// the usual course of events, because the explorer tries high numbers
/// first by default.
///
/// Apart from `init`, `fire`, and `canonicalize`, no operation may change
/// the state.
pub trait Model {
    /// Performs one-time initialisation, may write the initial state (the
    /// default is all-zero), and returns the number of structural
    /// transitions.
    fn init(&mut self, state: &mut StateMut<'_>) -> Result<u32, ModelError>;

    /// Renders the state in human-readable form, preferably on one line.
    fn format_state(&self, state: StateRef<'_>) -> String;

    /// Attempts transition `tr`. Returns `Ok(true)` and mutates the state
    /// to the successor iff the transition is enabled; must leave the
    /// state untouched when returning `Ok(false)`.
    fn fire(&mut self, tr: u32, state: &mut StateMut<'_>) -> Result<bool, ModelError>;

    /// Returns an error message iff the state is bad. Consulted once for
    /// every newly stored state when safety checking is selected.
    fn check_state(&self, state: StateRef<'_>) -> Option<&'static str> {
        let _ = state;
        None
    }

    /// Returns an error message iff terminating in this state is illegal.
    /// Consulted only at terminal states.
    fn check_deadlock(&self, state: StateRef<'_>) -> Option<&'static str> {
        let _ = state;
        None
    }

    /// True iff the state is a user-defined may-progress state.
    fn is_may_progress(&self, state: StateRef<'_>) -> bool {
        let _ = state;
        false
    }

    /// True iff the state is a user-defined must-progress state.
    fn is_must_progress(&self, state: StateRef<'_>) -> bool {
        let _ = state;
        false
    }

    /// Maps the state in place to its symmetry representative. The more
    /// states of each equivalence class collapse onto one representative,
    /// the better the reduction.
    fn canonicalize(&self, state: &mut StateMut<'_>) {
        let _ = state;
    }

    /// Emits the transitions a stubborn set of the current state must
    /// additionally contain if it contains `tr`. At most one call to
    /// [`Obligations::require`] or [`Obligations::require_all`] is allowed
    /// per invocation; emitting nothing means no further obligations. It
    /// does not matter whether the list contains `tr` itself.
    fn next_stubborn(&self, tr: u32, state: StateRef<'_>, obl: &mut Obligations) {
        let _ = (tr, state, obl);
    }
}

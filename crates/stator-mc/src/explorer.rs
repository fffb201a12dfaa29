//! Breadth-first construction of the state space and the phase driver.

use crate::arena::Arena;
use crate::config::Config;
use crate::stubborn::StubbornCtx;
use crate::trace::{Lasso, Trace};
use stator_model::{Model, ModelError, VarLayout};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Hard failure of a verification run. Property violations are not errors
/// — see [`CheckOutcome`].
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("initialization error: {0}")]
    Init(#[source] ModelError),

    /// The model raised an error while firing a transition.
    #[error("transition firing error: {message}")]
    Firing { message: String, trace: Trace },

    /// The model's obligation function misbehaved.
    #[error("stubborn set error: {message}")]
    Stubborn { message: String, trace: Trace },

    #[error("maximum number of states exceeded")]
    CapacityExceeded { states: usize },

    #[error("too many transitions")]
    TooManyTransitions,

    /// The state space has more edges than the back-edge array can index.
    #[error("too many edges for progress verification: {edges}")]
    EdgeOverflow { edges: u64 },

    #[error("no property was selected to check")]
    NoPropertySelected,
}

pub type CheckResult<T> = Result<T, CheckError>;

/// Verdict of a verification run. A violation carries the evidence: the
/// shortest history to the offending state and, for progress properties,
/// the lasso demonstrating the non-progress behaviour.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Every selected property holds.
    Ok { states: usize, edges: u64 },

    /// A newly stored state failed the safety predicate.
    SafetyViolation { message: String, trace: Trace },

    /// A terminal state failed the termination predicate.
    IllegalDeadlock { message: String, trace: Trace },

    /// A state from which no may-progress state is reachable. The
    /// approach leads up to (excluding) the offending state; the lasso
    /// starts there.
    MayProgressViolation { approach: Trace, lasso: Lasso },

    /// A cycle or terminal state without a must-progress state.
    MustProgressViolation { approach: Trace, lasso: Lasso },

    /// Under stubborn reduction: a state from which termination is
    /// unreachable, so the reduced search cannot be trusted.
    TerminationUnreachable { approach: Trace, lasso: Lasso },

    /// Result of [`Explorer::typical`]: no verification, just a typical
    /// execution.
    Typical { lasso: Lasso, states: usize },
}

/// Exploration counters, valid at any point of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub states: usize,
    pub edges: u64,
}

/// Internal short-circuit carrier: the first outcome or error wins and
/// unwinds every phase via `?`.
pub(crate) enum Halt {
    Outcome(CheckOutcome),
    Error(CheckError),
}

impl From<CheckError> for Halt {
    fn from(e: CheckError) -> Self {
        Halt::Error(e)
    }
}

pub(crate) type Step<T> = Result<T, Halt>;

/// Which of the two exploration drives is running: forward discovery or
/// the back-edge recording replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Forward,
    Backward,
}

/// Explores the state space of one model and verifies the configured
/// properties.
pub struct Explorer<M: Model> {
    model: M,
    pub(crate) cfg: Config,
    pub(crate) arena: Arena,
    pub(crate) nr_trans: u32,
    pub(crate) nr_edges: u64,
    pub(crate) iedges: Vec<u32>,
    started: bool,
}

impl<M: Model> Explorer<M> {
    pub fn new(model: M, layout: VarLayout, cfg: Config) -> Self {
        let arena = Arena::new(&layout, cfg.hash_bits, cfg.stop_count);
        Self {
            model,
            cfg,
            arena,
            nr_trans: 0,
            nr_edges: 0,
            iedges: Vec::new(),
            started: false,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn stats(&self) -> Stats {
        Stats {
            states: self.arena.state_count(),
            edges: self.nr_edges,
        }
    }

    /// Runs the configured verification tasks and returns the verdict.
    pub fn check(&mut self) -> CheckResult<CheckOutcome> {
        match self.run_check() {
            Ok(outcome) | Err(Halt::Outcome(outcome)) => Ok(outcome),
            Err(Halt::Error(e)) => Err(e),
        }
    }

    /// Produces a typical execution — a lasso from the initial state to a
    /// cycle or terminal state — without model checking.
    pub fn typical(&mut self) -> CheckResult<CheckOutcome> {
        match self.run_typical() {
            Ok(outcome) | Err(Halt::Outcome(outcome)) => Ok(outcome),
            Err(Halt::Error(e)) => Err(e),
        }
    }

    fn run_check(&mut self) -> Step<CheckOutcome> {
        self.cfg.validate()?;
        for w in self.cfg.warnings() {
            warn!("{w}");
        }

        self.store_initial()?;
        self.build_state_space(Pass::Forward)?;
        debug!(
            states = self.arena.state_count(),
            edges = self.nr_edges,
            "state space constructed"
        );

        if self.cfg.progress_infra() {
            self.construct_input_edges()?;
            if self.cfg.check_may_progress {
                self.verify_progress(crate::progress::Round::May)?;
            }
            if self.cfg.check_must_progress {
                self.verify_progress(crate::progress::Round::Must)?;
            }
            if self.cfg.stubborn {
                self.verify_progress(crate::progress::Round::MayTerminate)?;
            }
            // the back-edge array is only needed by the rounds above
            self.iedges = Vec::new();
        }

        Ok(CheckOutcome::Ok {
            states: self.arena.state_count(),
            edges: self.nr_edges,
        })
    }

    fn run_typical(&mut self) -> Step<CheckOutcome> {
        self.store_initial()?;
        let lasso = self.lasso_from(1, false)?;
        Ok(CheckOutcome::Typical {
            lasso,
            states: self.arena.state_count(),
        })
    }

    /// Stores the initial state as node 1 and checks it for safety.
    pub(crate) fn store_initial(&mut self) -> Step<()> {
        assert!(!self.started, "an explorer runs once");
        self.started = true;

        self.arena.zero_scratch();
        let mut view = self.arena.scratch_mut(self.cfg.sanity_checks);
        let nr_trans = self.model.init(&mut view).map_err(CheckError::Init)?;
        if self.cfg.symmetry {
            self.model.canonicalize(&mut view);
        }
        if let Some(msg) = view.fault() {
            return Err(CheckError::Init(ModelError::new(msg)).into());
        }
        drop(view);

        if nr_trans == u32::MAX {
            return Err(CheckError::TooManyTransitions.into());
        }
        self.nr_trans = nr_trans;

        let (ni, _) = self.arena.lookup_or_insert()?;
        debug_assert_eq!(ni, 1);

        if self.cfg.check_state {
            if let Some(msg) = self.model.check_state(self.arena.state(1)) {
                return Err(Halt::Outcome(CheckOutcome::SafetyViolation {
                    message: msg.to_string(),
                    trace: self.arena.history(1),
                }));
            }
        }
        Ok(())
    }

    /// Investigates states in breadth-first order until the queue runs
    /// dry. The queue is the node index range itself: new states are
    /// appended while the cursor advances.
    pub(crate) fn build_state_space(&mut self, pass: Pass) -> Step<()> {
        let mut stub = self
            .cfg
            .stubborn
            .then(|| StubbornCtx::new(self.nr_trans as usize));

        let mut q_first: u32 = 1;
        while (q_first as usize) < self.arena.node_count() {
            let old_edges = self.nr_edges;

            if self.cfg.show_count != 0 && (q_first as usize) % self.cfg.show_count == 0 {
                match pass {
                    Pass::Forward => info!(
                        processed = q_first,
                        stored = self.arena.state_count(),
                        "states constructed"
                    ),
                    Pass::Backward => info!(processed = q_first, "states backwards-processed"),
                }
            }

            self.arena.load_scratch(q_first);
            match stub.as_mut() {
                Some(ctx) => self.stubborn_trial(q_first, pass, ctx)?,
                None => {
                    for step in 0..self.nr_trans {
                        let tr = self.ordered(step);
                        self.try_transition(q_first, tr, pass)?;
                    }
                }
            }

            // a state that gained no outgoing edges is terminal
            if pass == Pass::Forward && old_edges == self.nr_edges && self.cfg.check_deadlock {
                if let Some(msg) = self.model.check_deadlock(self.arena.state(q_first)) {
                    return Err(Halt::Outcome(CheckOutcome::IllegalDeadlock {
                        message: msg.to_string(),
                        trace: self.arena.history(q_first),
                    }));
                }
            }

            q_first += 1;
        }
        Ok(())
    }

    /// The `step`-th transition in the configured trial order: descending
    /// by default so unusual events surface early, ascending under
    /// `try_forward`.
    #[inline]
    pub(crate) fn ordered(&self, step: u32) -> u32 {
        if self.cfg.try_forward {
            step
        } else {
            self.nr_trans - 1 - step
        }
    }

    /// Fires transition `tr` against the scratch copy of the current
    /// source state, without touching any bookkeeping. Checks the model's
    /// error channel and the sanity fault after the call.
    pub(crate) fn fire_scratch(&mut self, src: u32, tr: u32) -> Step<bool> {
        let sanity = self.cfg.sanity_checks;
        let mut view = self.arena.scratch_mut(sanity);
        let fired = self.model.fire(tr, &mut view);
        let fault = view.fault();
        let enabled = match fired {
            Ok(enabled) => enabled,
            Err(e) => {
                let message = e.0;
                return Err(self.firing_error(src, message));
            }
        };
        if let Some(msg) = fault {
            return Err(self.firing_error(src, msg.to_string()));
        }
        if !enabled {
            return Ok(false);
        }
        if self.cfg.symmetry {
            let mut view = self.arena.scratch_mut(sanity);
            self.model.canonicalize(&mut view);
            if let Some(msg) = view.fault() {
                return Err(self.firing_error(src, msg.to_string()));
            }
        }
        Ok(true)
    }

    /// One attempted firing from source `n1`. In the forward pass an
    /// enabled transition stores/extends the successor and its edge
    /// counters; in the backward pass it only records the inverse edge.
    /// Either way the scratch is restored to `n1` afterwards.
    pub(crate) fn try_transition(&mut self, n1: u32, tr: u32, pass: Pass) -> Step<bool> {
        if !self.fire_scratch(n1, tr)? {
            return Ok(false);
        }

        match pass {
            Pass::Backward => {
                let n2 = self.arena.lookup();
                debug_assert_ne!(n2, 0, "the forward pass stored every successor");
                let end = self.arena.nodes[n2 as usize].ie_end;
                self.iedges[end as usize] = n1;
                self.arena.nodes[n2 as usize].ie_end = end + 1;
            }
            Pass::Forward => {
                let (n2, was_new) = self.arena.lookup_or_insert()?;
                self.nr_edges += 1;
                self.arena.nodes[n2 as usize].e_cnt += 1;
                if was_new {
                    self.arena.nodes[n2 as usize].prev = n1;
                    if self.cfg.check_state {
                        if let Some(msg) = self.model.check_state(self.arena.state(n2)) {
                            return Err(Halt::Outcome(CheckOutcome::SafetyViolation {
                                message: msg.to_string(),
                                trace: self.arena.history(n2),
                            }));
                        }
                    }
                }
            }
        }

        self.arena.load_scratch(n1);
        Ok(true)
    }

    pub(crate) fn firing_error(&self, ni: u32, message: String) -> Halt {
        Halt::Error(CheckError::Firing {
            message,
            trace: self.arena.history(ni),
        })
    }

    pub(crate) fn stubborn_error(&self, ni: u32, message: &str) -> Halt {
        Halt::Error(CheckError::Stubborn {
            message: message.to_string(),
            trace: self.arena.history(ni),
        })
    }
}

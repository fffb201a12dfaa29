//! Configuration for a verification run.

use crate::explorer::CheckError;
use std::fmt::Write as _;

/// Selects the properties to verify, the reductions to apply, and the
/// resource knobs of a run.
///
/// Property selection and the model must agree: selecting a check the
/// model does not implement verifies a vacuous property (the default trait
/// methods report every state as good and no state as progress).
#[derive(Debug, Clone)]
pub struct Config {
    /// Verify the model's state predicate on every newly stored state.
    pub check_state: bool,
    /// Verify the model's termination predicate on every terminal state.
    pub check_deadlock: bool,
    /// Verify that a may-progress state is reachable from every state.
    pub check_may_progress: bool,
    /// Verify that every cycle and terminal state contains a must-progress
    /// state.
    pub check_must_progress: bool,
    /// Apply the model's symmetry representative function.
    pub symmetry: bool,
    /// Apply the stubborn-set reduction via the model's obligation
    /// function.
    pub stubborn: bool,
    /// Try transitions in ascending instead of descending order.
    pub try_forward: bool,
    /// Terminal states are not may-progress states by default.
    pub dl_not_may: bool,
    /// Terminal states are not must-progress states by default.
    pub dl_not_must: bool,
    /// Emit a progress line every this many processed states; 0 is quiet.
    pub show_count: usize,
    /// Abort state-space construction after this many states.
    pub stop_count: usize,
    /// log2 of the hash table size.
    pub hash_bits: u32,
    /// Catch modelling bugs (out-of-range assignments) in the hot path.
    pub sanity_checks: bool,
    /// Allow the progress infrastructure (back edges, labelling) at all.
    /// Switching this off saves memory but skips the stubborn-set
    /// soundness round as well.
    pub progress_check: bool,
    /// Informational size parameter echoed in the settings summary.
    pub size_par: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_state: false,
            check_deadlock: false,
            check_may_progress: false,
            check_must_progress: false,
            symmetry: false,
            stubborn: false,
            try_forward: false,
            dl_not_may: false,
            dl_not_must: false,
            show_count: 1000,
            stop_count: 30_000_000,
            hash_bits: 23,
            sanity_checks: true,
            progress_check: true,
            size_par: None,
        }
    }
}

impl Config {
    /// True iff at least one property class is selected.
    pub fn any_property(&self) -> bool {
        self.check_state || self.check_deadlock || self.check_may_progress || self.check_must_progress
    }

    /// Rejects a configuration with nothing to verify. Checked before a
    /// run starts; the typical-sequence entry point needs no properties
    /// and skips this.
    pub fn validate(&self) -> Result<(), CheckError> {
        if !self.any_property() {
            return Err(CheckError::NoPropertySelected);
        }
        Ok(())
    }

    /// Whether the run needs the back-edge array and progress labelling.
    /// Safety under stubborn reduction is only sound for may-terminating
    /// models, which the termination-reachability round establishes.
    pub(crate) fn progress_infra(&self) -> bool {
        self.progress_check
            && (self.check_may_progress
                || self.check_must_progress
                || (self.stubborn && self.check_state))
    }

    /// Caveats of the selected combination, to be surfaced to the user.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.stubborn && self.check_must_progress {
            out.push("Must progress is unreliable with stubborn sets");
        }
        if self.any_property()
            && !self.check_deadlock
            && !self.check_may_progress
            && !self.check_must_progress
        {
            out.push("Nothing was defined to test that the model makes progress");
        }
        out
    }

    /// One-line summary of the most important settings.
    pub fn summary(&self) -> String {
        let mut s = String::from("Settings:");
        if let Some(n) = self.size_par {
            let _ = write!(s, " size={n}");
        }
        if self.check_state {
            s.push_str(" state");
        }
        if self.check_deadlock {
            s.push_str(" dl");
        }
        if self.check_may_progress {
            s.push_str(" may");
            if self.dl_not_may {
                s.push_str("!dl");
            }
        }
        if self.check_must_progress {
            s.push_str(" must");
            if self.dl_not_must {
                s.push_str("!dl");
            }
        }
        if self.stubborn {
            s.push_str(" stubb");
        }
        if self.symmetry {
            s.push_str(" symm");
        }
        if self.try_forward {
            s.push_str(" forw");
        }
        if !self.sanity_checks {
            s.push_str(" no_sanity");
        }
        let _ = write!(s, " hash_bits={}", self.hash_bits);
        s
    }
}

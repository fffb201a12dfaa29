//! Obligation lists for the stubborn-set method.

use smallvec::SmallVec;

/// Collects the obligation list a model emits from
/// [`Model::next_stubborn`](crate::Model::next_stubborn).
///
/// A model makes at most one emitting call per invocation; a second call
/// is a modelling error the explorer reports as a stubborn-set error.
#[derive(Debug, Default)]
pub struct Obligations {
    list: SmallVec<[u32; 4]>,
    all: bool,
    called: bool,
    double_call: bool,
}

impl Obligations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stubborn set must also contain the listed transitions.
    pub fn require(&mut self, trs: impl IntoIterator<Item = u32>) {
        if self.mark_called() {
            return;
        }
        self.list = trs.into_iter().collect();
    }

    /// The stubborn set must contain every transition.
    pub fn require_all(&mut self) {
        if self.mark_called() {
            return;
        }
        self.all = true;
    }

    fn mark_called(&mut self) -> bool {
        if self.called {
            self.double_call = true;
            return true;
        }
        self.called = true;
        false
    }

    /// True iff the model asked for all transitions.
    pub fn all(&self) -> bool {
        self.all
    }

    /// The emitted list (empty when nothing or all was emitted).
    pub fn listed(&self) -> &[u32] {
        if self.all {
            &[]
        } else {
            &self.list
        }
    }

    /// True iff the model emitted more than once.
    pub fn double_called(&self) -> bool {
        self.double_call
    }
}

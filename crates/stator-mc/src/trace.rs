//! Counterexample traces: shortest histories and lasso-shaped typical
//! sequences.

use crate::explorer::{Explorer, Step};
use stator_model::{Model, StateRef};

/// A sequence of raw packed states. Render each state through the model
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trace {
    states: Vec<Box<[u32]>>,
}

impl Trace {
    pub(crate) fn new(states: Vec<Box<[u32]>>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The states in order, as read-only views.
    pub fn states(&self) -> impl Iterator<Item = StateRef<'_>> {
        self.states.iter().map(|s| StateRef::new(s))
    }

    /// View of the `i`-th state.
    pub fn state(&self, i: usize) -> StateRef<'_> {
        StateRef::new(&self.states[i])
    }
}

/// A finite stem leading into a cycle. When the walk got stuck instead of
/// looping, the cycle holds the single terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lasso {
    pub stem: Trace,
    pub cycle: Trace,
}

/// Path mark for the typical-sequence walk: `e_cnt` of 0 means a node to
/// avoid, anything else is fair game, and the mark itself flags the nodes
/// of the current path.
const PATH_MARK: u32 = u32::MAX;

impl<M: Model> Explorer<M> {
    /// Walks a typical sequence of events from `start` until the walk
    /// closes onto its own path or gets stuck, and returns the lasso.
    ///
    /// Repurposes `e_cnt` as the path mark and rebuilds `prev` along the
    /// walk, so histories must be taken before calling this. With
    /// `no_insert` the walk stays within already discovered states (used
    /// from progress verification, where nodes with `e_cnt == 0` are
    /// exactly the progress-satisfied ones to avoid); otherwise unseen
    /// successors are stored as the walk reaches them.
    ///
    /// The first closure found is reported; it is not necessarily the
    /// shortest possible cycle.
    pub(crate) fn lasso_from(&mut self, start: u32, no_insert: bool) -> Step<Lasso> {
        let mut ni = start;
        let mut nprev: u32 = 0;
        loop {
            self.arena.nodes[ni as usize].e_cnt = PATH_MARK;
            self.arena.nodes[ni as usize].prev = nprev;
            nprev = ni;
            self.arena.load_scratch(ni);

            let mut adopted = None;
            for tr in 0..self.nr_trans {
                if !self.fire_scratch(ni, tr)? {
                    continue;
                }
                let n2 = if no_insert {
                    self.arena.lookup()
                } else {
                    let (n2, was_new) = self.arena.lookup_or_insert()?;
                    if was_new {
                        self.arena.nodes[n2 as usize].e_cnt = 1;
                    }
                    n2
                };
                if n2 != 0 && self.arena.nodes[n2 as usize].e_cnt != 0 {
                    adopted = Some(n2);
                    break;
                }
                // dead end; restore the source and try the next transition
                self.arena.load_scratch(ni);
            }

            match adopted {
                Some(n2) if self.arena.nodes[n2 as usize].e_cnt == PATH_MARK => {
                    // closed onto the current path: n2 enters the cycle
                    ni = n2;
                    break;
                }
                Some(n2) => ni = n2,
                // every transition is disabled or leads to an avoided
                // state: the lasso ends in this state instead of a cycle
                None => break,
            }
        }

        // everything strictly before the loop entry is the stem; cutting
        // the entry's prev link frees the cycle for a second prev walk
        let stem = self.arena.history(self.arena.nodes[ni as usize].prev);
        self.arena.nodes[ni as usize].prev = 0;
        let cycle = self.arena.history(nprev);
        Ok(Lasso { stem, cycle })
    }
}

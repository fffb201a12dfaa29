//! Reverse-edge materialisation and backward progress labelling.
//!
//! After forward construction, `e_cnt` of every node holds its in-degree.
//! The back-edge array is laid out by a counting sort over those counts,
//! then filled by replaying the exploration in recording mode. The
//! progress rounds reuse `e_cnt` as an open-obligation counter and
//! back-propagate "satisfied" along the inverse edges: an initial count of
//! one makes the obligation existential (any satisfied successor
//! discharges it), the out-degree makes it universal.

use crate::explorer::{CheckError, CheckOutcome, Explorer, Halt, Pass, Step};
use stator_model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Round {
    /// From every state some may-progress state is reachable.
    May,
    /// Every cycle and terminal state contains a must-progress state.
    Must,
    /// From every state some terminal state is reachable; soundness check
    /// for the stubborn-set reduction.
    MayTerminate,
}

impl<M: Model> Explorer<M> {
    /// Builds the incoming-edge array by replaying the exploration in
    /// recording mode. Afterwards node `ni`'s incoming edges sit in
    /// `iedges[nodes[ni-1].ie_end .. nodes[ni].ie_end]`.
    pub(crate) fn construct_input_edges(&mut self) -> Step<()> {
        if self.nr_edges > u32::MAX as u64 {
            return Err(CheckError::EdgeOverflow {
                edges: self.nr_edges,
            }
            .into());
        }
        self.iedges = vec![0u32; self.nr_edges as usize];

        // running sums over the in-degrees counted by the forward pass;
        // each node's ie_end starts at the beginning of its slice and the
        // recording pass advances it to the end
        for ni in 2..self.arena.node_count() {
            self.arena.nodes[ni].ie_end =
                self.arena.nodes[ni - 1].ie_end + self.arena.nodes[ni - 1].e_cnt;
        }

        self.build_state_space(Pass::Backward)
    }

    /// One backward-labelling round. Any node left with an open obligation
    /// violates the round's property; the first one (by index) is reported
    /// with its history and a typical sequence.
    pub(crate) fn verify_progress(&mut self, round: Round) -> Step<()> {
        let node_count = self.arena.node_count();

        for ni in 1..node_count {
            self.arena.nodes[ni].e_cnt = 0;
        }
        match round {
            // the obligation of a node is its whole successor set
            Round::Must => {
                for i in 0..self.iedges.len() {
                    let src = self.iedges[i] as usize;
                    self.arena.nodes[src].e_cnt += 1;
                }
            }
            // one satisfied successor suffices; terminals start satisfied
            Round::May | Round::MayTerminate => {
                for i in 0..self.iedges.len() {
                    let src = self.iedges[i] as usize;
                    self.arena.nodes[src].e_cnt = 1;
                }
            }
        }

        match round {
            Round::May => {
                for ni in 1..node_count {
                    if self.cfg.dl_not_may && self.arena.nodes[ni].e_cnt == 0 {
                        self.arena.nodes[ni].e_cnt = 1;
                    }
                    if self.arena.nodes[ni].e_cnt != 0
                        && self.model().is_may_progress(self.arena.state(ni as u32))
                    {
                        self.arena.nodes[ni].e_cnt = 0;
                    }
                }
            }
            Round::Must => {
                for ni in 1..node_count {
                    if self.cfg.dl_not_must && self.arena.nodes[ni].e_cnt == 0 {
                        self.arena.nodes[ni].e_cnt = 1;
                    }
                    if self.arena.nodes[ni].e_cnt != 0
                        && self.model().is_must_progress(self.arena.state(ni as u32))
                    {
                        self.arena.nodes[ni].e_cnt = 0;
                    }
                }
            }
            // terminals themselves are the targets
            Round::MayTerminate => {}
        }

        self.backward_wave();

        for ni in 1..node_count {
            if self.arena.nodes[ni].e_cnt != 0 {
                // the approach must be snapshotted before the lasso walk
                // rewrites the prev chain
                let approach = self.arena.history(self.arena.nodes[ni].prev);
                let lasso = self.lasso_from(ni as u32, true)?;
                let outcome = match round {
                    Round::May => CheckOutcome::MayProgressViolation { approach, lasso },
                    Round::Must => CheckOutcome::MustProgressViolation { approach, lasso },
                    Round::MayTerminate => {
                        CheckOutcome::TerminationUnreachable { approach, lasso }
                    }
                };
                return Err(Halt::Outcome(outcome));
            }
        }
        Ok(())
    }

    /// Back-propagates "an obligation-free node is reachable" along the
    /// inverse edges. The worklist is threaded through `p_next` and
    /// treated as a stack: a node whose count hits zero is spliced in
    /// right behind the cursor.
    fn backward_wave(&mut self) {
        let mut p_list: u32 = 0;
        for ni in 1..self.arena.node_count() {
            if self.arena.nodes[ni].e_cnt == 0 {
                self.arena.nodes[ni].p_next = p_list;
                p_list = ni as u32;
            }
        }

        let mut cur = p_list;
        while cur != 0 {
            let beg = self.arena.nodes[cur as usize - 1].ie_end as usize;
            let end = self.arena.nodes[cur as usize].ie_end as usize;
            for ei in beg..end {
                let src = self.iedges[ei] as usize;
                if self.arena.nodes[src].e_cnt != 0 {
                    self.arena.nodes[src].e_cnt -= 1;
                    if self.arena.nodes[src].e_cnt == 0 {
                        self.arena.nodes[src].p_next = self.arena.nodes[cur as usize].p_next;
                        self.arena.nodes[cur as usize].p_next = src as u32;
                    }
                }
            }
            cur = self.arena.nodes[cur as usize].p_next;
        }
    }
}

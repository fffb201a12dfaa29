//! Stubborn-set selection: an iterative strongly-connected-component
//! search over the model's transition-obligation graph.
//!
//! A stubborn set must be closed under the obligation relation, so each
//! strongly connected region of the obligation graph is chosen or rejected
//! atomically. The search fires the first completed component that
//! contains an enabled transition; firing all its enabled members yields a
//! valid stubborn set that tends to be small.

use crate::explorer::{Explorer, Pass, Step};
use smallvec::SmallVec;
use stator_model::{Model, Obligations};

const NONE: u32 = u32::MAX;

/// Cached obligation answer of one transition within the current source
/// state.
enum Neighbours {
    Unasked,
    List(SmallVec<[u32; 4]>),
    All,
}

/// Working buffers for stubborn-set construction, allocated once per
/// exploration pass and reused for every source state.
pub(crate) struct StubbornCtx {
    /// Stamp of the source state in which each transition was last
    /// entered. Bumping the stamp invalidates the whole array at once; on
    /// wrap-around it is cleared for real.
    found: Vec<u32>,
    stamp: u32,
    /// Cached obligation lists, valid while `found` carries the current
    /// stamp.
    nbrs: Vec<Neighbours>,
    /// Next unconsumed obligation neighbour per transition.
    cursor: Vec<u32>,
    /// Depth-first stack of in-progress transitions.
    dfs: Vec<u32>,
    /// Component stack in visiting order.
    scc: Vec<u32>,
    /// Lowlink (position in `scc`) per transition; `NONE` once its
    /// component has been finalised.
    min: Vec<u32>,
}

impl StubbornCtx {
    pub fn new(nr_trans: usize) -> Self {
        Self {
            found: vec![0; nr_trans],
            stamp: 0,
            nbrs: (0..nr_trans).map(|_| Neighbours::Unasked).collect(),
            cursor: vec![0; nr_trans],
            dfs: Vec::with_capacity(nr_trans),
            scc: Vec::with_capacity(nr_trans),
            min: vec![0; nr_trans],
        }
    }

    fn begin_state(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.found.fill(0);
            self.stamp = 1;
        }
    }

    fn seen(&self, tr: u32) -> bool {
        self.found[tr as usize] == self.stamp
    }

    /// Enter a transition: stamp it, invalidate its obligation cache, and
    /// push it on both stacks with its own position as lowlink.
    fn enter(&mut self, tr: u32) {
        self.found[tr as usize] = self.stamp;
        self.nbrs[tr as usize] = Neighbours::Unasked;
        self.cursor[tr as usize] = 0;
        self.min[tr as usize] = self.scc.len() as u32;
        self.dfs.push(tr);
        self.scc.push(tr);
    }
}

impl<M: Model> Explorer<M> {
    /// Tries the transitions of source state `q_first` as starting points
    /// of stubborn sets, in the configured order, until one completed
    /// component fires.
    pub(crate) fn stubborn_trial(
        &mut self,
        q_first: u32,
        pass: Pass,
        ctx: &mut StubbornCtx,
    ) -> Step<()> {
        ctx.begin_state();
        let mut some_fired = false;

        'starts: for step in 0..self.nr_trans {
            let start = self.ordered(step);
            if ctx.seen(start) {
                continue;
            }
            ctx.dfs.clear();
            ctx.scc.clear();
            ctx.enter(start);

            while let Some(&t1) = ctx.dfs.last() {
                let low1 = ctx.min[t1 as usize];
                match self.next_obligation(q_first, t1, ctx)? {
                    // neighbours exhausted: pop, and either finalise a
                    // component or propagate the lowlink to the parent
                    None => {
                        ctx.dfs.pop();
                        if ctx.scc[low1 as usize] == t1 {
                            for ii in low1 as usize..ctx.scc.len() {
                                let member = ctx.scc[ii];
                                ctx.min[member as usize] = NONE;
                                some_fired |= self.try_transition(q_first, member, pass)?;
                            }
                            if some_fired {
                                // the component produced successors; the
                                // stubborn set of this state is done
                                break 'starts;
                            }
                            ctx.scc.truncate(low1 as usize);
                        } else if let Some(&parent) = ctx.dfs.last() {
                            if ctx.min[parent as usize] > low1 {
                                ctx.min[parent as usize] = low1;
                            }
                        }
                    }
                    Some(t2) if !ctx.seen(t2) => ctx.enter(t2),
                    // already on a stack (or finalised, in which case the
                    // lowlink is NONE and no relaxation happens)
                    Some(t2) => {
                        let low2 = ctx.min[t2 as usize];
                        if low1 > low2 {
                            ctx.min[t1 as usize] = low2;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The next unconsumed obligation neighbour of `t1`, asking the model
    /// once per source state and iterating the cached answer.
    fn next_obligation(
        &mut self,
        q_first: u32,
        t1: u32,
        ctx: &mut StubbornCtx,
    ) -> Step<Option<u32>> {
        if matches!(ctx.nbrs[t1 as usize], Neighbours::Unasked) {
            let mut obl = Obligations::new();
            self.model()
                .next_stubborn(t1, self.arena.state(q_first), &mut obl);
            if obl.double_called() {
                return Err(self.stubborn_error(q_first, "obligations emitted twice for one transition"));
            }
            ctx.nbrs[t1 as usize] = if obl.all() {
                Neighbours::All
            } else {
                let list: SmallVec<[u32; 4]> = obl.listed().iter().copied().collect();
                for (i, &t) in list.iter().enumerate() {
                    if t >= self.nr_trans {
                        return Err(
                            self.stubborn_error(q_first, "obligation names a nonexistent transition")
                        );
                    }
                    if list[..i].contains(&t) {
                        return Err(
                            self.stubborn_error(q_first, "same transition twice in an obligation list")
                        );
                    }
                }
                Neighbours::List(list)
            };
        }

        let cur = ctx.cursor[t1 as usize];
        let next = match &ctx.nbrs[t1 as usize] {
            Neighbours::All => (cur < self.nr_trans).then_some(cur),
            Neighbours::List(list) => list.get(cur as usize).copied(),
            Neighbours::Unasked => unreachable!(),
        };
        if next.is_some() {
            ctx.cursor[t1 as usize] = cur + 1;
        }
        Ok(next)
    }
}

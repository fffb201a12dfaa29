//! The wolf, sheep, and cabbage river-crossing puzzle.
//!
//! Three passengers and a man start on the left bank of a river. The boat
//! carries the man and at most one passenger. The wolf must never be left
//! alone with the sheep, nor the sheep with the cabbage. Finding the
//! crossing schedule is phrased as a safety violation: the checker's
//! shortest counterexample to "not everything is on the right bank" is the
//! solution.

use stator_model::{LayoutBuilder, LayoutError, Model, ModelError, StateMut, StateRef, StateVar};

/// Positions cycle through 0 = left bank, 1 = boat heading right,
/// 2 = right bank, 3 = boat heading left.
pub struct Wgc {
    pub man: StateVar,
    pub wolf: StateVar,
    pub sheep: StateVar,
    pub cabb: StateVar,
}

impl Wgc {
    pub fn new(b: &mut LayoutBuilder) -> Result<Self, LayoutError> {
        Ok(Self {
            man: b.var(2)?,
            wolf: b.var(2)?,
            sheep: b.var(2)?,
            cabb: b.var(2)?,
        })
    }

    /// One step along the left bank / boat / right bank cycle.
    fn advance(s: &mut StateMut<'_>, var: StateVar) {
        let v = s.get(var);
        s.set(var, if v < 3 { v + 1 } else { 0 });
    }

    fn occupants(&self, s: StateRef<'_>, place: u32) -> String {
        let mut out = String::new();
        out.push(if s.get(self.man) == place { 'M' } else { ' ' });
        out.push(if s.get(self.wolf) == place { 'W' } else { ' ' });
        out.push(if s.get(self.sheep) == place { 'S' } else { ' ' });
        out.push(if s.get(self.cabb) == place { 'C' } else { ' ' });
        out
    }
}

impl Model for Wgc {
    fn init(&mut self, _state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        Ok(4)
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        let mut line = self.occupants(s, 0);
        match s.get(self.man) {
            1 => {
                line.push_str(" |> ");
                line.push_str(&self.occupants(s, 1));
                line.push_str(" >| ");
            }
            3 => {
                line.push_str(" |< ");
                line.push_str(&self.occupants(s, 3));
                line.push_str(" <| ");
            }
            _ => line.push_str(" |        | "),
        }
        line.push_str(&self.occupants(s, 2));
        line
    }

    /// The enabling conditions encode that whatever is with the man cannot
    /// eat or be eaten, whatever are in different places cannot eat each
    /// other, and the man cannot leave anything alone on the boat.
    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        let man = s.get(self.man);
        let wolf = s.get(self.wolf);
        let sheep = s.get(self.sheep);
        let cabb = s.get(self.cabb);
        let fired = match tr {
            // the man moves alone; odd positions mean "on the boat"
            0 => {
                if wolf != sheep
                    && sheep != cabb
                    && wolf % 2 == 0
                    && sheep % 2 == 0
                    && cabb % 2 == 0
                {
                    Self::advance(s, self.man);
                    true
                } else {
                    false
                }
            }
            // the man moves with the wolf
            1 => {
                if man == wolf && sheep != cabb {
                    Self::advance(s, self.man);
                    Self::advance(s, self.wolf);
                    true
                } else {
                    false
                }
            }
            // the man moves with the sheep
            2 => {
                if man == sheep {
                    Self::advance(s, self.man);
                    Self::advance(s, self.sheep);
                    true
                } else {
                    false
                }
            }
            // the man moves with the cabbage
            3 => {
                if man == cabb && wolf != sheep {
                    Self::advance(s, self.man);
                    Self::advance(s, self.cabb);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        Ok(fired)
    }

    /// Not an eating check: flags the solved configuration so the
    /// counterexample trace is the schedule.
    fn check_state(&self, s: StateRef<'_>) -> Option<&'static str> {
        if s.get(self.wolf) == 2 && s.get(self.sheep) == 2 && s.get(self.cabb) == 2 {
            Some("All on the right bank!")
        } else {
            None
        }
    }
}

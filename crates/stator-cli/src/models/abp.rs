//! The alternating bit protocol with failure and recovery, over two lossy
//! FIFO channels of configurable capacity.
//!
//! Five components: client, sender, data channel, receiver, and ack
//! channel, plus two losers that may drop the head of either channel at
//! any time, and a stopper that lets the sender terminate for good.
//! Instead of retransmitting, the sender reports failure when an
//! acknowledgement does not arrive; before the next data message it sends
//! a flush message and waits for its acknowledgement, so sender and
//! receiver re-agree on the alternating bit.
//!
//! With message auditing on, the client records what is in transit and the
//! receiver checks every delivery against it.

use std::fmt::Write as _;
use stator_model::{
    LayoutBuilder, LayoutError, Model, ModelError, Obligations, StateMut, StateRef, StateVar,
};

/// Channel cell contents: 0 = empty, then the message kinds.
const MSG_NONE: u32 = 0;
const MSG_FLUSH: u32 = 3;

fn msg_char(kind: u32) -> char {
    match kind {
        1 => 'N',
        2 => 'Y',
        3 => 'F',
        _ => ' ',
    }
}

pub struct Abp {
    n: u32,
    /// Whether channel-cell transitions exist at all (capacity > 1).
    chn: bool,
    check_out: bool,
    /// Client bookkeeping: content of the most recent send (0 = none,
    /// 1 = N, 2 = Y) and remnant flags for messages lost to failures.
    pub cc: StateVar,
    pub cn: StateVar,
    pub cy: StateVar,
    /// Sender control, message, and alternating bit.
    pub sc: StateVar,
    pub sm: StateVar,
    pub sb: StateVar,
    /// Receiver control, message, and alternating bit.
    pub rc: StateVar,
    pub rm: StateVar,
    pub rb: StateVar,
    /// Data channel cells (content and bit), index 0 is the head.
    pub dc: Vec<StateVar>,
    pub db: Vec<StateVar>,
    /// Ack channel cells (presence and bit), index 0 is the head.
    pub ac: Vec<StateVar>,
    pub ab: Vec<StateVar>,
}

impl Abp {
    pub fn new(b: &mut LayoutBuilder, n: u32, check_out: bool) -> Result<Self, LayoutError> {
        assert!(n >= 1, "channel capacity must be at least 1");
        Ok(Self {
            n,
            chn: n > 1,
            check_out,
            cc: b.var(2)?,
            cn: b.var(1)?,
            cy: b.var(1)?,
            sc: b.var(3)?,
            sm: b.var(1)?,
            sb: b.var(1)?,
            rc: b.var(2)?,
            rm: b.var(1)?,
            rb: b.var(1)?,
            dc: (0..n).map(|_| b.var(2)).collect::<Result<_, _>>()?,
            db: (0..n).map(|_| b.var(1)).collect::<Result<_, _>>()?,
            ac: (0..n).map(|_| b.var(1)).collect::<Result<_, _>>()?,
            ab: (0..n).map(|_| b.var(1)).collect::<Result<_, _>>()?,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.n
    }

    pub fn transition_count(&self) -> u32 {
        // sender x2, receiver, two losers, the cell moves of both
        // channels, and the stopper
        2 * self.n + 4
    }

    fn last(&self) -> usize {
        self.n as usize - 1
    }

    /// Sender main line: send N, flush, wait for acks, deliver data.
    fn fire_sender(&self, s: &mut StateMut<'_>) -> bool {
        match s.get(self.sc) {
            0 => {
                if self.check_out {
                    s.set(self.cc, 1);
                }
                s.set(self.sm, 0);
                s.set(self.sc, 1);
                true
            }
            1 => {
                if s.get(self.dc[self.last()]) != MSG_NONE {
                    return false;
                }
                s.set(self.dc[self.last()], MSG_FLUSH);
                s.set(self.db[self.last()], s.get(self.sb));
                s.set(self.sc, 2);
                true
            }
            2 | 4 => {
                if s.get(self.ac[0]) == 0 {
                    return false;
                }
                if s.get(self.sb) == s.get(self.ab[0]) {
                    s.set(self.sb, 1 - s.get(self.sb));
                    s.set(self.sc, if s.get(self.sc) == 2 { 3 } else { 5 });
                }
                s.set(self.ac[0], 0);
                s.set(self.ab[0], 0);
                true
            }
            3 => {
                if s.get(self.dc[self.last()]) != MSG_NONE {
                    return false;
                }
                s.set(self.dc[self.last()], s.get(self.sm) + 1);
                s.set(self.db[self.last()], s.get(self.sb));
                s.set(self.sc, 4);
                s.set(self.sm, 0);
                true
            }
            5 => {
                s.set(self.sc, 6);
                s.set(self.cc, 0);
                s.set(self.cn, 0);
                s.set(self.cy, 0);
                true
            }
            6 => {
                if self.check_out {
                    s.set(self.cc, 1);
                }
                s.set(self.sm, 0);
                s.set(self.sc, 3);
                true
            }
            _ => false,
        }
    }

    /// Sender alternatives: send Y instead of N, or time out and report
    /// failure.
    fn fire_sender_alt(&self, s: &mut StateMut<'_>) -> bool {
        match s.get(self.sc) {
            0 => {
                if self.check_out {
                    s.set(self.cc, 2);
                }
                s.set(self.sm, 1);
                s.set(self.sc, 1);
                true
            }
            2 | 4 => {
                if self.check_out {
                    if s.get(self.cc) == 1 {
                        s.set(self.cn, 1);
                    } else {
                        s.set(self.cy, 1);
                    }
                }
                s.set(self.cc, 0);
                s.set(self.sm, 0);
                s.set(self.sc, 0);
                true
            }
            6 => {
                if self.check_out {
                    s.set(self.cc, 2);
                }
                s.set(self.sm, 1);
                s.set(self.sc, 3);
                true
            }
            _ => false,
        }
    }

    fn fire_receiver(&self, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        match s.get(self.rc) {
            0 => {
                let head = s.get(self.dc[0]);
                if head == MSG_NONE {
                    return Ok(false);
                }
                if head < MSG_FLUSH && s.get(self.db[0]) == s.get(self.rb) {
                    s.set(self.rm, head - 1);
                    s.set(self.rc, 1);
                } else {
                    s.set(self.rb, s.get(self.db[0]));
                    s.set(self.rc, 2);
                }
                s.set(self.dc[0], 0);
                s.set(self.db[0], 0);
                Ok(true)
            }
            1 => {
                if self.check_out {
                    let rm = s.get(self.rm);
                    if (s.get(self.cn) != 0 && rm == 0) || (s.get(self.cy) != 0 && rm == 1) {
                        s.set(self.cn, 0);
                        s.set(self.cy, 0);
                    } else if rm + 1 == s.get(self.cc) {
                        s.set(self.cc, 0);
                        s.set(self.cn, 0);
                        s.set(self.cy, 0);
                    } else {
                        return Err(ModelError::new("This should be impossible"));
                    }
                }
                s.set(self.rc, 2);
                s.set(self.rm, 0);
                Ok(true)
            }
            2 => {
                if s.get(self.ac[self.last()]) != 0 {
                    return Ok(false);
                }
                s.set(self.ac[self.last()], 1);
                s.set(self.ab[self.last()], s.get(self.rb));
                s.set(self.rc, 0);
                s.set(self.rb, 1 - s.get(self.rb));
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Model for Abp {
    fn init(&mut self, _state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        tracing::debug!(
            capacity = self.n,
            check_out = self.check_out,
            "alternating bit protocol"
        );
        Ok(self.transition_count())
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        let mut out = String::new();
        out.push(msg_char(s.get(self.cc)));
        out.push(if s.get(self.cn) != 0 { 'N' } else { ' ' });
        out.push(if s.get(self.cy) != 0 { 'Y' } else { ' ' });
        let sc = s.get(self.sc);
        let _ = write!(
            out,
            " {}{}{} ",
            sc,
            s.get(self.sb),
            msg_char(if (1..4).contains(&sc) { s.get(self.sm) + 1 } else { 0 })
        );
        for i in (0..self.n as usize).rev() {
            if s.get(self.dc[i]) != MSG_NONE {
                let _ = write!(out, "{}{}", msg_char(s.get(self.dc[i])), s.get(self.db[i]));
            } else {
                out.push_str("  ");
            }
        }
        let rc = s.get(self.rc);
        let _ = write!(
            out,
            " {}{}{} ",
            rc,
            s.get(self.rb),
            msg_char(if rc == 1 { s.get(self.rm) + 1 } else { 0 })
        );
        for i in (0..self.n as usize).rev() {
            if s.get(self.ac[i]) != 0 {
                let _ = write!(out, "{}", s.get(self.ab[i]));
            } else {
                out.push(' ');
            }
        }
        out
    }

    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        let n = self.n;
        let fired = match tr {
            0 => self.fire_sender(s),
            1 => self.fire_sender_alt(s),
            2 => return self.fire_receiver(s),
            // data loser: the head of a non-empty data channel vanishes
            3 => {
                if s.get(self.dc[0]) != MSG_NONE {
                    s.set(self.dc[0], 0);
                    s.set(self.db[0], 0);
                    true
                } else {
                    false
                }
            }
            // ack loser
            4 => {
                if s.get(self.ac[0]) != 0 {
                    s.set(self.ac[0], 0);
                    s.set(self.ab[0], 0);
                    true
                } else {
                    false
                }
            }
            // data channel: cell i advances to the empty cell i-1
            t if t < n + 4 => {
                let i = (t - 4) as usize;
                if s.get(self.dc[i]) == MSG_NONE || s.get(self.dc[i - 1]) != MSG_NONE {
                    false
                } else {
                    s.set(self.dc[i - 1], s.get(self.dc[i]));
                    s.set(self.dc[i], 0);
                    s.set(self.db[i - 1], s.get(self.db[i]));
                    s.set(self.db[i], 0);
                    true
                }
            }
            // ack channel
            t if t < 2 * n + 3 => {
                let i = (t - n - 3) as usize;
                if s.get(self.ac[i]) == 0 || s.get(self.ac[i - 1]) != 0 {
                    false
                } else {
                    s.set(self.ac[i - 1], 1);
                    s.set(self.ac[i], 0);
                    s.set(self.ab[i - 1], s.get(self.ab[i]));
                    s.set(self.ab[i], 0);
                    true
                }
            }
            // stopper: the sender may quit between rounds
            t if t == 2 * n + 3 => {
                if matches!(s.get(self.sc), 0 | 6) {
                    s.set(self.sc, 7);
                    s.set(self.sb, 0);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        Ok(fired)
    }

    fn check_state(&self, s: StateRef<'_>) -> Option<&'static str> {
        if !self.check_out || s.get(self.rc) != 1 {
            return None;
        }
        if s.get(self.cc) == 0 && s.get(self.cn) == 0 && s.get(self.cy) == 0 {
            return Some("Unexpected message");
        }
        let rm = s.get(self.rm);
        if rm + 1 == s.get(self.cc) {
            return None;
        }
        if (s.get(self.cn) != 0 && rm == 0) || (s.get(self.cy) != 0 && rm == 1) {
            return None;
        }
        Some("Wrong message")
    }

    fn check_deadlock(&self, s: StateRef<'_>) -> Option<&'static str> {
        if s.get(self.sc) == 7
            && s.get(self.sm) == 0
            && s.get(self.rc) == 0
            && s.get(self.rm) == 0
            && s.get(self.dc[0]) == 0
            && s.get(self.db[0]) == 0
            && s.get(self.ac[0]) == 0
            && s.get(self.ab[0]) == 0
            && s.get(self.cc) == 0
        {
            None
        } else {
            Some("Unexpected termination")
        }
    }

    fn is_may_progress(&self, s: StateRef<'_>) -> bool {
        if self.check_out {
            s.get(self.rc) == 1
                && s.get(self.rm) + 1 == s.get(self.cc)
                && s.get(self.cn) == 0
                && s.get(self.cy) == 0
        } else {
            s.get(self.rc) == 1
        }
    }

    fn is_must_progress(&self, s: StateRef<'_>) -> bool {
        s.get(self.sc) == 0
    }

    fn next_stubborn(&self, tr: u32, s: StateRef<'_>, obl: &mut Obligations) {
        let n = self.n;
        let stopper = 2 * n + 3;
        if tr == 0 {
            match s.get(self.sc) {
                0 | 6 => obl.require([1, 2, stopper]),
                1 | 3 => {
                    if s.get(self.dc[self.last()]) != MSG_NONE {
                        if self.chn {
                            obl.require([n + 3]);
                        } else {
                            obl.require([2, 3]);
                        }
                    }
                }
                2 | 4 => {
                    if s.get(self.ac[0]) != 0 {
                        obl.require([1, 4]);
                    } else if self.chn {
                        obl.require([n + 4]);
                    } else {
                        obl.require([2]);
                    }
                }
                5 => obl.require([2]),
                _ => {}
            }
        } else if tr == 1 {
            match s.get(self.sc) {
                0 | 2 | 4 | 6 => obl.require([0, 2]),
                _ => obl.require([0]),
            }
        } else if tr == 2 {
            match s.get(self.rc) {
                0 => {
                    if s.get(self.dc[0]) != MSG_NONE {
                        obl.require([3]);
                    } else if self.chn {
                        obl.require([5]);
                    } else {
                        obl.require([0]);
                    }
                }
                1 => obl.require([0, 1]),
                2 => {
                    if s.get(self.ac[self.last()]) != 0 {
                        if self.chn {
                            obl.require([2 * n + 2]);
                        } else {
                            obl.require([0, 4]);
                        }
                    }
                }
                _ => {}
            }
        } else if tr == 3 {
            if s.get(self.dc[0]) != MSG_NONE {
                obl.require([2]);
            } else if self.chn {
                obl.require([5]);
            } else {
                obl.require([0]);
            }
        } else if tr == 4 {
            if s.get(self.ac[0]) != 0 {
                obl.require([0]);
            } else if self.chn {
                obl.require([n + 4]);
            } else {
                obl.require([2]);
            }
        } else if tr < n + 4 {
            let i = (tr - 4) as usize;
            if s.get(self.dc[i]) == MSG_NONE {
                if tr < n + 3 {
                    obl.require([tr + 1]);
                } else {
                    obl.require([0]);
                }
            } else if s.get(self.dc[i - 1]) != MSG_NONE {
                if tr > 5 {
                    obl.require([tr - 1]);
                } else {
                    obl.require([2, 3]);
                }
            }
        } else if tr < 2 * n + 3 {
            let i = (tr - n - 3) as usize;
            if s.get(self.ac[i]) == 0 {
                if tr < 2 * n + 2 {
                    obl.require([tr + 1]);
                } else {
                    obl.require([2]);
                }
            } else if s.get(self.ac[i - 1]) != 0 {
                if tr > n + 4 {
                    obl.require([tr - 1]);
                } else {
                    obl.require([0, 4]);
                }
            }
        } else {
            obl.require([0]);
        }
    }
}

//! A lossy-channel banking system: an ATM withdraws from an account held
//! by a bank, talking over two channels that may drop messages.
//!
//! The safety property says the client never loses money for good: once
//! both parties are idle, balance plus dispensed cash covers the original
//! balance. May progress holds in the idle configuration.

use std::fmt::Write as _;
use stator_model::{LayoutBuilder, LayoutError, Model, ModelError, StateMut, StateRef, StateVar};

const ORIGINAL_BALANCE: u32 = 200;

/// Transition numbers; the lossy channels model the unusual events and
/// sit at the top so they are tried first.
const ATM_1: u32 = 0;
const ATM_2: u32 = 1;
const BANK_1: u32 = 2;
const BANK_2: u32 = 3;
const CH1_LOSS: u32 = 4;
const CH2_LOSS: u32 = 5;
const NR_TRANS: u32 = 6;

/// Message tags on the request channel.
const QUERY: u32 = 1;
const DONE: u32 = 2;

/// Message tags on the reply channel.
const GRANT: u32 = 1;
const REFUSE: u32 = 2;

pub struct Bank {
    pub atm: StateVar,
    pub x: StateVar,
    pub ch1: StateVar,
    pub y: StateVar,
    pub ch2: StateVar,
    pub w: StateVar,
    pub bank: StateVar,
    pub z: StateVar,
    pub b: StateVar,
    pub cash: StateVar,
}

impl Bank {
    pub fn new(builder: &mut LayoutBuilder) -> Result<Self, LayoutError> {
        Ok(Self {
            atm: builder.byte()?,
            x: builder.byte()?,
            ch1: builder.byte()?,
            y: builder.byte()?,
            ch2: builder.byte()?,
            w: builder.byte()?,
            bank: builder.byte()?,
            z: builder.byte()?,
            b: builder.byte()?,
            cash: builder.byte()?,
        })
    }

    fn send_ch1(&self, s: &mut StateMut<'_>, tag: u32, val: u32) -> bool {
        if s.get(self.ch1) != 0 {
            return false;
        }
        s.set(self.ch1, tag);
        s.set(self.y, val);
        true
    }

    fn recv_ch1(&self, s: &mut StateMut<'_>, tag: u32) -> Option<u32> {
        if s.get(self.ch1) != tag {
            return None;
        }
        let val = s.get(self.y);
        s.set(self.y, 0);
        s.set(self.ch1, 0);
        Some(val)
    }

    fn send_ch2_grant(&self, s: &mut StateMut<'_>, val: u32) -> bool {
        if s.get(self.ch2) != 0 {
            return false;
        }
        s.set(self.ch2, GRANT);
        s.set(self.w, val);
        true
    }

    fn send_ch2_refuse(&self, s: &mut StateMut<'_>) -> bool {
        if s.get(self.ch2) != 0 {
            return false;
        }
        s.set(self.ch2, REFUSE);
        true
    }

    fn recv_ch2_grant(&self, s: &mut StateMut<'_>) -> Option<u32> {
        if s.get(self.ch2) != GRANT {
            return None;
        }
        let val = s.get(self.w);
        s.set(self.w, 0);
        s.set(self.ch2, 0);
        Some(val)
    }

    fn recv_ch2_refuse(&self, s: &mut StateMut<'_>) -> bool {
        if s.get(self.ch2) != REFUSE {
            return false;
        }
        s.set(self.ch2, 0);
        true
    }

    fn fire_atm_1(&self, s: &mut StateMut<'_>) -> bool {
        match s.get(self.atm) {
            0 => {
                s.set(self.atm, 1);
                true
            }
            1 => {
                s.set(self.x, 20);
                s.set(self.atm, 2);
                true
            }
            2 => {
                let x = s.get(self.x);
                if self.send_ch1(s, QUERY, x) {
                    s.set(self.x, 0);
                    s.set(self.atm, 3);
                    true
                } else {
                    false
                }
            }
            3 => {
                if let Some(val) = self.recv_ch2_grant(s) {
                    s.set(self.x, val);
                    s.set(self.atm, 4);
                    true
                } else if self.recv_ch2_refuse(s) {
                    s.set(self.atm, 6);
                    true
                } else {
                    false
                }
            }
            4 => {
                s.set(self.atm, 5);
                true
            }
            5 => {
                // the dispenser tray is byte-wide; anything more stays in
                let cash = s.get(self.cash);
                let x = s.get(self.x);
                if cash + x < 256 {
                    s.set(self.cash, cash + x);
                }
                s.set(self.atm, 8);
                true
            }
            6 => {
                s.set(self.atm, 7);
                true
            }
            7 => {
                s.set(self.atm, 0);
                true
            }
            8 => {
                let x = s.get(self.x);
                if self.send_ch1(s, DONE, x) {
                    s.set(self.x, 0);
                    s.set(self.atm, 0);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn fire_atm_2(&self, s: &mut StateMut<'_>) -> bool {
        match s.get(self.atm) {
            1 => {
                s.set(self.x, 50);
                s.set(self.atm, 2);
                true
            }
            3 => {
                s.set(self.atm, 7);
                true
            }
            _ => false,
        }
    }

    fn fire_bank_1(&self, s: &mut StateMut<'_>) -> bool {
        match s.get(self.bank) {
            0 => {
                if let Some(val) = self.recv_ch1(s, QUERY) {
                    s.set(self.z, val);
                    s.set(self.bank, 1);
                    true
                } else {
                    false
                }
            }
            1 => {
                let z = s.get(self.z);
                let b = s.get(self.b);
                if z > b && self.send_ch2_refuse(s) {
                    s.set(self.z, 0);
                    s.set(self.bank, 0);
                    true
                } else if z <= b && self.send_ch2_grant(s, z) {
                    s.set(self.bank, 2);
                    true
                } else {
                    false
                }
            }
            2 => {
                if let Some(val) = self.recv_ch1(s, DONE) {
                    s.set(self.z, val);
                    s.set(self.bank, 3);
                    true
                } else {
                    false
                }
            }
            3 => {
                let z = s.get(self.z);
                let b = s.get(self.b);
                s.set(self.b, if b > z { b - z } else { 0 });
                s.set(self.z, 0);
                s.set(self.bank, 0);
                true
            }
            _ => false,
        }
    }

    fn opt_val(out: &mut String, cond: bool, val: u32) {
        if cond {
            let _ = write!(out, "{val}");
        } else {
            out.push_str("  ");
        }
    }
}

impl Model for Bank {
    fn init(&mut self, state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        state.set(self.b, ORIGINAL_BALANCE);
        Ok(NR_TRANS)
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, "A= {} ", s.get(self.atm));
        Self::opt_val(&mut out, matches!(s.get(self.atm), 2 | 4 | 5), s.get(self.x));
        out.push_str("  CH1= ");
        match s.get(self.ch1) {
            QUERY => {
                let _ = write!(out, "q{}", s.get(self.y));
            }
            DONE => {
                let _ = write!(out, "d{}", s.get(self.y));
            }
            _ => out.push_str("   "),
        }
        out.push_str("  CH2= ");
        match s.get(self.ch2) {
            GRANT => {
                let _ = write!(out, "y{}", s.get(self.w));
            }
            REFUSE => out.push_str("no "),
            _ => out.push_str("   "),
        }
        let _ = write!(out, "  B= {} ", s.get(self.bank));
        Self::opt_val(&mut out, s.get(self.bank) != 0, s.get(self.z));
        let _ = write!(
            out,
            "  bal= {:>3}  cash= {:>3}",
            s.get(self.b),
            s.get(self.cash)
        );
        out
    }

    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        let fired = match tr {
            ATM_1 => self.fire_atm_1(s),
            ATM_2 => self.fire_atm_2(s),
            BANK_1 => self.fire_bank_1(s),
            BANK_2 => {
                if s.get(self.bank) == 2 {
                    s.set(self.bank, 0);
                    true
                } else {
                    false
                }
            }
            CH1_LOSS => {
                if s.get(self.ch1) != 0 {
                    s.set(self.ch1, 0);
                    s.set(self.y, 0);
                    true
                } else {
                    false
                }
            }
            CH2_LOSS => {
                if s.get(self.ch2) != 0 {
                    s.set(self.ch2, 0);
                    s.set(self.w, 0);
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
        if s.get(self.atm) == 0
            && s.get(self.bank) == 0
            && s.get(self.b) + s.get(self.cash) < ORIGINAL_BALANCE
        {
            Some("The client lost")
        } else {
            None
        }
    }

    fn is_may_progress(&self, s: StateRef<'_>) -> bool {
        s.get(self.atm) == 0 && s.get(self.ch1) == 0 && s.get(self.ch2) == 0 && s.get(self.bank) == 0
    }
}

//! Shared test models: transition relations given as explicit edge tables,
//! so expected results can be computed independently of the checker.
#![allow(dead_code)]

use stator_mc::Config;
use stator_model::{
    LayoutBuilder, Model, ModelError, Obligations, StateMut, StateRef, StateVar,
};

/// A model over a single variable whose transition relation is an explicit
/// edge table: transition `i` is enabled exactly when the variable holds
/// `edges[i].0` and moves it to `edges[i].1`. The initial value is 0.
pub struct TableModel {
    pub x: StateVar,
    pub edges: Vec<(u32, u32)>,
    /// Values that are may-progress states.
    pub may: Vec<u32>,
    /// Values that are must-progress states.
    pub must: Vec<u32>,
    /// Value whose discovery is a safety violation.
    pub bad: Option<(u32, &'static str)>,
    /// Message returned for every terminal state.
    pub deadlock_msg: Option<&'static str>,
    /// Value that makes firing fail with a model error.
    pub fire_error_at: Option<(u32, &'static str)>,
    /// Per-transition obligation lists for the stubborn-set method.
    pub obligations: Vec<Vec<u32>>,
    /// Every transition obliges all others.
    pub oblige_all: bool,
    /// Misbehave: emit obligations twice per query.
    pub double_oblige: bool,
}

impl TableModel {
    pub fn new(b: &mut LayoutBuilder, bits: u32, edges: Vec<(u32, u32)>) -> Self {
        Self {
            x: b.var(bits).unwrap(),
            edges,
            may: Vec::new(),
            must: Vec::new(),
            bad: None,
            deadlock_msg: None,
            fire_error_at: None,
            obligations: Vec::new(),
            oblige_all: false,
            double_oblige: false,
        }
    }
}

impl Model for TableModel {
    fn init(&mut self, _state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        Ok(self.edges.len() as u32)
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        s.get(self.x).to_string()
    }

    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        if let Some((v, msg)) = self.fire_error_at {
            if s.get(self.x) == v {
                return Err(ModelError::new(msg));
            }
        }
        let (from, to) = self.edges[tr as usize];
        if s.get(self.x) == from {
            s.set(self.x, to);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn check_state(&self, s: StateRef<'_>) -> Option<&'static str> {
        match self.bad {
            Some((v, msg)) if s.get(self.x) == v => Some(msg),
            _ => None,
        }
    }

    fn check_deadlock(&self, _state: StateRef<'_>) -> Option<&'static str> {
        self.deadlock_msg
    }

    fn is_may_progress(&self, s: StateRef<'_>) -> bool {
        self.may.contains(&s.get(self.x))
    }

    fn is_must_progress(&self, s: StateRef<'_>) -> bool {
        self.must.contains(&s.get(self.x))
    }

    fn next_stubborn(&self, tr: u32, _state: StateRef<'_>, obl: &mut Obligations) {
        if self.double_oblige {
            obl.require([0]);
            obl.require([0]);
        } else if self.oblige_all {
            obl.require_all();
        } else if let Some(list) = self.obligations.get(tr as usize) {
            if !list.is_empty() {
                obl.require(list.iter().copied());
            }
        }
    }
}

/// Two interchangeable counters; `canonicalize` sorts them so the larger
/// one comes first.
pub struct TwinCounters {
    pub a: StateVar,
    pub b: StateVar,
    pub top: u32,
}

impl TwinCounters {
    pub fn new(builder: &mut LayoutBuilder, bits: u32) -> Self {
        Self {
            a: builder.var(bits).unwrap(),
            b: builder.var(bits).unwrap(),
            top: (1 << bits) - 1,
        }
    }
}

impl Model for TwinCounters {
    fn init(&mut self, _state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        Ok(2)
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        format!("{} {}", s.get(self.a), s.get(self.b))
    }

    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        let var = if tr == 0 { self.a } else { self.b };
        let v = s.get(var);
        if v < self.top {
            s.set(var, v + 1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn check_state(&self, s: StateRef<'_>) -> Option<&'static str> {
        if s.get(self.a) == self.top && s.get(self.b) == self.top {
            Some("both counters at top")
        } else {
            None
        }
    }

    fn canonicalize(&self, s: &mut StateMut<'_>) {
        let a = s.get(self.a);
        let b = s.get(self.b);
        if a < b {
            s.set(self.a, b);
            s.set(self.b, a);
        }
    }
}

/// Config with quiet output and a test-sized hash table.
pub fn cfg() -> Config {
    Config {
        show_count: 0,
        hash_bits: 10,
        ..Config::default()
    }
}

/// The variable values along a trace.
pub fn values(x: StateVar, trace: &stator_mc::Trace) -> Vec<u32> {
    trace.states().map(|s| s.get(x)).collect()
}

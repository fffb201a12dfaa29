//! Criterion benchmarks for the explorer.
//!
//! Run with: cargo bench -p stator-mc

use criterion::{criterion_group, criterion_main, Criterion};
use stator_mc::{Config, Explorer};
use stator_model::{LayoutBuilder, Model, ModelError, StateMut, StateRef, StateVar, VarLayout};

/// A grid of counters; the state space is the product of their ranges.
struct CounterGrid {
    counters: Vec<StateVar>,
    top: u32,
}

impl CounterGrid {
    fn new(b: &mut LayoutBuilder, count: usize, bits: u32) -> Self {
        Self {
            counters: (0..count).map(|_| b.var(bits).unwrap()).collect(),
            top: (1 << bits) - 1,
        }
    }
}

impl Model for CounterGrid {
    fn init(&mut self, _state: &mut StateMut<'_>) -> Result<u32, ModelError> {
        Ok(self.counters.len() as u32)
    }

    fn format_state(&self, s: StateRef<'_>) -> String {
        self.counters
            .iter()
            .map(|&c| s.get(c).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fire(&mut self, tr: u32, s: &mut StateMut<'_>) -> Result<bool, ModelError> {
        let var = self.counters[tr as usize];
        let v = s.get(var);
        if v < self.top {
            s.set(var, v + 1);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn grid(count: usize, bits: u32) -> (CounterGrid, VarLayout) {
    let mut b = LayoutBuilder::new();
    let model = CounterGrid::new(&mut b, count, bits);
    (model, b.finish())
}

fn benchmarks(c: &mut Criterion) {
    let config = Config {
        check_state: true,
        show_count: 0,
        hash_bits: 18,
        ..Config::default()
    };

    c.bench_function("explore_grid_3x16", |b| {
        b.iter(|| {
            let (model, layout) = grid(3, 4);
            let mut ex = Explorer::new(model, layout, config.clone());
            ex.check().unwrap()
        })
    });

    c.bench_function("explore_grid_2x256", |b| {
        b.iter(|| {
            let (model, layout) = grid(2, 8);
            let mut ex = Explorer::new(model, layout, config.clone());
            ex.check().unwrap()
        })
    });

    let label_config = Config {
        check_may_progress: true,
        show_count: 0,
        hash_bits: 18,
        ..Config::default()
    };

    c.bench_function("explore_and_label_3x16", |b| {
        b.iter(|| {
            let (model, layout) = grid(3, 4);
            let mut ex = Explorer::new(model, layout, label_config.clone());
            ex.check().unwrap()
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);

// SPDX-License-Identifier: MIT

//! Injectable randomness for the synthetic occupancy signal.
//!
//! All mock-sensor generation draws through [`SignalSource`] so tests can
//! substitute deterministic sequences for runtime randomness.

use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of the synthetic sensor signal.
pub trait SignalSource: Send + Sync {
    /// Uniform integer in `[0, bound)`. `bound` must be nonzero.
    fn next_in(&self, bound: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_unit(&self) -> f64;
}

/// Thread-rng-backed source used in production.
#[derive(Debug, Default, Clone)]
pub struct RandomSignal;

impl SignalSource for RandomSignal {
    fn next_in(&self, bound: u32) -> u32 {
        rand::rng().random_range(0..bound)
    }

    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic source for tests: replays a fixed sequence, cycling when
/// exhausted. Values are taken modulo the requested bound.
#[derive(Debug, Default)]
pub struct SequenceSignal {
    values: Mutex<VecDeque<u32>>,
    original: Vec<u32>,
}

impl SequenceSignal {
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values: Mutex::new(values.iter().copied().collect()),
            original: values,
        }
    }

    fn next_raw(&self) -> u32 {
        let mut queue = self.values.lock().expect("signal sequence poisoned");
        if queue.is_empty() {
            queue.extend(self.original.iter().copied());
        }
        queue.pop_front().unwrap_or(0)
    }
}

impl SignalSource for SequenceSignal {
    fn next_in(&self, bound: u32) -> u32 {
        self.next_raw() % bound.max(1)
    }

    fn next_unit(&self) -> f64 {
        // Map the raw value onto [0, 1) with percent resolution
        f64::from(self.next_raw() % 100) / 100.0
    }
}

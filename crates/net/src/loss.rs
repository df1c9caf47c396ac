//! The packet-loss simulator.
//!
//! A parametric admission gate independently applied to every inbound
//! and outbound datagram. The lower threshold is the only operator-
//! reachable knob; the upper bound is carried for symmetry with it but
//! is fixed at 100 and never mutated (a deliberate asymmetry, not a
//! bug).

use rand::Rng;
use std::sync::atomic::{AtomicU8, Ordering};

pub struct LossSimulator {
    lower: AtomicU8,
    upper: u8,
}

impl LossSimulator {
    pub fn new(initial_threshold: u8) -> LossSimulator {
        LossSimulator {
            lower: AtomicU8::new(initial_threshold),
            upper: 100,
        }
    }

    /// Live-mutable via the operator command channel; a single-word
    /// atomic write, safe to race against `admit`. Values above 100 are
    /// accepted as-is (draws never exceed 100, so the gate degenerates
    /// to "always drop") rather than rejected here, since the CLI layer
    /// is where the `[0, 100]` range is enforced.
    pub fn set_threshold(&self, threshold: u8) {
        self.lower.store(threshold, Ordering::Relaxed);
    }

    pub fn threshold(&self) -> u8 {
        self.lower.load(Ordering::Relaxed)
    }

    /// Draws `r` uniform in `[1, 100]`; admits the datagram unless
    /// `r < lower` or `r > upper`. `upper` is always 100 in this
    /// implementation, so only the lower bound is ever reachable.
    pub fn admit(&self) -> bool {
        let lower = self.lower.load(Ordering::Relaxed);
        let r = rand::thread_rng().gen_range(1..=100u8);
        !(r < lower || r > self.upper)
    }
}

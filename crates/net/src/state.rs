//! Runtime-mutable, atomically-shared engine state: the
//! invocation-semantics mode and the loss simulator's threshold. Both
//! are single-word atomics so the listener can sample them once per
//! inbound datagram without ever observing a torn read.

use crate::loss::LossSimulator;
use bankrpc_core::SemanticsMode;
use std::sync::atomic::{AtomicI32, Ordering};

pub struct ModeCell(AtomicI32);

impl ModeCell {
    pub fn new(initial: SemanticsMode) -> ModeCell {
        ModeCell(AtomicI32::new(initial as i32))
    }

    pub fn get(&self) -> SemanticsMode {
        SemanticsMode::from_i32(self.0.load(Ordering::Relaxed))
            .expect("ModeCell only ever stores a valid SemanticsMode")
    }

    pub fn set(&self, mode: SemanticsMode) {
        self.0.store(mode as i32, Ordering::Relaxed);
    }
}

/// Shared between the listener task and whatever task drives the
/// operator command channel.
pub struct SharedState {
    pub mode: ModeCell,
    pub loss: LossSimulator,
}

impl SharedState {
    pub fn new(initial_mode: SemanticsMode, initial_loss_threshold: u8) -> SharedState {
        SharedState {
            mode: ModeCell::new(initial_mode),
            loss: LossSimulator::new(initial_loss_threshold),
        }
    }
}

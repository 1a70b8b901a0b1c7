//! Cooperative pause gate.
//!
//! A shared, externally-owned checkpoint the engine consults before each
//! page fetch. Holding the gate blocks the exporting thread at the next
//! inter-fetch boundary; work already in flight (a running query, a frame
//! being written) is never interrupted. Any number of exporters may wait on
//! the same gate; releasing it resumes all of them.
//!
//! The engine only ever observes the gate. Holding and releasing belong to
//! the coordinating caller, typically from another thread.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct GateInner {
    held: Mutex<bool>,
    released: Condvar,
}

/// Cloneable handle to a shared pause gate. Starts open.
#[derive(Clone)]
pub struct PauseGate {
    inner: Arc<GateInner>,
}

impl PauseGate {
    /// Create an open gate.
    pub fn new() -> Self {
        PauseGate {
            inner: Arc::new(GateInner {
                held: Mutex::new(false),
                released: Condvar::new(),
            }),
        }
    }

    /// Hold the gate: exporters will block at their next checkpoint.
    pub fn hold(&self) {
        *self.inner.held.lock() = true;
    }

    /// Release the gate, resuming all waiting exporters.
    pub fn release(&self) {
        let mut held = self.inner.held.lock();
        *held = false;
        self.inner.released.notify_all();
    }

    /// True if the gate is currently held.
    pub fn is_held(&self) -> bool {
        *self.inner.held.lock()
    }

    /// Block the calling thread until the gate is open. Returns immediately
    /// if it already is.
    pub fn wait_until_open(&self) {
        let mut held = self.inner.held.lock();
        while *held {
            self.inner.released.wait(&mut held);
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        PauseGate::new()
    }
}

// Frame-ready signal: a manual-reset, single-slot event.
//
// The capture unit set()s it once per completed frame; the pipeline task
// wait()s, clear()s, renders. A set that lands between clear and the next
// wait costs one extra frame period at most — capture keeps streaming into
// hardware-owned storage regardless of consumer readiness. close() is the
// only cancellation primitive: it wakes every waiter with an error, and the
// signal never opens again.

use std::sync::{Arc, Condvar, Mutex};

use thiserror::Error;

/// Waiting failed because the signal was torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("frame-ready signal closed")]
pub struct SignalClosed;

#[derive(Default)]
struct State {
    set: bool,
    closed: bool,
}

struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

/// Cloneable handle to one manual-reset event. All clones observe the same
/// state; closing any handle closes them all.
#[derive(Clone)]
pub struct FrameSignal {
    inner: Arc<Inner>,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                cond: Condvar::new(),
            }),
        }
    }

    /// Mark a frame ready. The signal stays set until [`FrameSignal::clear`].
    pub fn set(&self) {
        let mut state = self.inner.state.lock().expect("signal mutex poisoned");
        state.set = true;
        self.inner.cond.notify_all();
    }

    /// Acknowledge the pending frame so the next one is observed.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock().expect("signal mutex poisoned");
        state.set = false;
    }

    /// Tear the signal down. Every current and future wait returns
    /// `Err(SignalClosed)`.
    pub fn close(&self) {
        let mut state = self.inner.state.lock().expect("signal mutex poisoned");
        state.closed = true;
        self.inner.cond.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().expect("signal mutex poisoned").closed
    }

    /// Block until the signal is set or closed. Closed wins over set.
    pub fn wait(&self) -> Result<(), SignalClosed> {
        let mut state = self.inner.state.lock().expect("signal mutex poisoned");
        loop {
            if state.closed {
                return Err(SignalClosed);
            }
            if state.set {
                return Ok(());
            }
            state = self.inner.cond.wait(state).expect("signal mutex poisoned");
        }
    }
}

impl Default for FrameSignal {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared task state guarded by a single lock.
//!
//! [`TaskControl`] is the only state shared between a task's worker thread
//! and the outside world (executor, cancel requests, pollers). Every phase
//! transition and every cancellation goes through its mutex, and sleepers on
//! its condition variable wake as soon as the task is cancelled.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::phase::{AbortReason, ExplorationPhase, TaskOutcome};

#[derive(Debug, Default)]
struct ControlState {
    phase: ExplorationPhase,
    cancel_requested: bool,
}

/// Phase and cancellation flag of one task.
#[derive(Debug, Default)]
pub struct TaskControl {
    state: Mutex<ControlState>,
    changed: Condvar,
}

impl TaskControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> ExplorationPhase {
        self.state.lock().phase.clone()
    }

    /// Outcome once the task is terminal.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.state.lock().phase.outcome()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancel_requested
    }

    /// Cancel the task.
    ///
    /// The phase becomes `Aborted(Cancelled)` immediately. Returns false if
    /// the task had already reached a terminal phase.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock();
        if state.phase.is_terminal() {
            return false;
        }
        state.cancel_requested = true;
        state.phase = ExplorationPhase::Aborted(AbortReason::Cancelled);
        self.changed.notify_all();
        true
    }

    /// Move to `next` unless the task is already terminal.
    ///
    /// Returns the phase in effect afterwards.
    pub fn transition(&self, next: ExplorationPhase) -> ExplorationPhase {
        let mut state = self.state.lock();
        if !state.phase.is_terminal() {
            state.phase = next;
            if state.phase.is_terminal() {
                self.changed.notify_all();
            }
        }
        state.phase.clone()
    }

    /// Sleep for `duration` unless cancelled first. A duration past the
    /// clock's range sleeps until cancelled.
    ///
    /// Returns true if the task is cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut state = self.state.lock();
        while !state.cancel_requested {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.changed.wait(&mut state),
            }
        }
        state.cancel_requested
    }

    /// Block until the task is terminal or `timeout` elapses.
    pub fn wait_finished(&self, timeout: Option<Duration>) -> Option<TaskOutcome> {
        // Unrepresentable deadlines wait forever
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.state.lock();
        loop {
            if let Some(outcome) = state.phase.outcome() {
                return Some(outcome);
            }
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out() {
                        return state.phase.outcome();
                    }
                }
                None => self.changed.wait(&mut state),
            }
        }
    }
}

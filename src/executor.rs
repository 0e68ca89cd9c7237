//! Task executor: accepts exploration tasks and runs them on worker threads.
//!
//! One task is active at a time. Submitting a new task preempts the active
//! one: it is cancelled (which cancels its navigation goal) and its worker
//! joined before the new worker starts. A worker being joined still reports
//! its terminal outcome through [`TaskExecutor::poll`] and
//! [`TaskExecutor::wait`].

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::controller::{
    AbortReason, ControllerConfig, ExplorationContext, ExplorationController, ExplorationPhase,
    ExplorationTask, TaskControl, TaskOutcome, TaskReport,
};
use crate::error::{KshetraError, Result};

/// Identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Observable status of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// Still executing in the given phase
    Running(ExplorationPhase),
    Finished(TaskOutcome),
    /// Never submitted here
    Unknown,
}

struct ActiveTask {
    handle: TaskHandle,
    control: Arc<TaskControl>,
    worker: JoinHandle<TaskReport>,
}

#[derive(Default)]
struct ExecutorState {
    active: Option<ActiveTask>,
    /// Terminal tasks whose worker is being joined outside the lock
    stopping: HashMap<TaskHandle, Arc<TaskControl>>,
    finished: HashMap<TaskHandle, TaskReport>,
}

impl ExecutorState {
    /// Take the active task if `matches`, keeping it observable while its
    /// worker is joined.
    fn detach(&mut self, matches: impl FnOnce(&ActiveTask) -> bool) -> Option<ActiveTask> {
        let active = self.active.take_if(|active| matches(active))?;
        self.stopping.insert(active.handle, Arc::clone(&active.control));
        Some(active)
    }
}

/// Runs exploration tasks against a fixed set of collaborators.
///
/// The state lock only guards bookkeeping. Worker threads are joined with
/// it released, so polling stays responsive while a preempted worker is
/// still inside a collaborator call.
pub struct TaskExecutor {
    context: ExplorationContext,
    config: ControllerConfig,
    state: Mutex<ExecutorState>,
    /// Signalled whenever a stopping task moves to `finished`
    retired: Condvar,
    /// Serializes submit and shutdown
    intake: Mutex<()>,
    next_id: AtomicU64,
}

impl TaskExecutor {
    pub fn new(context: ExplorationContext, config: ControllerConfig) -> Self {
        Self {
            context,
            config,
            state: Mutex::new(ExecutorState::default()),
            retired: Condvar::new(),
            intake: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start `task`, preempting the active task if any.
    pub fn submit(&self, task: ExplorationTask) -> Result<TaskHandle> {
        task.validate()?;

        let _intake = self.intake.lock();
        let preempted = self.state.lock().detach(|_| true);
        if let Some(active) = preempted {
            log::warn!("Preempting {} for new task", active.handle);
            active.control.cancel();
            self.retire(active);
        }

        let handle = TaskHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let control = Arc::new(TaskControl::new());
        let mut controller = ExplorationController::with_control(
            self.context.clone(),
            self.config.clone(),
            task,
            Arc::clone(&control),
        );

        let worker = thread::Builder::new()
            .name(format!("explore-{}", handle.0))
            .spawn(move || controller.run())
            .map_err(|e| KshetraError::Executor(format!("failed to spawn worker: {}", e)))?;

        log::info!("Accepted {}", handle);
        self.state.lock().active = Some(ActiveTask {
            handle,
            control,
            worker,
        });
        Ok(handle)
    }

    /// Cancel `handle` if it is the active task.
    ///
    /// Does not wait for the worker; use [`TaskExecutor::join`] for that.
    pub fn cancel(&self, handle: TaskHandle) -> bool {
        let state = self.state.lock();
        match &state.active {
            Some(active) if active.handle == handle => {
                let cancelled = active.control.cancel();
                if cancelled {
                    log::info!("Cancelled {}", handle);
                }
                cancelled
            }
            _ => false,
        }
    }

    pub fn poll(&self, handle: TaskHandle) -> TaskStatus {
        let state = self.state.lock();
        let control = match &state.active {
            Some(active) if active.handle == handle => Some(&active.control),
            _ => state.stopping.get(&handle),
        };

        if let Some(control) = control {
            let phase = control.phase();
            return match phase.outcome() {
                Some(outcome) => TaskStatus::Finished(outcome),
                None => TaskStatus::Running(phase),
            };
        }

        match state.finished.get(&handle) {
            Some(report) => TaskStatus::Finished(report.outcome.clone()),
            None => TaskStatus::Unknown,
        }
    }

    /// Wait up to `timeout` (forever if `None`) for `handle` to finish.
    pub fn wait(&self, handle: TaskHandle, timeout: Option<Duration>) -> Option<TaskOutcome> {
        let control = {
            let state = self.state.lock();
            match &state.active {
                Some(active) if active.handle == handle => Arc::clone(&active.control),
                _ => match state.stopping.get(&handle) {
                    Some(control) => Arc::clone(control),
                    None => return state.finished.get(&handle).map(|r| r.outcome.clone()),
                },
            }
        };
        control.wait_finished(timeout)
    }

    /// Wait for `handle` to finish and its worker to exit.
    pub fn join(&self, handle: TaskHandle) -> Option<TaskReport> {
        self.wait(handle, None)?;

        let detached = {
            let mut state = self.state.lock();
            let detached = state.detach(|active| active.handle == handle);
            if detached.is_none() {
                // Another thread is joining this worker
                while state.stopping.contains_key(&handle) {
                    self.retired.wait(&mut state);
                }
            }
            detached
        };

        if let Some(active) = detached {
            self.retire(active);
        }
        self.state.lock().finished.get(&handle).cloned()
    }

    /// Cancel the active task and wait for its worker.
    pub fn shutdown(&self) {
        let _intake = self.intake.lock();
        let detached = self.state.lock().detach(|_| true);
        if let Some(active) = detached {
            active.control.cancel();
            self.retire(active);
        }
    }

    /// Join a detached worker and record its report. Called without the
    /// state lock held.
    fn retire(&self, active: ActiveTask) {
        let report = match active.worker.join() {
            Ok(report) => report,
            Err(e) => {
                log::error!("Worker for {} panicked: {:?}", active.handle, e);
                active.control.cancel();
                TaskReport::aborted(AbortReason::Cancelled)
            }
        };
        log::debug!("{} finished: {}", active.handle, report.outcome);

        let mut state = self.state.lock();
        state.stopping.remove(&active.handle);
        state.finished.insert(active.handle, report);
        self.retired.notify_all();
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Single-goal navigation client.
//!
//! Wraps a [`Navigator`] so that a task never has more than one outstanding
//! goal: sending a new goal cancels the previous one, and a cancelled task
//! cancels its goal exactly once before returning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::controller::TaskControl;
use crate::error::Result;
use crate::services::{GoalHandle, GoalStatus, NavigationGoal, Navigator};

/// Default interval between status polls.
pub const DEFAULT_STATUS_POLL: Duration = Duration::from_millis(50);

/// Goal submission and terminal-status wait for one task.
pub struct NavigationClient {
    navigator: Arc<dyn Navigator>,
    /// Goal submitted and not yet terminal
    outstanding: Option<GoalHandle>,
    poll_interval: Duration,
    /// Cancel and fail goals running longer than this
    goal_timeout: Option<Duration>,
    goals_sent: u32,
}

impl NavigationClient {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        poll_interval: Duration,
        goal_timeout: Option<Duration>,
    ) -> Self {
        Self {
            navigator,
            outstanding: None,
            poll_interval,
            goal_timeout,
            goals_sent: 0,
        }
    }

    /// Submit `goal`, cancelling any goal still outstanding.
    pub fn send_goal(&mut self, goal: NavigationGoal) -> Result<GoalHandle> {
        if let Some(previous) = self.outstanding.take() {
            log::debug!("Cancelling superseded {}", previous);
            self.navigator.cancel(previous);
        }

        let handle = self.navigator.submit(goal)?;
        self.outstanding = Some(handle);
        self.goals_sent += 1;
        Ok(handle)
    }

    /// Block until `handle` reaches a terminal status or the task is cancelled.
    ///
    /// On cancellation the goal is cancelled and `Cancelled` is returned
    /// without waiting for the navigator to acknowledge.
    pub fn await_terminal(&mut self, handle: GoalHandle, control: &TaskControl) -> GoalStatus {
        let started = Instant::now();

        loop {
            if control.is_cancelled() {
                self.cancel(handle);
                return GoalStatus::Cancelled;
            }

            let status = self.navigator.status(handle);
            if status.is_terminal() {
                if self.outstanding == Some(handle) {
                    self.outstanding = None;
                }
                return status;
            }

            if let Some(limit) = self.goal_timeout
                && started.elapsed() >= limit
            {
                log::warn!(
                    "{} still running after {:.1}s, cancelling",
                    handle,
                    limit.as_secs_f32()
                );
                self.cancel(handle);
                return GoalStatus::Failed;
            }

            control.sleep(self.poll_interval);
        }
    }

    /// Send `goal` and wait for its terminal status.
    pub fn execute(&mut self, goal: NavigationGoal, control: &TaskControl) -> Result<GoalStatus> {
        let handle = self.send_goal(goal)?;
        Ok(self.await_terminal(handle, control))
    }

    /// Cancel `handle` if it is the outstanding goal.
    pub fn cancel(&mut self, handle: GoalHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
            self.navigator.cancel(handle);
        }
    }

    /// Cancel whatever goal is outstanding.
    pub fn cancel_outstanding(&mut self) {
        if let Some(handle) = self.outstanding.take() {
            self.navigator.cancel(handle);
        }
    }

    pub fn outstanding(&self) -> Option<GoalHandle> {
        self.outstanding
    }

    /// Goals submitted over the client's lifetime.
    pub fn goals_sent(&self) -> u32 {
        self.goals_sent
    }
}

impl Drop for NavigationClient {
    fn drop(&mut self) {
        self.cancel_outstanding();
    }
}

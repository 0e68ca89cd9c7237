//! Exploration task state machine.
//!
//! Sequences boundary registration, the move to the region center and the
//! frontier select/move loop into one task. Each step owns a fresh
//! [`RetryBudget`]; exhaustion aborts the task, except when frontier queries
//! run dry after at least one frontier was reached, which means the region
//! is fully explored.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::context::ExplorationContext;
use super::control::TaskControl;
use super::phase::{AbortReason, ExplorationPhase, TaskOutcome};
use super::retry::{DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_LIMIT, RetryBudget};
use super::task::ExplorationTask;
use crate::core::StampedPoint;
use crate::error::KshetraError;
use crate::geometry::{DEFAULT_APPROACH_FRACTION, partial_point, tangent_heading};
use crate::navigation::{DEFAULT_STATUS_POLL, NavigationClient};
use crate::services::{Frontier, GoalStatus, NavigationGoal, ServiceKind, TransformError};

/// Runtime configuration of the controller.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Attempts per step
    pub retry_limit: u32,
    /// Pause between attempts
    pub retry_backoff: Duration,
    /// Fraction of the robot-to-frontier segment to drive
    pub approach_fraction: f32,
    /// Frame the robot sits at the origin of
    pub robot_frame: String,
    /// Frame robot positions are expressed in for frontier queries
    pub working_frame: String,
    /// Availability check timeout per collaborator
    pub service_wait: Duration,
    /// Transform lookup timeout
    pub transform_timeout: Duration,
    /// Navigation status poll interval
    pub status_poll: Duration,
    /// Optional cap on a single navigation goal
    pub goal_timeout: Option<Duration>,
    /// Stop successfully after reaching this many frontiers
    pub max_frontiers: Option<u32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            approach_fraction: DEFAULT_APPROACH_FRACTION,
            robot_frame: "base_link".to_string(),
            working_frame: "base_link".to_string(),
            service_wait: Duration::from_secs(10),
            transform_timeout: Duration::from_secs(10),
            status_poll: DEFAULT_STATUS_POLL,
            goal_timeout: None,
            max_frontiers: None,
        }
    }
}

/// Summary of a finished task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskReport {
    pub outcome: TaskOutcome,
    /// Successful moves toward frontiers
    pub frontiers_reached: u32,
    /// Failed attempts across all steps
    pub failed_attempts: u32,
    /// Navigation goals submitted
    pub goals_sent: u32,
}

impl TaskReport {
    /// Report for a task that ended before doing any work.
    pub fn aborted(reason: AbortReason) -> Self {
        Self {
            outcome: TaskOutcome::Aborted(reason),
            frontiers_reached: 0,
            failed_attempts: 0,
            goals_sent: 0,
        }
    }
}

/// Why a single attempt failed.
#[derive(Error, Debug)]
enum AttemptError {
    #[error("{0}")]
    Transform(TransformError),

    #[error("{0}")]
    Failed(String),

    #[error("cancelled")]
    Cancelled,
}

impl From<KshetraError> for AttemptError {
    fn from(e: KshetraError) -> Self {
        match e {
            KshetraError::Transform(t) => AttemptError::Transform(t),
            other => AttemptError::Failed(other.to_string()),
        }
    }
}

impl From<TransformError> for AttemptError {
    fn from(e: TransformError) -> Self {
        AttemptError::Transform(e)
    }
}

/// Result of a step's retry loop.
enum StepResult<T> {
    Done(T),
    /// Budget spent; `transform_only` when every attempt failed on pose lookup
    Exhausted { transform_only: bool },
    Cancelled,
}

/// Drives one exploration task to a terminal outcome.
pub struct ExplorationController {
    context: ExplorationContext,
    config: ControllerConfig,
    task: ExplorationTask,
    control: Arc<TaskControl>,
    navigation: NavigationClient,
    phase: ExplorationPhase,
    budget: RetryBudget,
    /// At least one frontier reached during this task
    explored_any: bool,
    /// Collaborators that passed their availability check
    verified: Vec<ServiceKind>,
    frontiers_reached: u32,
    failed_attempts: u32,
}

impl ExplorationController {
    pub fn new(
        context: ExplorationContext,
        config: ControllerConfig,
        task: ExplorationTask,
    ) -> Self {
        Self::with_control(context, config, task, Arc::new(TaskControl::new()))
    }

    /// Controller reporting its phase through an externally shared `control`.
    pub fn with_control(
        context: ExplorationContext,
        config: ControllerConfig,
        task: ExplorationTask,
        control: Arc<TaskControl>,
    ) -> Self {
        let navigation = NavigationClient::new(
            Arc::clone(&context.navigator),
            config.status_poll,
            config.goal_timeout,
        );
        let budget = RetryBudget::new(config.retry_limit, config.retry_backoff);
        let phase = control.phase();

        Self {
            context,
            config,
            task,
            control,
            navigation,
            phase,
            budget,
            explored_any: false,
            verified: Vec::new(),
            frontiers_reached: 0,
            failed_attempts: 0,
        }
    }

    /// Shared handle for cancelling or observing this task.
    pub fn control(&self) -> Arc<TaskControl> {
        Arc::clone(&self.control)
    }

    pub fn phase(&self) -> &ExplorationPhase {
        &self.phase
    }

    /// True once a frontier has been reached.
    pub fn has_progress(&self) -> bool {
        self.explored_any
    }

    pub fn frontiers_reached(&self) -> u32 {
        self.frontiers_reached
    }

    /// Run until the task is terminal.
    pub fn run(&mut self) -> TaskReport {
        let region = &self.task.region;
        log::info!(
            "Exploration task started: center ({:.2}, {:.2}) in {}, boundary of {} vertices",
            region.center.point.x,
            region.center.point.y,
            region.center.frame,
            region.boundary.len()
        );

        let outcome = loop {
            if let Some(outcome) = self.phase.outcome() {
                break outcome;
            }
            self.step();
        };

        let report = TaskReport {
            outcome,
            frontiers_reached: self.frontiers_reached,
            failed_attempts: self.failed_attempts,
            goals_sent: self.navigation.goals_sent(),
        };

        match &report.outcome {
            TaskOutcome::Succeeded => log::info!(
                "Exploration finished: {} frontiers reached, {} goals sent, {} failed attempts",
                report.frontiers_reached,
                report.goals_sent,
                report.failed_attempts
            ),
            TaskOutcome::Aborted(reason) => log::error!(
                "Exploration aborted ({}): {} frontiers reached, {} goals sent, {} failed attempts",
                reason,
                report.frontiers_reached,
                report.goals_sent,
                report.failed_attempts
            ),
        }

        report
    }

    /// Execute the current phase, including its retries, and advance one
    /// transition. No-op once terminal.
    pub fn step(&mut self) -> &ExplorationPhase {
        if self.phase.is_terminal() {
            return &self.phase;
        }

        let next = if self.control.is_cancelled() {
            ExplorationPhase::Aborted(AbortReason::Cancelled)
        } else {
            match self.phase.clone() {
                ExplorationPhase::Init => ExplorationPhase::SettingBoundary,
                ExplorationPhase::SettingBoundary => self.set_boundary(),
                ExplorationPhase::MovingToCenter => self.move_to_center(),
                ExplorationPhase::SelectingFrontier => self.select_frontier(),
                ExplorationPhase::MovingToFrontier(frontier) => self.move_to_frontier(&frontier),
                terminal @ (ExplorationPhase::Succeeded | ExplorationPhase::Aborted(_)) => terminal,
            }
        };

        self.enter(next)
    }

    fn enter(&mut self, next: ExplorationPhase) -> &ExplorationPhase {
        let applied = self.control.transition(next);
        if applied != self.phase {
            log::debug!("Phase {} -> {}", self.phase.as_str(), applied.as_str());
        }
        self.phase = applied;
        self.budget.reset();
        &self.phase
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn set_boundary(&mut self) -> ExplorationPhase {
        if let Some(aborted) = self.require(ServiceKind::BoundaryRegistrar) {
            return aborted;
        }

        let boundary = self.task.region.boundary.clone();
        let result = self.retry("set region boundary", |this| {
            this.context
                .boundary
                .set_boundary(&boundary)
                .map_err(AttemptError::from)
        });

        match result {
            StepResult::Done(()) => {
                log::info!(
                    "Set region boundary ({} vertices in {})",
                    boundary.len(),
                    boundary.frame
                );
                ExplorationPhase::MovingToCenter
            }
            StepResult::Exhausted { .. } => {
                ExplorationPhase::Aborted(AbortReason::BoundarySetFailure)
            }
            StepResult::Cancelled => ExplorationPhase::Aborted(AbortReason::Cancelled),
        }
    }

    fn move_to_center(&mut self) -> ExplorationPhase {
        for kind in [ServiceKind::Navigator, ServiceKind::Transform] {
            if let Some(aborted) = self.require(kind) {
                return aborted;
            }
        }

        let center = self.task.region.center.clone();
        log::info!(
            "Moving robot to center of region ({:.2}, {:.2})",
            center.point.x,
            center.point.y
        );

        match self.retry("move to center", |this| this.drive_toward(&center, 1.0)) {
            StepResult::Done(()) => {
                log::info!("Moved to center");
                ExplorationPhase::SelectingFrontier
            }
            StepResult::Exhausted { transform_only } => Self::navigation_abort(transform_only),
            StepResult::Cancelled => ExplorationPhase::Aborted(AbortReason::Cancelled),
        }
    }

    fn select_frontier(&mut self) -> ExplorationPhase {
        if let Some(max) = self.config.max_frontiers
            && self.frontiers_reached >= max
        {
            log::info!("Reached frontier limit ({}), finishing", max);
            return ExplorationPhase::Succeeded;
        }

        if let Some(aborted) = self.require(ServiceKind::FrontierSelector) {
            return aborted;
        }

        log::info!("Calculating frontiers");
        match self.retry("find frontier", |this| this.query_frontier()) {
            StepResult::Done(frontier) => {
                log::info!(
                    "Closest frontier {} ({:.2}, {:.2}, {:.2})",
                    frontier.frame,
                    frontier.point.x,
                    frontier.point.y,
                    frontier.point.z
                );
                ExplorationPhase::MovingToFrontier(frontier)
            }
            StepResult::Exhausted { .. } if self.explored_any => {
                log::info!(
                    "Finished exploring region ({} frontiers reached)",
                    self.frontiers_reached
                );
                ExplorationPhase::Succeeded
            }
            StepResult::Exhausted { .. } => {
                log::error!("Failed exploration: no frontier found before any progress");
                ExplorationPhase::Aborted(AbortReason::FrontierQueryFailure)
            }
            StepResult::Cancelled => ExplorationPhase::Aborted(AbortReason::Cancelled),
        }
    }

    fn move_to_frontier(&mut self, frontier: &Frontier) -> ExplorationPhase {
        let target = frontier.stamped();
        let fraction = self.config.approach_fraction;

        match self.retry("move toward frontier", |this| this.drive_toward(&target, fraction)) {
            StepResult::Done(()) => {
                self.explored_any = true;
                self.frontiers_reached += 1;
                log::info!(
                    "Moved {:.0}% of the way to frontier #{}",
                    fraction * 100.0,
                    self.frontiers_reached
                );
                ExplorationPhase::SelectingFrontier
            }
            StepResult::Exhausted { transform_only } => Self::navigation_abort(transform_only),
            StepResult::Cancelled => ExplorationPhase::Aborted(AbortReason::Cancelled),
        }
    }

    // ========================================================================
    // Attempts
    // ========================================================================

    /// One frontier query from the robot's current position.
    fn query_frontier(&mut self) -> Result<Frontier, AttemptError> {
        let robot = self.robot_position(&self.config.working_frame)?;
        match self.context.frontiers.next_frontier(&robot)? {
            Some(frontier) => Ok(frontier),
            None => Err(AttemptError::Failed("no reachable frontier".to_string())),
        }
    }

    /// Drive `fraction` of the way from the robot to `target`, facing along
    /// the path, and wait for the goal to finish.
    fn drive_toward(&mut self, target: &StampedPoint, fraction: f32) -> Result<(), AttemptError> {
        let robot = self.robot_position(&target.frame)?;
        let position = partial_point(&robot.point, &target.point, fraction);
        let heading = tangent_heading(&robot.point, &target.point);

        log::debug!(
            "Robot at ({:.2}, {:.2}) in {}, waypoint ({:.2}, {:.2}), heading {:.1}°",
            robot.point.x,
            robot.point.y,
            robot.frame,
            position.x,
            position.y,
            heading.to_degrees()
        );

        if self.control.is_cancelled() {
            return Err(AttemptError::Cancelled);
        }

        let goal = NavigationGoal::new(target.frame.clone(), position, heading);
        match self.navigation.execute(goal, &self.control)? {
            GoalStatus::Succeeded => Ok(()),
            GoalStatus::Cancelled if self.control.is_cancelled() => Err(AttemptError::Cancelled),
            status => Err(AttemptError::Failed(format!("goal ended {:?}", status))),
        }
    }

    fn robot_position(&self, frame: &str) -> Result<StampedPoint, TransformError> {
        self.context.transforms.current_position(
            &self.config.robot_frame,
            frame,
            self.config.transform_timeout,
        )
    }

    /// Run `attempt` until it succeeds, the budget runs out or the task is
    /// cancelled. Backs off between attempts.
    fn retry<T>(
        &mut self,
        step: &str,
        mut attempt: impl FnMut(&mut Self) -> Result<T, AttemptError>,
    ) -> StepResult<T> {
        self.budget.reset();
        let mut transform_only = true;

        loop {
            if self.control.is_cancelled() {
                return StepResult::Cancelled;
            }

            let error = match attempt(self) {
                Ok(value) => return StepResult::Done(value),
                Err(AttemptError::Cancelled) => return StepResult::Cancelled,
                Err(error) => error,
            };

            if !matches!(error, AttemptError::Transform(_)) {
                transform_only = false;
            }
            self.failed_attempts += 1;

            if self.budget.record_failure() {
                log::error!(
                    "Failed to {} after {} attempts: {}",
                    step,
                    self.budget.failures(),
                    error
                );
                return StepResult::Exhausted { transform_only };
            }

            log::warn!(
                "Failed to {} ({}), retrying... ({}/{} attempts left)",
                step,
                error,
                self.budget.remaining(),
                self.budget.limit()
            );
            if self.control.sleep(self.budget.backoff()) {
                return StepResult::Cancelled;
            }
        }
    }

    /// Availability check, once per collaborator per task.
    fn require(&mut self, kind: ServiceKind) -> Option<ExplorationPhase> {
        if self.verified.contains(&kind) {
            return None;
        }

        let timeout = self.config.service_wait;
        log::debug!("Waiting for {}", kind);
        let available = match kind {
            ServiceKind::BoundaryRegistrar => self.context.boundary.wait_for_service(timeout),
            ServiceKind::Navigator => self.context.navigator.wait_for_service(timeout),
            ServiceKind::FrontierSelector => self.context.frontiers.wait_for_service(timeout),
            ServiceKind::Transform => self.context.transforms.wait_for_service(timeout),
        };

        if available {
            self.verified.push(kind);
            None
        } else {
            log::error!("{} not available after {:.1}s", kind, timeout.as_secs_f32());
            Some(ExplorationPhase::Aborted(AbortReason::ServiceUnavailable(kind)))
        }
    }

    fn navigation_abort(transform_only: bool) -> ExplorationPhase {
        if transform_only {
            ExplorationPhase::Aborted(AbortReason::TransformFailure)
        } else {
            ExplorationPhase::Aborted(AbortReason::NavigationFailure)
        }
    }
}

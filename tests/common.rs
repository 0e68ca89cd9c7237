//! Test utilities for exploration controller tests.
//!
//! [`ScriptedRobot`] implements every collaborator with scripted replies and
//! call counters, so tests can drive the controller through failures without
//! timing dependencies.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use kshetra::{
    BoundaryRegistrar, ControllerConfig, ExplorationContext, ExplorationTask, Frontier,
    FrontierSelector, GoalHandle, GoalStatus, KshetraError, NavigationGoal, Navigator, Point3D,
    Polygon, Result, Service, ServiceKind, StampedPoint, TransformClient, TransformError,
};

pub const MAP: &str = "map";

/// Scripted reply to a frontier query.
#[derive(Clone, Debug)]
pub enum FrontierReply {
    Found(Point3D),
    Empty,
    Error,
}

/// How a submitted goal ends.
///
/// `Pending` goals never finish on their own; they wait to be cancelled.
pub type GoalScript = GoalStatus;

#[derive(Default)]
struct Script {
    unavailable: HashSet<ServiceKind>,
    boundary_failures: u32,
    boundary_delay: Duration,
    transform_failures: Option<u32>,
    frontiers: VecDeque<FrontierReply>,
    goals: VecDeque<GoalScript>,
}

#[derive(Default)]
struct Calls {
    boundary: u32,
    frontier_queries: u32,
    transforms: u32,
    goals: Vec<NavigationGoal>,
    goal_status: HashMap<u64, GoalStatus>,
    cancels: HashMap<u64, u32>,
    availability: HashMap<ServiceKind, u32>,
}

/// Collaborator fake driven by per-test scripts.
#[derive(Default)]
pub struct ScriptedRobot {
    /// Robot position in the map frame
    pub position: Point3D,
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl ScriptedRobot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn at(position: Point3D) -> Arc<Self> {
        Arc::new(Self {
            position,
            ..Default::default()
        })
    }

    /// Context whose collaborators report availability per kind.
    pub fn context(self: &Arc<Self>) -> ExplorationContext {
        let view = |kind| {
            Arc::new(Collaborator {
                robot: Arc::clone(self),
                kind,
            })
        };
        ExplorationContext::new(
            view(ServiceKind::BoundaryRegistrar),
            view(ServiceKind::Navigator),
            view(ServiceKind::FrontierSelector),
            view(ServiceKind::Transform),
        )
    }

    // ========================================================================
    // Scripting
    // ========================================================================

    pub fn set_available(&self, kind: ServiceKind, available: bool) {
        let mut script = self.script.lock();
        if available {
            script.unavailable.remove(&kind);
        } else {
            script.unavailable.insert(kind);
        }
    }

    /// Fail the next `n` boundary registrations.
    pub fn fail_boundary(&self, n: u32) {
        self.script.lock().boundary_failures = n;
    }

    /// Make every boundary registration take `delay`, ignoring cancellation.
    pub fn slow_boundary(&self, delay: Duration) {
        self.script.lock().boundary_delay = delay;
    }

    /// Fail the next `n` transform lookups.
    pub fn fail_transforms(&self, n: u32) {
        self.script.lock().transform_failures = Some(n);
    }

    /// Fail every transform lookup.
    pub fn break_transforms(&self) {
        self.script.lock().transform_failures = Some(u32::MAX);
    }

    /// Queue frontier replies; queries past the end get `Empty`.
    pub fn frontiers(&self, replies: impl IntoIterator<Item = FrontierReply>) {
        self.script.lock().frontiers.extend(replies);
    }

    /// Queue goal endings; goals past the end succeed.
    pub fn goals(&self, endings: impl IntoIterator<Item = GoalScript>) {
        self.script.lock().goals.extend(endings);
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn boundary_calls(&self) -> u32 {
        self.calls.lock().boundary
    }

    pub fn frontier_queries(&self) -> u32 {
        self.calls.lock().frontier_queries
    }

    pub fn transform_calls(&self) -> u32 {
        self.calls.lock().transforms
    }

    pub fn submitted(&self) -> Vec<NavigationGoal> {
        self.calls.lock().goals.clone()
    }

    pub fn goals_submitted(&self) -> usize {
        self.calls.lock().goals.len()
    }

    /// Cancel requests received for goal number `n` (1-based).
    pub fn cancels_of(&self, n: u64) -> u32 {
        self.calls.lock().cancels.get(&n).copied().unwrap_or(0)
    }

    pub fn total_cancels(&self) -> u32 {
        self.calls.lock().cancels.values().sum()
    }

    /// Calls to `wait_for_service` for `kind`.
    pub fn availability_checks(&self, kind: ServiceKind) -> u32 {
        self.calls.lock().availability.get(&kind).copied().unwrap_or(0)
    }
}

/// One collaborator's view of a [`ScriptedRobot`].
struct Collaborator {
    robot: Arc<ScriptedRobot>,
    kind: ServiceKind,
}

impl Service for Collaborator {
    fn wait_for_service(&self, _timeout: Duration) -> bool {
        *self
            .robot
            .calls
            .lock()
            .availability
            .entry(self.kind)
            .or_insert(0) += 1;
        !self.robot.script.lock().unavailable.contains(&self.kind)
    }
}

impl BoundaryRegistrar for Collaborator {
    fn set_boundary(&self, _boundary: &Polygon) -> Result<()> {
        let robot = &self.robot;
        let delay = robot.script.lock().boundary_delay;
        robot.calls.lock().boundary += 1;
        thread::sleep(delay);

        let mut script = robot.script.lock();
        if script.boundary_failures > 0 {
            script.boundary_failures -= 1;
            return Err(KshetraError::service("boundary registrar", "rejected"));
        }
        Ok(())
    }
}

impl FrontierSelector for Collaborator {
    fn next_frontier(&self, _robot_position: &StampedPoint) -> Result<Option<Frontier>> {
        let robot = &self.robot;
        robot.calls.lock().frontier_queries += 1;
        let reply = robot
            .script
            .lock()
            .frontiers
            .pop_front()
            .unwrap_or(FrontierReply::Empty);
        match reply {
            FrontierReply::Found(point) => Ok(Some(Frontier::new(MAP, point))),
            FrontierReply::Empty => Ok(None),
            FrontierReply::Error => Err(KshetraError::service("frontier selector", "costmap busy")),
        }
    }
}

impl Navigator for Collaborator {
    fn submit(&self, goal: NavigationGoal) -> Result<GoalHandle> {
        let ending = self
            .robot
            .script
            .lock()
            .goals
            .pop_front()
            .unwrap_or(GoalStatus::Succeeded);

        let mut calls = self.robot.calls.lock();
        calls.goals.push(goal);
        let id = calls.goals.len() as u64;
        calls.goal_status.insert(id, ending);
        Ok(GoalHandle(id))
    }

    fn status(&self, handle: GoalHandle) -> GoalStatus {
        self.robot
            .calls
            .lock()
            .goal_status
            .get(&handle.0)
            .copied()
            .unwrap_or(GoalStatus::Failed)
    }

    fn cancel(&self, handle: GoalHandle) {
        let mut calls = self.robot.calls.lock();
        *calls.cancels.entry(handle.0).or_insert(0) += 1;
        if let Some(status) = calls.goal_status.get_mut(&handle.0)
            && *status == GoalStatus::Pending
        {
            *status = GoalStatus::Cancelled;
        }
    }
}

impl TransformClient for Collaborator {
    fn transform(
        &self,
        point: &StampedPoint,
        target_frame: &str,
        _timeout: Duration,
    ) -> std::result::Result<StampedPoint, TransformError> {
        let robot = &self.robot;
        robot.calls.lock().transforms += 1;
        let mut script = robot.script.lock();
        if let Some(remaining) = script.transform_failures.as_mut()
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(TransformError::Timeout {
                from: point.frame.clone(),
                to: target_frame.to_string(),
            });
        }
        Ok(StampedPoint::new(target_frame, robot.position))
    }
}

// ============================================================================
// Task and config helpers
// ============================================================================

/// Controller config with near-zero backoff and polling.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        retry_backoff: Duration::from_millis(1),
        status_poll: Duration::from_millis(1),
        service_wait: Duration::from_millis(10),
        transform_timeout: Duration::from_millis(10),
        ..Default::default()
    }
}

/// 10 m square in the map frame, centered at (5, 5).
pub fn square_task() -> ExplorationTask {
    ExplorationTask::new(
        StampedPoint::new(MAP, Point3D::planar(5.0, 5.0)),
        Polygon::from_xy(MAP, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
    )
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

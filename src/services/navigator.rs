//! Motion execution: goals, terminal status and cancellation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Service;
use crate::core::Point3D;
use crate::error::Result;

/// Target pose for the motion subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationGoal {
    /// Reference frame of `position`
    pub frame: String,
    /// Target position
    pub position: Point3D,
    /// Final heading in radians (see [`crate::geometry::tangent_heading`])
    pub heading: f32,
}

impl NavigationGoal {
    pub fn new(frame: impl Into<String>, position: Point3D, heading: f32) -> Self {
        Self {
            frame: frame.into(),
            position,
            heading,
        }
    }
}

/// Opaque goal identifier issued by a [`Navigator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalHandle(pub u64);

impl fmt::Display for GoalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goal#{}", self.0)
    }
}

/// Goal status as reported by the motion subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    /// Accepted or executing
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl GoalStatus {
    /// No further progress happens for a goal in a terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GoalStatus::Pending)
    }
}

/// Path planner + controller that moves the robot to a pose.
pub trait Navigator: Service {
    /// Submit a goal. The previous goal, if any, must already be cancelled.
    fn submit(&self, goal: NavigationGoal) -> Result<GoalHandle>;

    /// Current status of `handle`. Unknown handles report `Failed`.
    fn status(&self, handle: GoalHandle) -> GoalStatus;

    /// Request cancellation of `handle`.
    fn cancel(&self, handle: GoalHandle);
}

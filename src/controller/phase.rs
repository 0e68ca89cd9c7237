//! Exploration phases and terminal outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::services::{Frontier, ServiceKind};

/// Why a task ended without success.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbortReason {
    /// A collaborator never became reachable
    #[error("{0} unavailable")]
    ServiceUnavailable(ServiceKind),

    #[error("failed to set region boundary")]
    BoundarySetFailure,

    #[error("navigation failed")]
    NavigationFailure,

    #[error("no frontier found and nothing explored")]
    FrontierQueryFailure,

    #[error("robot position could not be resolved")]
    TransformFailure,

    #[error("cancelled")]
    Cancelled,
}

/// Terminal result of an exploration task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Succeeded,
    Aborted(AbortReason),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Succeeded => f.write_str("succeeded"),
            TaskOutcome::Aborted(reason) => write!(f, "aborted: {}", reason),
        }
    }
}

/// State of the exploration state machine.
///
/// ```text
/// Init → SettingBoundary → MovingToCenter → SelectingFrontier ⇄ MovingToFrontier
///                                                  │
///                                       Succeeded | Aborted
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExplorationPhase {
    /// Task accepted, nothing done yet
    #[default]
    Init,
    /// Registering the region boundary
    SettingBoundary,
    /// Driving to the region center
    MovingToCenter,
    /// Querying the next frontier
    SelectingFrontier,
    /// Driving toward the selected frontier
    MovingToFrontier(Frontier),
    Succeeded,
    Aborted(AbortReason),
}

impl ExplorationPhase {
    /// No transition leaves a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExplorationPhase::Succeeded | ExplorationPhase::Aborted(_))
    }

    /// Outcome if the phase is terminal.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        match self {
            ExplorationPhase::Succeeded => Some(TaskOutcome::Succeeded),
            ExplorationPhase::Aborted(reason) => Some(TaskOutcome::Aborted(reason.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorationPhase::Init => "INIT",
            ExplorationPhase::SettingBoundary => "SETTING_BOUNDARY",
            ExplorationPhase::MovingToCenter => "MOVING_TO_CENTER",
            ExplorationPhase::SelectingFrontier => "SELECTING_FRONTIER",
            ExplorationPhase::MovingToFrontier(_) => "MOVING_TO_FRONTIER",
            ExplorationPhase::Succeeded => "SUCCEEDED",
            ExplorationPhase::Aborted(_) => "ABORTED",
        }
    }
}

impl From<TaskOutcome> for ExplorationPhase {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Succeeded => ExplorationPhase::Succeeded,
            TaskOutcome::Aborted(reason) => ExplorationPhase::Aborted(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point3D;

    #[test]
    fn test_terminal_phases() {
        assert!(!ExplorationPhase::Init.is_terminal());
        assert!(!ExplorationPhase::SelectingFrontier.is_terminal());
        assert!(
            !ExplorationPhase::MovingToFrontier(Frontier::new("map", Point3D::ZERO)).is_terminal()
        );
        assert!(ExplorationPhase::Succeeded.is_terminal());
        assert!(ExplorationPhase::Aborted(AbortReason::Cancelled).is_terminal());
    }

    #[test]
    fn test_outcome_round_trip() {
        let aborted = TaskOutcome::Aborted(AbortReason::NavigationFailure);
        let phase = ExplorationPhase::from(aborted.clone());
        assert_eq!(phase.outcome(), Some(aborted));
        assert_eq!(ExplorationPhase::MovingToCenter.outcome(), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(TaskOutcome::Succeeded.to_string(), "succeeded");
        assert_eq!(
            TaskOutcome::Aborted(AbortReason::ServiceUnavailable(ServiceKind::Navigator))
                .to_string(),
            "aborted: navigator unavailable"
        );
    }
}

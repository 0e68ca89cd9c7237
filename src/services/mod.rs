//! Collaborator capabilities used by the exploration controller.
//!
//! Each collaborator is a narrow request/response trait. None of them retry
//! internally: retry and backoff policy lives in the controller.
//!
//! | Trait | Backing subsystem |
//! |-------|-------------------|
//! | [`BoundaryRegistrar`] | Costmap boundary clipping |
//! | [`FrontierSelector`] | Frontier detection and ranking |
//! | [`Navigator`] | Path planner + motion controller |
//! | [`TransformClient`] | Frame transform engine |

mod boundary;
mod frontier;
mod navigator;
mod transform;

pub use boundary::BoundaryRegistrar;
pub use frontier::{Frontier, FrontierSelector};
pub use navigator::{GoalHandle, GoalStatus, NavigationGoal, Navigator};
pub use transform::{TransformClient, TransformError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies a collaborator in logs and abort reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    BoundaryRegistrar,
    Navigator,
    FrontierSelector,
    Transform,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::BoundaryRegistrar => "boundary registrar",
            ServiceKind::Navigator => "navigator",
            ServiceKind::FrontierSelector => "frontier selector",
            ServiceKind::Transform => "transform client",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability check shared by all collaborators.
pub trait Service: Send + Sync {
    /// Block until the collaborator is reachable or `timeout` elapses.
    ///
    /// Returns false if it never became reachable.
    fn wait_for_service(&self, timeout: Duration) -> bool;
}

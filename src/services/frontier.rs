//! Frontier queries.

use serde::{Deserialize, Serialize};

use super::Service;
use crate::core::{Point3D, StampedPoint};
use crate::error::Result;

/// A reachable point on the boundary between explored and unexplored space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontier {
    /// Frontier location in `frame`
    pub point: Point3D,
    /// Reference frame of `point`
    pub frame: String,
}

impl Frontier {
    pub fn new(frame: impl Into<String>, point: Point3D) -> Self {
        Self {
            point,
            frame: frame.into(),
        }
    }

    /// The frontier as a frame-tagged point.
    pub fn stamped(&self) -> StampedPoint {
        StampedPoint::new(self.frame.clone(), self.point)
    }
}

/// Ranks frontiers relative to the robot.
pub trait FrontierSelector: Service {
    /// Best next frontier for a robot at `robot_position`.
    ///
    /// `Ok(None)` means no reachable frontier was found.
    fn next_frontier(&self, robot_position: &StampedPoint) -> Result<Option<Frontier>>;
}

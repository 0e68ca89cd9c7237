//! Frame transforms for robot position lookup.

use std::time::Duration;
use thiserror::Error;

use super::Service;
use crate::core::{Point3D, StampedPoint};

/// Transform lookup failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// No transform between the frames became available in time
    #[error("timed out waiting for transform {from} -> {to}")]
    Timeout { from: String, to: String },

    #[error("cannot transform {from} -> {to}: {reason}")]
    Failure {
        from: String,
        to: String,
        reason: String,
    },
}

/// Converts points between reference frames.
pub trait TransformClient: Service {
    /// Express `point` in `target_frame`, waiting up to `timeout`.
    fn transform(
        &self,
        point: &StampedPoint,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<StampedPoint, TransformError>;

    /// Current robot position expressed in `target_frame`.
    ///
    /// The robot sits at the origin of `robot_frame`, so no lookup is made
    /// when the target is the robot frame itself.
    fn current_position(
        &self,
        robot_frame: &str,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<StampedPoint, TransformError> {
        let origin = StampedPoint::new(robot_frame, Point3D::ZERO);
        if target_frame == robot_frame {
            return Ok(origin);
        }
        self.transform(&origin, target_frame, timeout)
    }
}

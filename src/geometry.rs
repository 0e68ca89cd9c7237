//! Waypoint and heading computation from live robot position.
//!
//! Headings follow the exploration convention: `atan2(dx, dy)`, i.e. the
//! angle of the robot-to-goal vector measured from the +y axis toward +x.

use crate::core::Point3D;

/// Fraction of the robot-to-frontier segment covered by each frontier move.
pub const DEFAULT_APPROACH_FRACTION: f32 = 0.9;

/// Point `fraction` of the way from `robot` to `goal`.
///
/// Interpolates every axis, so `fraction = 0` returns `robot` and
/// `fraction = 1` returns `goal`.
#[inline]
pub fn partial_point(robot: &Point3D, goal: &Point3D, fraction: f32) -> Point3D {
    Point3D {
        x: robot.x + (goal.x - robot.x) * fraction,
        y: robot.y + (goal.y - robot.y) * fraction,
        z: robot.z + (goal.z - robot.z) * fraction,
    }
}

/// Heading tangent to the straight path from `robot` to `goal` (radians).
///
/// Returns 0 when the points coincide.
#[inline]
pub fn tangent_heading(robot: &Point3D, goal: &Point3D) -> f32 {
    let dx = goal.x - robot.x;
    let dy = goal.y - robot.y;
    dx.atan2(dy)
}

//! Simulated robot for hardware-free exploration runs.
//!
//! [`SimulatedRobot`] implements every collaborator trait over a tiny world:
//! - a robot pose in a fixed world frame
//! - a set of unexplored frontier points
//! - the registered boundary, which clips frontiers and rejects goals outside it
//! - goals that complete after a fixed number of status polls
//!
//! Frontiers within `sensor_range` of the robot are marked explored whenever
//! a goal completes.
//!
//! Headings follow [`crate::geometry::tangent_heading`]: measured from the
//! world +y axis toward +x. In the robot frame +y points forward and +x to
//! the right.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::math::normalize_angle;
use crate::core::{Point3D, Polygon, StampedPoint};
use crate::error::{KshetraError, Result};
use crate::services::{
    BoundaryRegistrar, Frontier, FrontierSelector, GoalHandle, GoalStatus, NavigationGoal,
    Navigator, Service, TransformClient, TransformError,
};

/// Simulated world configuration.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Fixed world frame
    pub world_frame: String,
    /// Robot body frame
    pub robot_frame: String,
    /// Initial robot position in the world frame
    pub start: Point3D,
    /// Status polls a goal stays pending before it completes
    pub polls_per_goal: u32,
    /// Frontiers within this distance of the robot count as explored (meters)
    pub sensor_range: f32,
    /// Unexplored frontier points in the world frame
    pub frontiers: Vec<Point3D>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_frame: "map".to_string(),
            robot_frame: "base_link".to_string(),
            start: Point3D::ZERO,
            polls_per_goal: 3,
            sensor_range: 1.0,
            frontiers: Vec::new(),
        }
    }
}

/// Counters for inspecting a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub boundary_updates: u32,
    pub goals_submitted: u32,
    pub goals_succeeded: u32,
    pub goals_cancelled: u32,
    pub frontier_queries: u32,
}

#[derive(Clone, Copy, Debug)]
struct SimPose {
    position: Point3D,
    heading: f32,
}

impl SimPose {
    /// Robot-frame point to world frame.
    fn to_world(&self, p: &Point3D) -> Point3D {
        let (sin, cos) = self.heading.sin_cos();
        Point3D::new(
            self.position.x + p.x * cos + p.y * sin,
            self.position.y - p.x * sin + p.y * cos,
            self.position.z + p.z,
        )
    }

    /// World-frame point to robot frame.
    fn to_body(&self, p: &Point3D) -> Point3D {
        let (sin, cos) = self.heading.sin_cos();
        let dx = p.x - self.position.x;
        let dy = p.y - self.position.y;
        Point3D::new(dx * cos - dy * sin, dx * sin + dy * cos, p.z - self.position.z)
    }
}

#[derive(Debug)]
struct SimGoal {
    target: Point3D,
    heading: f32,
    polls_left: u32,
    status: GoalStatus,
}

#[derive(Debug)]
struct SimState {
    pose: SimPose,
    boundary: Option<Polygon>,
    unexplored: Vec<Point3D>,
    /// Pending goals plus those finished since the last submit
    goals: HashMap<u64, SimGoal>,
    next_goal: u64,
    stats: SimStats,
}

/// In-memory robot providing all exploration collaborators.
#[derive(Debug)]
pub struct SimulatedRobot {
    config: SimConfig,
    state: Mutex<SimState>,
}

impl SimulatedRobot {
    pub fn new(config: SimConfig) -> Self {
        let state = SimState {
            pose: SimPose {
                position: config.start,
                heading: 0.0,
            },
            boundary: None,
            unexplored: config.frontiers.clone(),
            goals: HashMap::new(),
            next_goal: 1,
            stats: SimStats::default(),
        };

        Self {
            config,
            state: Mutex::new(state),
        }
    }

    /// Robot position in the world frame and heading.
    pub fn pose(&self) -> (Point3D, f32) {
        let state = self.state.lock();
        (state.pose.position, state.pose.heading)
    }

    /// Frontiers not yet explored.
    pub fn unexplored(&self) -> Vec<Point3D> {
        self.state.lock().unexplored.clone()
    }

    pub fn stats(&self) -> SimStats {
        self.state.lock().stats.clone()
    }

    fn frame_error(&self, from: &str, to: &str) -> TransformError {
        TransformError::Failure {
            from: from.to_string(),
            to: to.to_string(),
            reason: format!(
                "unknown frame (known: {}, {})",
                self.config.world_frame, self.config.robot_frame
            ),
        }
    }

    /// Express `point` in the world frame.
    fn to_world(
        &self,
        pose: &SimPose,
        point: &StampedPoint,
    ) -> std::result::Result<Point3D, TransformError> {
        if point.frame == self.config.world_frame {
            Ok(point.point)
        } else if point.frame == self.config.robot_frame {
            Ok(pose.to_world(&point.point))
        } else {
            Err(self.frame_error(&point.frame, &self.config.world_frame))
        }
    }

    /// Mark frontiers around the robot as explored.
    fn observe(&self, state: &mut SimState) {
        let position = state.pose.position;
        let range = self.config.sensor_range;
        let before = state.unexplored.len();
        state
            .unexplored
            .retain(|f| f.planar_distance(&position) > range);

        let seen = before - state.unexplored.len();
        if seen > 0 {
            log::debug!(
                "Sim: explored {} frontiers at ({:.2}, {:.2}), {} left",
                seen,
                position.x,
                position.y,
                state.unexplored.len()
            );
        }
    }
}

impl Service for SimulatedRobot {
    fn wait_for_service(&self, _timeout: Duration) -> bool {
        true
    }
}

impl BoundaryRegistrar for SimulatedRobot {
    fn set_boundary(&self, boundary: &Polygon) -> Result<()> {
        if boundary.frame != self.config.world_frame {
            return Err(KshetraError::service(
                "boundary registrar",
                format!(
                    "boundary must be in {}, got {}",
                    self.config.world_frame, boundary.frame
                ),
            ));
        }

        let mut state = self.state.lock();
        state.boundary = Some(boundary.clone());
        state.stats.boundary_updates += 1;
        Ok(())
    }
}

impl FrontierSelector for SimulatedRobot {
    fn next_frontier(&self, robot_position: &StampedPoint) -> Result<Option<Frontier>> {
        let mut state = self.state.lock();
        state.stats.frontier_queries += 1;

        let robot = self.to_world(&state.pose, robot_position)?;
        let Some(boundary) = &state.boundary else {
            return Err(KshetraError::service(
                "frontier selector",
                "no boundary registered",
            ));
        };

        let nearest = state
            .unexplored
            .iter()
            .filter(|f| boundary.contains(f))
            .min_by(|a, b| {
                a.planar_distance(&robot)
                    .total_cmp(&b.planar_distance(&robot))
            })
            .copied();

        Ok(nearest.map(|point| Frontier::new(self.config.world_frame.clone(), point)))
    }
}

impl Navigator for SimulatedRobot {
    fn submit(&self, goal: NavigationGoal) -> Result<GoalHandle> {
        let mut state = self.state.lock();
        let target = self.to_world(
            &state.pose,
            &StampedPoint::new(goal.frame.clone(), goal.position),
        )?;

        let heading = if goal.frame == self.config.robot_frame {
            normalize_angle(goal.heading + state.pose.heading)
        } else {
            goal.heading
        };

        let reachable = state
            .boundary
            .as_ref()
            .is_none_or(|boundary| boundary.contains(&target));

        // Finished goals are forgotten; their handles then report Failed
        state.goals.retain(|_, g| g.status == GoalStatus::Pending);

        let id = state.next_goal;
        state.next_goal += 1;
        state.stats.goals_submitted += 1;
        state.goals.insert(
            id,
            SimGoal {
                target,
                heading,
                polls_left: self.config.polls_per_goal,
                status: if reachable {
                    GoalStatus::Pending
                } else {
                    GoalStatus::Failed
                },
            },
        );

        if !reachable {
            log::debug!(
                "Sim: goal ({:.2}, {:.2}) outside boundary",
                target.x,
                target.y
            );
        }
        Ok(GoalHandle(id))
    }

    fn status(&self, handle: GoalHandle) -> GoalStatus {
        let mut state = self.state.lock();
        let Some(goal) = state.goals.get_mut(&handle.0) else {
            return GoalStatus::Failed;
        };

        if goal.status != GoalStatus::Pending {
            return goal.status;
        }
        if goal.polls_left > 0 {
            goal.polls_left -= 1;
            return GoalStatus::Pending;
        }

        goal.status = GoalStatus::Succeeded;
        let pose = SimPose {
            position: goal.target,
            heading: goal.heading,
        };
        state.pose = pose;
        state.stats.goals_succeeded += 1;
        self.observe(&mut state);
        GoalStatus::Succeeded
    }

    fn cancel(&self, handle: GoalHandle) {
        let mut state = self.state.lock();
        if let Some(goal) = state.goals.get_mut(&handle.0)
            && goal.status == GoalStatus::Pending
        {
            goal.status = GoalStatus::Cancelled;
            state.stats.goals_cancelled += 1;
        }
    }
}

impl TransformClient for SimulatedRobot {
    fn transform(
        &self,
        point: &StampedPoint,
        target_frame: &str,
        _timeout: Duration,
    ) -> std::result::Result<StampedPoint, TransformError> {
        if point.frame == target_frame {
            return Ok(point.clone());
        }

        let state = self.state.lock();
        let world = self.to_world(&state.pose, point)?;

        let transformed = if target_frame == self.config.world_frame {
            world
        } else if target_frame == self.config.robot_frame {
            state.pose.to_body(&world)
        } else {
            return Err(self.frame_error(&point.frame, target_frame));
        };

        Ok(StampedPoint::new(target_frame, transformed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn square_world() -> SimulatedRobot {
        SimulatedRobot::new(SimConfig {
            start: Point3D::planar(1.0, 1.0),
            polls_per_goal: 1,
            frontiers: vec![Point3D::planar(3.0, 1.0), Point3D::planar(8.0, 8.0)],
            ..Default::default()
        })
    }

    fn square() -> Polygon {
        Polygon::from_xy("map", &[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)])
    }

    #[test]
    fn test_pose_frame_round_trip() {
        let pose = SimPose {
            position: Point3D::planar(2.0, -1.0),
            heading: 0.7,
        };
        let p = Point3D::new(0.3, 1.2, 0.0);
        let back = pose.to_body(&pose.to_world(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-5);
    }

    #[test]
    fn test_forward_axis_follows_heading() {
        // Heading π/2 faces world +x
        let pose = SimPose {
            position: Point3D::ZERO,
            heading: FRAC_PI_2,
        };
        let ahead = pose.to_world(&Point3D::planar(0.0, 1.0));
        assert_relative_eq!(ahead.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(ahead.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_current_position_in_world() {
        let robot = square_world();
        let p = robot
            .current_position("base_link", "map", Duration::from_secs(1))
            .unwrap();
        assert_eq!(p.frame, "map");
        assert_relative_eq!(p.point.x, 1.0);
        assert_relative_eq!(p.point.y, 1.0);
    }

    #[test]
    fn test_unknown_frame_fails() {
        let robot = square_world();
        let result = robot.current_position("base_link", "odom", Duration::from_secs(1));
        assert!(matches!(result, Err(TransformError::Failure { .. })));
    }

    #[test]
    fn test_frontier_query_needs_boundary() {
        let robot = square_world();
        let origin = StampedPoint::new("base_link", Point3D::ZERO);
        assert!(robot.next_frontier(&origin).is_err());

        robot.set_boundary(&square()).unwrap();
        let frontier = robot.next_frontier(&origin).unwrap().unwrap();
        // (8, 8) lies outside the boundary
        assert_eq!(frontier.point, Point3D::planar(3.0, 1.0));
        assert_eq!(frontier.frame, "map");
    }

    #[test]
    fn test_boundary_in_wrong_frame_rejected() {
        let robot = square_world();
        let odom = Polygon::from_xy("odom", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert!(robot.set_boundary(&odom).is_err());
    }

    #[test]
    fn test_goal_completes_after_polls_and_observes() {
        let robot = square_world();
        robot.set_boundary(&square()).unwrap();

        let handle = robot
            .submit(NavigationGoal::new("map", Point3D::planar(2.8, 1.0), FRAC_PI_2))
            .unwrap();
        assert_eq!(robot.status(handle), GoalStatus::Pending);
        assert_eq!(robot.status(handle), GoalStatus::Succeeded);
        assert_eq!(robot.status(handle), GoalStatus::Succeeded);

        let (position, heading) = robot.pose();
        assert_relative_eq!(position.x, 2.8);
        assert_relative_eq!(heading, FRAC_PI_2);
        assert_eq!(robot.unexplored(), vec![Point3D::planar(8.0, 8.0)]);
    }

    #[test]
    fn test_goal_outside_boundary_fails() {
        let robot = square_world();
        robot.set_boundary(&square()).unwrap();

        let handle = robot
            .submit(NavigationGoal::new("map", Point3D::planar(7.0, 7.0), 0.0))
            .unwrap();
        assert_eq!(robot.status(handle), GoalStatus::Failed);
    }

    #[test]
    fn test_cancel_pending_goal() {
        let robot = square_world();
        let handle = robot
            .submit(NavigationGoal::new("map", Point3D::planar(2.0, 2.0), 0.0))
            .unwrap();
        robot.cancel(handle);
        assert_eq!(robot.status(handle), GoalStatus::Cancelled);
        assert_eq!(robot.stats().goals_cancelled, 1);
        assert_eq!(robot.status(GoalHandle(99)), GoalStatus::Failed);
    }

    #[test]
    fn test_finished_goals_are_dropped() {
        let robot = square_world();
        robot.set_boundary(&square()).unwrap();

        for i in 0..20 {
            let x = 1.0 + (i % 3) as f32;
            let handle = robot
                .submit(NavigationGoal::new("map", Point3D::planar(x, 2.0), 0.0))
                .unwrap();
            while robot.status(handle) == GoalStatus::Pending {}
            assert!(robot.state.lock().goals.len() <= 1);
        }

        // A pending goal survives the next submit
        let first = robot
            .submit(NavigationGoal::new("map", Point3D::planar(2.0, 2.0), 0.0))
            .unwrap();
        robot
            .submit(NavigationGoal::new("map", Point3D::planar(3.0, 2.0), 0.0))
            .unwrap();
        assert_eq!(robot.status(first), GoalStatus::Pending);
        assert_eq!(robot.state.lock().goals.len(), 2);
        assert_eq!(robot.stats().goals_succeeded, 20);
    }
}

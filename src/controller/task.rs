//! Exploration task definition and request format.

use serde::{Deserialize, Serialize};

use crate::core::{Point3D, Polygon, StampedPoint};
use crate::error::{KshetraError, Result};

/// Region to explore: a boundary polygon and a center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub boundary: Polygon,
    pub center: StampedPoint,
}

/// One exploration request. Immutable for the lifetime of the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationTask {
    pub region: Region,
}

impl ExplorationTask {
    pub fn new(center: StampedPoint, boundary: Polygon) -> Self {
        Self {
            region: Region { boundary, center },
        }
    }

    /// Reject tasks the controller cannot execute.
    pub fn validate(&self) -> Result<()> {
        let region = &self.region;
        if region.boundary.len() < 3 {
            return Err(KshetraError::InvalidTask(format!(
                "boundary needs at least 3 vertices, got {}",
                region.boundary.len()
            )));
        }
        if region.boundary.frame.is_empty() {
            return Err(KshetraError::InvalidTask(
                "boundary frame is empty".to_string(),
            ));
        }
        if region.center.frame.is_empty() {
            return Err(KshetraError::InvalidTask(
                "center frame is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Center of a [`TaskRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterRequest {
    pub frame: String,
    pub x: f32,
    pub y: f32,
}

/// Boundary of a [`TaskRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRequest {
    pub frame: String,
    /// Polygon vertices as `[x, y]`
    pub points: Vec<[f32; 2]>,
}

/// Wire/config shape of a task:
/// `{center: (frame, x, y), boundary: (frame, [(x, y), ...])}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub center: CenterRequest,
    pub boundary: BoundaryRequest,
}

impl TaskRequest {
    /// Validated task for this request.
    pub fn into_task(self) -> Result<ExplorationTask> {
        let center = StampedPoint::new(
            self.center.frame,
            Point3D::planar(self.center.x, self.center.y),
        );
        let boundary = Polygon::new(
            self.boundary.frame,
            self.boundary
                .points
                .iter()
                .map(|&[x, y]| Point3D::planar(x, y))
                .collect(),
        );
        let task = ExplorationTask::new(center, boundary);
        task.validate()?;
        Ok(task)
    }

    /// The demo room the exploration node submits when started standalone.
    pub fn demo_room() -> Self {
        // Surveyed corners, shifted 0.25m in y to line up with the building map
        const ADJ_Y: f32 = 0.25;
        Self {
            center: CenterRequest {
                frame: "buildingmap".to_string(),
                x: 15.0,
                y: 13.0 + ADJ_Y,
            },
            boundary: BoundaryRequest {
                frame: "buildingmap".to_string(),
                points: vec![
                    [19.3257, 15.7174 + ADJ_Y],
                    [19.8346, 14.6269 + ADJ_Y],
                    [15.4353, 12.2612 + ADJ_Y],
                    [14.2299, 14.2701 + ADJ_Y],
                ],
            },
        }
    }
}

impl Default for TaskRequest {
    fn default() -> Self {
        Self::demo_room()
    }
}

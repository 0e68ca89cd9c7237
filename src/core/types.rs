//! Point and polygon types with reference frames.

use serde::{Deserialize, Serialize};

/// A 3D point in meters.
///
/// Exploration runs on a plane, but frames and collaborators carry `z`
/// so it is interpolated along with `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
    /// Z coordinate in meters
    #[serde(default)]
    pub z: f32,
}

impl Point3D {
    /// Origin of any frame.
    pub const ZERO: Point3D = Point3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a point on the ground plane.
    #[inline]
    pub fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar distance to another point (ignores z).
    #[inline]
    pub fn planar_distance(&self, other: &Point3D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A point tagged with the frame it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedPoint {
    /// Reference frame id
    pub frame: String,
    /// Coordinates in `frame`
    pub point: Point3D,
}

impl StampedPoint {
    pub fn new(frame: impl Into<String>, point: Point3D) -> Self {
        Self {
            frame: frame.into(),
            point,
        }
    }
}

/// Closed polygon in a single reference frame.
///
/// Vertices are taken as given: no simplicity or convexity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Reference frame shared by every vertex
    pub frame: String,
    /// Ordered vertices (implicitly closed)
    pub vertices: Vec<Point3D>,
}

impl Polygon {
    pub fn new(frame: impl Into<String>, vertices: Vec<Point3D>) -> Self {
        Self {
            frame: frame.into(),
            vertices,
        }
    }

    /// Build a planar polygon from `(x, y)` pairs.
    pub fn from_xy(frame: impl Into<String>, points: &[(f32, f32)]) -> Self {
        Self::new(
            frame,
            points.iter().map(|&(x, y)| Point3D::planar(x, y)).collect(),
        )
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Even-odd ray casting test on the x/y plane.
    pub fn contains(&self, point: &Point3D) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

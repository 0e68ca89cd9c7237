//! Core foundation types and math.

pub mod math;
pub mod types;

pub use types::{Point3D, Polygon, StampedPoint};

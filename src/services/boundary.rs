//! Exploration boundary registration.

use super::Service;
use crate::core::Polygon;
use crate::error::Result;

/// Registers or replaces the active exploration boundary.
///
/// After a successful call the working map is clipped to `boundary` and
/// frontier queries only consider cells inside it.
pub trait BoundaryRegistrar: Service {
    fn set_boundary(&self, boundary: &Polygon) -> Result<()>;
}

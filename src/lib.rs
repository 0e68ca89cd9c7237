//! Kshetra - bounded-region frontier exploration for VacuumTiger robots
//!
//! Given a polygonal region and its center, an exploration task registers the
//! region boundary, drives the robot to the center and then repeatedly
//! selects the nearest frontier and drives most of the way toward it, until
//! no frontier is left.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    executor                         │  ← Task intake, preemption
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   controller/                       │  ← Per-task state machine
//! │          (phases, retry budget, cancellation)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │          navigation  ·  geometry                    │  ← Goal lifecycle, waypoints
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   services/                         │  ← Collaborator traits
//! │   (boundary, frontier, navigator, transform)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! [`sim`] provides an in-memory robot implementing every collaborator.

// ============================================================================
// Foundation
// ============================================================================
pub mod core;
pub mod error;
pub mod geometry;

// ============================================================================
// Collaborators
// ============================================================================
pub mod services;
pub mod sim;

// ============================================================================
// Orchestration
// ============================================================================
pub mod config;
pub mod controller;
pub mod executor;
pub mod navigation;

// ============================================================================
// Convenience re-exports
// ============================================================================

pub use config::KshetraConfig;
pub use controller::{
    AbortReason, ControllerConfig, ExplorationContext, ExplorationController, ExplorationPhase,
    ExplorationTask, TaskControl, TaskOutcome, TaskReport, TaskRequest,
};
pub use core::{Point3D, Polygon, StampedPoint};
pub use error::{KshetraError, Result};
pub use executor::{TaskExecutor, TaskHandle, TaskStatus};
pub use navigation::NavigationClient;
pub use services::{
    BoundaryRegistrar, Frontier, FrontierSelector, GoalHandle, GoalStatus, NavigationGoal,
    Navigator, Service, ServiceKind, TransformClient, TransformError,
};
pub use sim::{SimConfig, SimulatedRobot};

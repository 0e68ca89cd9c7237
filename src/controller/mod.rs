//! Exploration task controller.
//!
//! This module provides:
//! - [`ExplorationController`]: the per-task state machine
//! - [`TaskControl`]: lock-guarded phase and cancellation shared with other threads
//! - [`RetryBudget`]: bounded attempts with fixed backoff per step
//! - Task, phase and outcome types

mod context;
mod control;
mod explorer;
mod phase;
mod retry;
mod task;

pub use context::ExplorationContext;
pub use control::TaskControl;
pub use explorer::{ControllerConfig, ExplorationController, TaskReport};
pub use phase::{AbortReason, ExplorationPhase, TaskOutcome};
pub use retry::{DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_LIMIT, RetryBudget};
pub use task::{BoundaryRequest, CenterRequest, ExplorationTask, Region, TaskRequest};

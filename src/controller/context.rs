//! Collaborator capabilities handed to the controller.

use std::sync::Arc;

use crate::services::{BoundaryRegistrar, FrontierSelector, Navigator, TransformClient};

/// The four collaborators an exploration task drives.
///
/// Capabilities are shared: the controller never owns their internal state.
#[derive(Clone)]
pub struct ExplorationContext {
    pub boundary: Arc<dyn BoundaryRegistrar>,
    pub navigator: Arc<dyn Navigator>,
    pub frontiers: Arc<dyn FrontierSelector>,
    pub transforms: Arc<dyn TransformClient>,
}

impl ExplorationContext {
    pub fn new(
        boundary: Arc<dyn BoundaryRegistrar>,
        navigator: Arc<dyn Navigator>,
        frontiers: Arc<dyn FrontierSelector>,
        transforms: Arc<dyn TransformClient>,
    ) -> Self {
        Self {
            boundary,
            navigator,
            frontiers,
            transforms,
        }
    }

    /// Context backed by a single object providing every capability.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: BoundaryRegistrar + Navigator + FrontierSelector + TransformClient + 'static,
    {
        Self {
            boundary: backend.clone(),
            navigator: backend.clone(),
            frontiers: backend.clone(),
            transforms: backend,
        }
    }
}

impl std::fmt::Debug for ExplorationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorationContext").finish_non_exhaustive()
    }
}

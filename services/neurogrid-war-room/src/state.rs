//! Application state shared across handlers

use neurogrid_agents::{ResolverSettings, ResponseResolver};
use neurogrid_desk::Desk;
use neurogrid_llm::BackendRouter;

#[derive(Clone)]
pub struct AppState {
    pub resolver: ResponseResolver,
    pub desk: Desk,
}

impl AppState {
    pub fn new(resolver: ResponseResolver, desk: Desk) -> Self {
        Self { resolver, desk }
    }

    /// No backends and a freshly seeded desk; chat always resolves locally
    pub fn offline() -> Self {
        Self::new(
            ResponseResolver::new(BackendRouter::offline(), ResolverSettings::default()),
            Desk::new(),
        )
    }
}

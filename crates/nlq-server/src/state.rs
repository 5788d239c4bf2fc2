use nlq_runtime::QueryOrchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: QueryOrchestrator,
    /// Page size used when a request does not name one.
    pub default_page_size: u32,
}

impl AppState {
    pub fn new(orchestrator: QueryOrchestrator) -> Self {
        let default_page_size = orchestrator.pagination().default_page_size;
        Self {
            orchestrator,
            default_page_size,
        }
    }
}

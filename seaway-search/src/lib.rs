pub mod orchestrator;
pub mod reconciler;
pub mod request;

pub use orchestrator::SearchOrchestrator;
pub use request::{NormalizedSearch, SearchCriteria};

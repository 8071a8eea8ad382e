/// Scraping job module
///
/// Runs scraping strategies as background jobs and tracks their lifecycle:
/// - Domain: job entities, request validation and the status machine
/// - Infrastructure: in-memory job registry
/// - Orchestrator: job creation, execution, cancellation and health probes
pub mod domain;
pub mod infrastructure;
pub mod orchestrator;

// Re-exports for easy access
pub use domain::{
    entities::{JobConfig, JobId, ScrapingJob, ScrapingJobRequest, ScrapingStats},
    value_objects::{JobStatus, ScrapingMethod},
};
pub use infrastructure::JobStore;
pub use orchestrator::ScrapingOrchestrator;

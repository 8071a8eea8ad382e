pub mod modules;
pub mod shared;

use modules::{
    jobs::ScrapingOrchestrator,
    provider::{PlacesStrategy, RegistryStrategy, ScrapingStrategy},
    school::{SchoolIngestionService, SchoolRepository},
};
use shared::utils::ProxyRotator;
use std::sync::Arc;

pub use modules::jobs::{JobStatus, ScrapingJob, ScrapingJobRequest, ScrapingMethod, ScrapingStats};
pub use shared::{AppError, AppResult, ScraperSettings};

/// Wire both strategies and the ingestion service into an orchestrator.
///
/// The strategies share one proxy pool, so a proxy blocked by one source is
/// skipped by the other too. Each strategy gets its own rate limiter.
pub fn build_orchestrator(
    settings: &ScraperSettings,
    repository: Arc<dyn SchoolRepository>,
) -> AppResult<ScrapingOrchestrator> {
    let proxies = Arc::new(ProxyRotator::from_urls(
        &settings.proxies,
        settings.proxy_block_duration,
    ));
    log::info!(
        "Scraper configured: {} requests/min, {} proxies, {} attempts per request",
        settings.requests_per_minute,
        proxies.len(),
        settings.max_retries
    );

    let strategies: Vec<Arc<dyn ScrapingStrategy>> = vec![
        Arc::new(PlacesStrategy::from_settings(settings, proxies.clone())?),
        Arc::new(RegistryStrategy::from_settings(settings, proxies)?),
    ];
    let ingestion = Arc::new(SchoolIngestionService::new(repository));

    Ok(ScrapingOrchestrator::new(strategies, ingestion))
}

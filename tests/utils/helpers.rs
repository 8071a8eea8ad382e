/// Test helper functions and service builders
use async_trait::async_trait;
use school_finder_lib::modules::jobs::ScrapingOrchestrator;
use school_finder_lib::modules::provider::{FetchClient, ScrapingStrategy};
use school_finder_lib::modules::school::{
    InMemorySchoolRepository, School, SchoolIngestionService, SchoolRating, SchoolRepository,
};
use school_finder_lib::shared::utils::{ProxyRotator, RateLimiter, RetryPolicy};
use school_finder_lib::{AppResult, JobStatus, ScrapingJob};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory catalog that counts writes
#[derive(Default)]
pub struct CountingRepository {
    pub inner: InMemorySchoolRepository,
    upserts: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchoolRepository for CountingRepository {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<School>> {
        self.inner.find_by_external_id(external_id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<School>> {
        self.inner.find_by_name(name).await
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<School>> {
        self.inner.find_by_id(id).await
    }

    async fn upsert(&self, school: School) -> AppResult<School> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(school).await
    }

    async fn upsert_rating(&self, rating: SchoolRating) -> AppResult<()> {
        self.inner.upsert_rating(rating).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }

    async fn count_ratings(&self) -> AppResult<usize> {
        self.inner.count_ratings().await
    }
}

pub struct TestOrchestrator {
    pub orchestrator: ScrapingOrchestrator,
    pub repository: Arc<CountingRepository>,
}

/// Orchestrator over the given strategies with a counting in-memory catalog
pub fn build_orchestrator(strategies: Vec<Arc<dyn ScrapingStrategy>>) -> TestOrchestrator {
    let repository = Arc::new(CountingRepository::new());
    let ingestion = Arc::new(SchoolIngestionService::new(repository.clone()));
    TestOrchestrator {
        orchestrator: ScrapingOrchestrator::new(strategies, ingestion),
        repository,
    }
}

/// Poll until the job reaches a terminal state
pub async fn wait_for_terminal(orchestrator: &ScrapingOrchestrator, job_id: &str) -> ScrapingJob {
    wait_until(orchestrator, job_id, |job| job.is_terminal()).await
}

pub async fn wait_for_status(
    orchestrator: &ScrapingOrchestrator,
    job_id: &str,
    status: JobStatus,
) -> ScrapingJob {
    wait_until(orchestrator, job_id, |job| job.status == status).await
}

async fn wait_until<F>(orchestrator: &ScrapingOrchestrator, job_id: &str, condition: F) -> ScrapingJob
where
    F: Fn(&ScrapingJob) -> bool,
{
    let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;
    loop {
        let job = orchestrator
            .get_job_status(job_id)
            .unwrap_or_else(|| panic!("job {} not found", job_id));
        if condition(&job) {
            return job;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("job {} stuck in {:?}", job_id, job);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Fetch client with millisecond pacing and backoff
pub fn fast_client(proxies: Arc<ProxyRotator>, max_attempts: u32) -> FetchClient {
    FetchClient::new(
        "test",
        RateLimiter::new(60_000),
        proxies,
        fast_retry_policy(max_attempts),
        Duration::from_secs(5),
    )
    .unwrap()
}

pub fn fast_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::scraping()
        .with_max_attempts(max_attempts)
        .with_base_delay(Duration::from_millis(5))
        .with_error_delay(Duration::from_millis(5))
}

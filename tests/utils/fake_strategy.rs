/// Scriptable strategy for orchestrator tests
use async_trait::async_trait;
use school_finder_lib::modules::provider::{
    ProgressCallback, ScrapeProgress, ScrapeRequest, ScrapedRecord, ScrapingSource,
    ScrapingStrategy,
};
use school_finder_lib::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Return this many records (before the request limit is applied)
    Records(usize),
    Fail(String),
    Panic,
}

pub struct FakeStrategy {
    source: ScrapingSource,
    outcome: Outcome,
    /// Percentages reported in order, one per step
    progress: Vec<u8>,
    step_delay: Duration,
    healthy: Option<bool>,
    calls: AtomicUsize,
    progress_seen: Mutex<Vec<u8>>,
}

impl FakeStrategy {
    pub fn new(source: ScrapingSource, outcome: Outcome) -> Self {
        Self {
            source,
            outcome,
            progress: vec![50, 100],
            step_delay: Duration::ZERO,
            healthy: Some(true),
            calls: AtomicUsize::new(0),
            progress_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(source: ScrapingSource, records: usize) -> Self {
        Self::new(source, Outcome::Records(records))
    }

    pub fn failing(source: ScrapingSource, message: &str) -> Self {
        Self::new(source, Outcome::Fail(message.to_string()))
    }

    pub fn with_progress(mut self, progress: &[u8]) -> Self {
        self.progress = progress.to_vec();
        self
    }

    /// Sleep before each progress step; gives tests a window to stop the job
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// `None` makes `test_connection` return an error
    pub fn with_health(mut self, healthy: Option<bool>) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn progress_seen(&self) -> Vec<u8> {
        self.progress_seen.lock().unwrap().clone()
    }

    fn records(&self, count: usize) -> Vec<ScrapedRecord> {
        (0..count)
            .map(|i| {
                ScrapedRecord::new(&format!("{} school {}", self.source, i), self.source)
                    .with_external_id(&format!("{}:{}", self.source, i))
                    .with_address(&format!("ul. Szkolna {}", i + 1))
            })
            .collect()
    }
}

#[async_trait]
impl ScrapingStrategy for FakeStrategy {
    fn source(&self) -> ScrapingSource {
        self.source
    }

    fn name(&self) -> &str {
        self.source.display_name()
    }

    async fn scrape(
        &self,
        request: &ScrapeRequest,
        on_progress: ProgressCallback,
    ) -> AppResult<Vec<ScrapedRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        for percentage in &self.progress {
            if request.is_cancelled() {
                return Ok(Vec::new());
            }
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            self.progress_seen.lock().unwrap().push(*percentage);
            on_progress(ScrapeProgress::new(0, 1, None).with_percentage(*percentage));
        }

        match &self.outcome {
            Outcome::Records(count) => {
                let mut records = self.records(*count);
                request.truncate(&mut records);
                Ok(records)
            }
            Outcome::Fail(message) => Err(AppError::ExternalServiceError(message.clone())),
            Outcome::Panic => panic!("strategy exploded"),
        }
    }

    async fn test_connection(&self) -> AppResult<bool> {
        self.healthy
            .ok_or_else(|| AppError::ExternalServiceError("probe failed".to_string()))
    }
}

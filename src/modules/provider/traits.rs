use crate::modules::provider::domain::{ScrapedRecord, ScrapingSource};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Receives progress updates while a strategy runs
pub type ProgressCallback = Arc<dyn Fn(ScrapeProgress) + Send + Sync>;

/// A pluggable backend that fetches and normalizes school records from one source
#[async_trait]
pub trait ScrapingStrategy: Send + Sync {
    fn source(&self) -> ScrapingSource;

    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Scrape all requested regions.
    ///
    /// Failures of a single region or record are logged and skipped; the
    /// strategy returns whatever it collected. Returns early (with the records
    /// so far) once `request.cancellation` is cancelled.
    async fn scrape(
        &self,
        request: &ScrapeRequest,
        on_progress: ProgressCallback,
    ) -> AppResult<Vec<ScrapedRecord>>;

    /// Lightweight probe of the backend
    async fn test_connection(&self) -> AppResult<bool>;
}

/// Work handed to a single strategy run
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub regions: Vec<String>,
    /// Maximum records to return; 0 means no limit
    pub limit: u32,
    pub cancellation: CancellationToken,
}

impl ScrapeRequest {
    pub fn new(regions: Vec<String>, limit: u32) -> Self {
        Self {
            regions,
            limit,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn limit_reached(&self, collected: usize) -> bool {
        self.limit > 0 && collected >= self.limit as usize
    }

    /// Drop anything collected beyond the limit
    pub fn truncate(&self, records: &mut Vec<ScrapedRecord>) {
        if self.limit > 0 {
            records.truncate(self.limit as usize);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeProgress {
    /// 0-100 within the reporting strategy's own range
    pub percentage: u8,
    pub processed: usize,
    pub total: usize,
    pub message: Option<String>,
}

impl ScrapeProgress {
    pub fn new(processed: usize, total: usize, message: Option<String>) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((processed.min(total) * 100) / total) as u8
        };
        Self {
            percentage,
            processed,
            total,
            message,
        }
    }

    pub fn with_percentage(mut self, percentage: u8) -> Self {
        self.percentage = percentage.min(100);
        self
    }
}

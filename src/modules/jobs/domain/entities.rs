/// Domain entities for scraping jobs
///
/// A job is a transient coordination object: it tracks one run of one or more
/// strategies over a set of regions. The catalog itself lives in storage.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{JobStatus, ScrapingMethod};
use crate::shared::errors::AppError;
use crate::shared::utils::validation::Validator;

pub type JobId = String;

/// Incoming request, as sent by the admin surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingJobRequest {
    pub method: String,
    pub regions: Vec<String>,
    pub limit: i64,
    /// Scrape but skip persistence
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub preferred_method: Option<String>,
}

impl ScrapingJobRequest {
    pub fn new(method: &str, regions: &[&str], limit: i64) -> Self {
        Self {
            method: method.to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            limit,
            test_mode: false,
            preferred_method: None,
        }
    }

    pub fn dry_run(mut self) -> Self {
        self.test_mode = true;
        self
    }

    pub fn prefer(mut self, method: &str) -> Self {
        self.preferred_method = Some(method.to_string());
        self
    }
}

/// Validated, immutable snapshot of the request a job was created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub method: ScrapingMethod,
    pub regions: Vec<String>,
    /// Per-strategy record cap; 0 means no limit
    pub limit: u32,
    pub test_mode: bool,
    pub preferred_method: Option<ScrapingMethod>,
}

impl TryFrom<ScrapingJobRequest> for JobConfig {
    type Error = AppError;

    fn try_from(request: ScrapingJobRequest) -> Result<Self, Self::Error> {
        let method: ScrapingMethod = request.method.parse()?;
        let regions = Validator::validate_regions(&request.regions)?;
        let limit = Validator::validate_limit(request.limit)?;

        let preferred_method = match request.preferred_method.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<ScrapingMethod>()? {
                ScrapingMethod::All => {
                    return Err(AppError::ValidationError(
                        "Preferred method must name a single strategy".to_string(),
                    ))
                }
                single => Some(single),
            },
        };

        Ok(Self {
            method,
            regions,
            limit,
            test_mode: request.test_mode,
            preferred_method,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingJob {
    pub id: JobId,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    /// 0-100, never decreases
    pub progress: u8,
    /// Size of the final result set; meaningful once the job has finished
    pub schools_processed: usize,
    /// Upper bound (`limit * strategies`); 0 when unlimited
    pub total_schools: usize,
    pub error_message: Option<String>,
    pub config: JobConfig,
}

impl ScrapingJob {
    pub fn new(config: JobConfig, strategy_count: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            failed_at: None,
            progress: 0,
            schools_processed: 0,
            total_schools: config.limit as usize * strategy_count,
            error_message: None,
            config,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// When the job reached a terminal state
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.failed_at)
    }
}

/// Snapshot of the registry; every job sits in exactly one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingStats {
    pub total_jobs: usize,
    pub pending_jobs: usize,
    pub running_jobs: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
    pub cancelled_jobs: usize,
    pub total_records_processed: usize,
}

impl ScrapingStats {
    pub fn bucket_sum(&self) -> usize {
        self.pending_jobs
            + self.running_jobs
            + self.completed_jobs
            + self.failed_jobs
            + self.cancelled_jobs
    }
}

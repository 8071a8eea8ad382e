/// Value objects for the scraping job domain
use crate::modules::provider::domain::ScrapingSource;
use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};

/// Lifecycle of a scraping job: `pending -> running -> {completed | failed | cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Allowed edges of the lifecycle; terminal states have none
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Pending, JobStatus::Cancelled)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Which strategies a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapingMethod {
    /// Place-data search only
    Places,
    /// National registry only
    Registry,
    /// Every registered strategy
    All,
}

impl ScrapingMethod {
    /// The single source this method selects; `None` for `All`
    pub fn source(&self) -> Option<ScrapingSource> {
        match self {
            ScrapingMethod::Places => Some(ScrapingSource::Places),
            ScrapingMethod::Registry => Some(ScrapingSource::Registry),
            ScrapingMethod::All => None,
        }
    }
}

impl std::fmt::Display for ScrapingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapingMethod::Places => write!(f, "places"),
            ScrapingMethod::Registry => write!(f, "registry"),
            ScrapingMethod::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for ScrapingMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "places" => Ok(ScrapingMethod::Places),
            "registry" => Ok(ScrapingMethod::Registry),
            "all" => Ok(ScrapingMethod::All),
            _ => Err(AppError::ValidationError(format!(
                "Unknown scraping method '{}' (expected places, registry or all)",
                s
            ))),
        }
    }
}

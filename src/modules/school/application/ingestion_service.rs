use crate::modules::provider::domain::ScrapedRecord;
use crate::modules::school::domain::{School, SchoolRating, SchoolRepository};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::shared::utils::retry_policy::RetryPolicy;
use crate::{log_debug, log_info, log_warn};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub ratings_upserted: usize,
    pub failures: Vec<IngestionFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} skipped, {} failed, {} ratings",
            self.created, self.updated, self.skipped, self.failed, self.ratings_upserted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveOutcome {
    Created,
    Updated { rating_saved: bool },
}

/// Merges scraped records into the catalog.
///
/// Identity is the external id when present, otherwise the exact name. Every
/// storage write runs through the persistence retry policy; a record that
/// still fails is counted and logged without stopping the batch.
#[derive(Clone)]
pub struct SchoolIngestionService {
    repository: Arc<dyn SchoolRepository>,
    retry_policy: RetryPolicy,
}

impl SchoolIngestionService {
    pub fn new(repository: Arc<dyn SchoolRepository>) -> Self {
        Self {
            repository,
            retry_policy: RetryPolicy::persistence(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub async fn save_results(&self, records: &[ScrapedRecord]) -> IngestionSummary {
        self.save_results_until(records, &CancellationToken::new())
            .await
    }

    /// Like `save_results`, but stops before the next record once `cancellation` fires.
    /// Writes already made are kept.
    pub async fn save_results_until(
        &self,
        records: &[ScrapedRecord],
        cancellation: &CancellationToken,
    ) -> IngestionSummary {
        let timer = TimedOperation::new("save_scraping_results");
        let mut summary = IngestionSummary::default();
        let total = records.len();

        for (index, record) in records.iter().enumerate() {
            if cancellation.is_cancelled() {
                log_info!("Ingestion cancelled after {} of {} records", index, total);
                break;
            }

            LogContext::ingestion_progress(index + 1, total, &record.name);

            if !record.has_identity() {
                log_warn!("Skipping record without name or external id from {}", record.source);
                summary.skipped += 1;
                continue;
            }

            match self.save_record(record).await {
                Ok(SaveOutcome::Created) => summary.created += 1,
                Ok(SaveOutcome::Updated { rating_saved }) => {
                    summary.updated += 1;
                    if rating_saved {
                        summary.ratings_upserted += 1;
                    }
                }
                Err(e) => {
                    LogContext::error_with_context(
                        &e,
                        &format!("Failed to save school '{}'", record.name),
                    );
                    summary.failed += 1;
                    summary.failures.push(IngestionFailure {
                        name: record.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        log_info!("Ingestion finished: {}", summary);
        timer.finish_with_records(total);
        summary
    }

    async fn save_record(&self, record: &ScrapedRecord) -> AppResult<SaveOutcome> {
        match self.find_existing(record).await? {
            Some(mut school) => {
                school.apply_update(record);
                let saved = self.upsert(school).await?;
                log_debug!("Updated school '{}' ({})", saved.name, saved.id);

                let rating_saved = self.save_rating(&saved, record).await;
                Ok(SaveOutcome::Updated { rating_saved })
            }
            None => {
                let saved = self.upsert(School::from_record(record)).await?;
                log_debug!("Created school '{}' ({})", saved.name, saved.id);
                Ok(SaveOutcome::Created)
            }
        }
    }

    async fn find_existing(&self, record: &ScrapedRecord) -> AppResult<Option<School>> {
        if let Some(external_id) = record.external_id.as_deref().filter(|id| !id.is_empty()) {
            let found = self
                .retry_policy
                .run("find_school_by_external_id", || {
                    self.repository.find_by_external_id(external_id)
                })
                .await?;
            if found.is_some() {
                return Ok(found);
            }
        }

        let name = record.name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        self.retry_policy
            .run("find_school_by_name", || self.repository.find_by_name(name))
            .await
    }

    async fn upsert(&self, school: School) -> AppResult<School> {
        self.retry_policy
            .run("upsert_school", || self.repository.upsert(school.clone()))
            .await
    }

    /// Upsert the rating of a matched school; failures are logged only
    async fn save_rating(&self, school: &School, record: &ScrapedRecord) -> bool {
        let Some(value) = record.rating else {
            return false;
        };
        if !SchoolRating::is_valid_value(value) {
            log_warn!("Ignoring rating {} for '{}': outside 0-5", value, school.name);
            return false;
        }

        let key = record.external_id.as_deref().unwrap_or(&record.name);
        let rating = SchoolRating {
            school_id: school.id,
            review_id: SchoolRating::review_id_for(record.source, key),
            source: record.source,
            rating: value,
            ratings_count: record.ratings_count,
            updated_at: Utc::now(),
        };

        match self
            .retry_policy
            .run("upsert_school_rating", || {
                self.repository.upsert_rating(rating.clone())
            })
            .await
        {
            Ok(()) => true,
            Err(e) => {
                LogContext::error_with_context(
                    &e,
                    &format!("Failed to save rating for '{}'", school.name),
                );
                false
            }
        }
    }
}

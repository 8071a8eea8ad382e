/// Scraping job orchestrator
///
/// Creates jobs, runs the selected strategies on a background task, maps their
/// progress into the job's 0-100 range and hands the collected records to the
/// ingestion service. Each job's execution future is spawned with `tokio::spawn`
/// and a supervising task awaits its handle; that outcome alone decides the
/// terminal state.
use crate::modules::jobs::domain::entities::{
    JobConfig, JobId, ScrapingJob, ScrapingJobRequest, ScrapingStats,
};
use crate::modules::jobs::domain::value_objects::ScrapingMethod;
use crate::modules::jobs::infrastructure::JobStore;
use crate::modules::provider::traits::{
    ProgressCallback, ScrapeProgress, ScrapeRequest, ScrapingStrategy,
};
use crate::modules::school::SchoolIngestionService;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_debug, log_error, log_info, log_warn};

use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct ScrapingOrchestrator {
    store: Arc<JobStore>,
    strategies: Vec<Arc<dyn ScrapingStrategy>>,
    ingestion: Arc<SchoolIngestionService>,
    cancellations: Arc<DashMap<JobId, CancellationToken>>,
}

/// Everything a spawned execution needs, owned
struct JobRun {
    job_id: JobId,
    config: JobConfig,
    strategies: Vec<Arc<dyn ScrapingStrategy>>,
    store: Arc<JobStore>,
    ingestion: Arc<SchoolIngestionService>,
    cancellation: CancellationToken,
}

impl ScrapingOrchestrator {
    /// Strategies run in registration order
    pub fn new(
        strategies: Vec<Arc<dyn ScrapingStrategy>>,
        ingestion: Arc<SchoolIngestionService>,
    ) -> Self {
        Self {
            store: Arc::new(JobStore::new()),
            strategies,
            ingestion,
            cancellations: Arc::new(DashMap::new()),
        }
    }

    /// Validate the request, register a pending job and start it in the background
    pub async fn start_job(&self, request: ScrapingJobRequest) -> AppResult<JobId> {
        let config = JobConfig::try_from(request)?;
        let strategies = self.select_strategies(&config)?;

        let job = ScrapingJob::new(config.clone(), strategies.len());
        let job_id = job.id.clone();
        self.store.insert(job);

        let cancellation = CancellationToken::new();
        self.cancellations
            .insert(job_id.clone(), cancellation.clone());

        log_info!(
            "Starting scraping job {} (method: {}, regions: {:?}, limit: {}, dry run: {})",
            job_id,
            config.method,
            config.regions,
            config.limit,
            config.test_mode
        );

        let run = JobRun {
            job_id: job_id.clone(),
            config,
            strategies,
            store: self.store.clone(),
            ingestion: self.ingestion.clone(),
            cancellation,
        };
        let handle = tokio::spawn(execute_job(run));
        tokio::spawn(supervise(
            job_id.clone(),
            handle,
            self.store.clone(),
            self.cancellations.clone(),
        ));

        Ok(job_id)
    }

    pub fn get_job_status(&self, job_id: &str) -> Option<ScrapingJob> {
        self.store.get(job_id)
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.store.statistics()
    }

    /// Jobs, newest first
    pub fn list_jobs(&self) -> Vec<ScrapingJob> {
        self.store.list()
    }

    /// Cancel a pending or running job; false for unknown or finished jobs.
    ///
    /// The job is marked cancelled right away. The running strategy notices at
    /// its next checkpoint; in-flight requests are not aborted.
    pub fn stop_job(&self, job_id: &str) -> bool {
        if !self.store.mark_cancelled(job_id) {
            log_debug!("Stop ignored for job {}: not active", job_id);
            return false;
        }

        if let Some(token) = self.cancellations.get(job_id) {
            token.cancel();
        }
        log_info!("Job {} cancelled", job_id);
        true
    }

    /// Probe every registered strategy; an error or panic counts as `false`
    pub async fn test_all_connections(&self) -> HashMap<String, bool> {
        let probes = self.strategies.iter().map(|strategy| {
            let strategy = strategy.clone();
            async move {
                let source = strategy.source().as_str().to_string();
                let name = strategy.name().to_string();
                let started = Instant::now();
                let outcome = tokio::spawn(async move { strategy.test_connection().await }).await;

                let healthy = match outcome {
                    Ok(Ok(healthy)) => healthy,
                    Ok(Err(e)) => {
                        log_warn!("Connection test for {} failed: {}", name, e);
                        false
                    }
                    Err(e) => {
                        log_error!("Connection test for {} panicked: {}", name, e);
                        false
                    }
                };
                LogContext::api_call(
                    &name,
                    "connection test",
                    if healthy { "ok" } else { "down" },
                    Some(started.elapsed().as_millis() as u64),
                );
                (source, healthy)
            }
        });

        join_all(probes).await.into_iter().collect()
    }

    /// Remove finished jobs older than `retention`; returns how many were dropped
    pub fn cleanup_finished_jobs(&self, retention: Duration) -> usize {
        let removed = self.store.cleanup_finished(retention);
        if removed > 0 {
            log_info!("Cleaned up {} finished jobs", removed);
        }
        removed
    }

    fn select_strategies(&self, config: &JobConfig) -> AppResult<Vec<Arc<dyn ScrapingStrategy>>> {
        let mut selected: Vec<Arc<dyn ScrapingStrategy>> = match config.method.source() {
            Some(source) => self
                .strategies
                .iter()
                .filter(|s| s.source() == source)
                .cloned()
                .collect(),
            None => self.strategies.clone(),
        };

        if selected.is_empty() {
            return Err(AppError::ValidationError(format!(
                "No strategy registered for method '{}'",
                config.method
            )));
        }

        if config.method == ScrapingMethod::All {
            if let Some(preferred) = config.preferred_method.and_then(|m| m.source()) {
                if let Some(position) = selected.iter().position(|s| s.source() == preferred) {
                    let strategy = selected.remove(position);
                    selected.insert(0, strategy);
                }
            }
        }

        Ok(selected)
    }
}

/// Slice `index` of `count` covers `[100*index/count, 100*(index+1)/count]`
fn map_progress(index: usize, count: usize, percentage: u8) -> u8 {
    let count = count.max(1);
    let percentage = percentage.min(100) as usize;
    ((100 * index + percentage) / count).min(100) as u8
}

fn progress_callback(
    store: Arc<JobStore>,
    job_id: JobId,
    source_name: String,
    index: usize,
    count: usize,
) -> ProgressCallback {
    Arc::new(move |progress: ScrapeProgress| {
        let mapped = map_progress(index, count, progress.percentage);
        if let Some(stored) = store.record_progress(&job_id, mapped) {
            LogContext::scrape_progress(
                &job_id,
                &source_name,
                stored,
                progress.message.as_deref(),
            );
        }
    })
}

/// Run the strategies in order and persist; returns the result-set size
async fn execute_job(run: JobRun) -> AppResult<usize> {
    let JobRun {
        job_id,
        config,
        strategies,
        store,
        ingestion,
        cancellation,
    } = run;

    if !store.mark_running(&job_id) {
        return Err(AppError::Cancelled(job_id));
    }

    let timer = TimedOperation::new(&format!("scraping_job {}", job_id));
    let count = strategies.len();
    let mut results = Vec::new();

    for (index, strategy) in strategies.iter().enumerate() {
        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled(job_id));
        }

        log_info!(
            "Job {}: running {} ({}/{})",
            job_id,
            strategy.name(),
            index + 1,
            count
        );

        let request = ScrapeRequest::new(config.regions.clone(), config.limit)
            .with_cancellation(cancellation.clone());
        let on_progress = progress_callback(
            store.clone(),
            job_id.clone(),
            strategy.name().to_string(),
            index,
            count,
        );

        let mut records = strategy
            .scrape(&request, on_progress)
            .await
            .map_err(|e| {
                log_error!("Job {}: {} failed: {}", job_id, strategy.name(), e);
                e
            })?;

        request.truncate(&mut records);
        store.record_progress(&job_id, map_progress(index, count, 100));
        log_info!(
            "Job {}: {} returned {} records",
            job_id,
            strategy.name(),
            records.len()
        );
        results.append(&mut records);
    }

    if cancellation.is_cancelled() {
        return Err(AppError::Cancelled(job_id));
    }

    if config.test_mode {
        log_info!(
            "Job {}: dry run, skipping persistence of {} records",
            job_id,
            results.len()
        );
    } else {
        let summary = ingestion.save_results_until(&results, &cancellation).await;
        log_info!("Job {}: persisted ({})", job_id, summary);
        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled(job_id));
        }
    }

    timer.finish_with_records(results.len());
    Ok(results.len())
}

async fn supervise(
    job_id: JobId,
    handle: JoinHandle<AppResult<usize>>,
    store: Arc<JobStore>,
    cancellations: Arc<DashMap<JobId, CancellationToken>>,
) {
    let outcome = handle.await;
    cancellations.remove(&job_id);

    match outcome {
        Ok(Ok(processed)) => {
            if store.mark_completed(&job_id, processed) {
                log_info!("Job {} completed with {} records", job_id, processed);
            } else {
                log_debug!("Job {} finished after being stopped; result discarded", job_id);
            }
        }
        Ok(Err(e)) if e.is_cancelled() => {
            log_info!("Job {} stopped before completion", job_id);
        }
        Ok(Err(e)) => {
            store.mark_failed(&job_id, &e.to_string());
            log_error!("Job {} failed: {}", job_id, e);
        }
        Err(join_error) => {
            let message = format!("Job task aborted: {}", join_error);
            store.mark_failed(&job_id, &message);
            log_error!("Job {}: {}", job_id, message);
        }
    }
}

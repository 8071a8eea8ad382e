/// In-memory registry of scraping jobs
///
/// Jobs live only for the lifetime of the process. Every state change goes
/// through a transition method that checks the lifecycle edge under the write
/// lock, so concurrent updates cannot move a job backwards or out of a
/// terminal state.
use crate::modules::jobs::domain::entities::{JobId, ScrapingJob, ScrapingStats};
use crate::modules::jobs::domain::value_objects::JobStatus;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, ScrapingJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only copy of a job
    pub fn get(&self, job_id: &str) -> Option<ScrapingJob> {
        self.read().get(job_id).cloned()
    }

    /// All jobs, newest first
    pub fn list(&self) -> Vec<ScrapingJob> {
        let mut jobs: Vec<ScrapingJob> = self.read().values().cloned().collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts taken under a single read lock
    pub fn statistics(&self) -> ScrapingStats {
        let jobs = self.read();
        let mut stats = ScrapingStats {
            total_jobs: jobs.len(),
            ..ScrapingStats::default()
        };

        for job in jobs.values() {
            match job.status {
                JobStatus::Pending => stats.pending_jobs += 1,
                JobStatus::Running => stats.running_jobs += 1,
                JobStatus::Completed => stats.completed_jobs += 1,
                JobStatus::Failed => stats.failed_jobs += 1,
                JobStatus::Cancelled => stats.cancelled_jobs += 1,
            }
            stats.total_records_processed += job.schools_processed;
        }

        stats
    }

    pub(crate) fn insert(&self, job: ScrapingJob) {
        self.write().insert(job.id.clone(), job);
    }

    pub(crate) fn mark_running(&self, job_id: &str) -> bool {
        self.transition(job_id, JobStatus::Running, |_| {})
    }

    /// Raise progress of a running job; returns the stored value
    pub(crate) fn record_progress(&self, job_id: &str, progress: u8) -> Option<u8> {
        let mut jobs = self.write();
        let job = jobs.get_mut(job_id)?;
        if job.status != JobStatus::Running {
            return None;
        }
        job.progress = job.progress.max(progress.min(100));
        Some(job.progress)
    }

    pub(crate) fn mark_completed(&self, job_id: &str, schools_processed: usize) -> bool {
        self.transition(job_id, JobStatus::Completed, |job| {
            job.progress = 100;
            job.schools_processed = schools_processed;
            job.completed_at = Some(Utc::now());
        })
    }

    pub(crate) fn mark_failed(&self, job_id: &str, error_message: &str) -> bool {
        self.transition(job_id, JobStatus::Failed, |job| {
            job.failed_at = Some(Utc::now());
            job.error_message = Some(error_message.to_string());
        })
    }

    pub(crate) fn mark_cancelled(&self, job_id: &str) -> bool {
        self.transition(job_id, JobStatus::Cancelled, |job| {
            job.completed_at = Some(Utc::now());
        })
    }

    /// Drop terminal jobs that finished more than `retention` ago
    pub(crate) fn cleanup_finished(&self, retention: Duration) -> usize {
        let retention =
            chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff = Utc::now() - retention;

        let mut jobs = self.write();
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at() {
            Some(finished) if job.is_terminal() => finished > cutoff,
            _ => true,
        });
        before - jobs.len()
    }

    fn transition<F>(&self, job_id: &str, next: JobStatus, apply: F) -> bool
    where
        F: FnOnce(&mut ScrapingJob),
    {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(job_id) else {
            return false;
        };
        if !job.status.can_transition_to(next) {
            log::debug!(
                "Job {}: ignoring transition {} -> {}",
                job_id,
                job.status,
                next
            );
            return false;
        }
        job.status = next;
        apply(job);
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, ScrapingJob>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, ScrapingJob>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

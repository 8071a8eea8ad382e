use crate::shared::errors::AppError;
use log::{debug, error, info};
use std::sync::Once;
use std::time::{Duration, Instant};

static INIT: Once = Once::new();

/// Initialize the logging system
/// This should be called once at application startup
pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("school_finder_lib", log::LevelFilter::Debug) // More verbose for our crate
            .filter_module("reqwest", log::LevelFilter::Warn) // Reduce HTTP noise
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("tokio", log::LevelFilter::Warn) // Reduce tokio noise
            .parse_default_env() // RUST_LOG wins over the defaults above
            .format_timestamp_secs()
            .format_module_path(false)
            .init();

        info!("Logging system initialized");
    });
}

/// Macro for structured logging with context
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

/// Logging helpers shared by the scraping pipeline
pub struct LogContext;

impl LogContext {
    /// Outbound call to a scraping source; `None` marks the start of the call
    pub fn api_call(source: &str, endpoint: &str, status: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => info!("API: {} {} {} in {}ms", source, endpoint, status, duration),
            None => debug!("API: Starting {} {}", source, endpoint),
        }
    }

    pub fn scrape_progress(job_id: &str, source: &str, percentage: u8, message: Option<&str>) {
        match message {
            Some(msg) => debug!("Job {}: {} at {}% ({})", job_id, source, percentage, msg),
            None => debug!("Job {}: {} at {}%", job_id, source, percentage),
        }
    }

    pub fn ingestion_progress(current: usize, total: usize, name: &str) {
        debug!("Ingest: [{}/{}] Processing '{}'", current, total, name);
    }

    pub fn error_with_context(error: &AppError, context: &str) {
        error!("{}: {}", context, error);
    }
}

/// Times a job or batch and logs the record count it handled
pub struct TimedOperation {
    start: Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish_with_records(self, records: usize) -> Duration {
        let elapsed = self.start.elapsed();
        info!(
            "Performance: {} took {}ms ({} records)",
            self.operation,
            elapsed.as_millis(),
            records
        );
        elapsed
    }
}

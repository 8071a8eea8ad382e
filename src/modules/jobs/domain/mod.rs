pub mod entities;
pub mod value_objects;

pub use entities::{JobConfig, JobId, ScrapingJob, ScrapingJobRequest, ScrapingStats};
pub use value_objects::{JobStatus, ScrapingMethod};

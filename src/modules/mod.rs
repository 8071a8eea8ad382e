pub mod jobs;
pub mod provider;
pub mod school;

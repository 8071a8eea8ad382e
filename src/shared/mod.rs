// Shared kernel used by every module

pub mod config; // Environment-driven settings
pub mod errors; // Shared error types
pub mod utils; // Rate limiting, proxies, retries, logging, validation

pub use config::ScraperSettings;
pub use errors::{AppError, AppResult};

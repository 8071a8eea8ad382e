pub mod domain;
pub mod infrastructure;
pub mod traits;

pub use domain::{ContactInfo, Coordinates, ScrapedRecord, ScrapingSource};
pub use infrastructure::{FetchClient, FetchRequest, PlacesStrategy, RegistryStrategy};
pub use traits::{ProgressCallback, ScrapeProgress, ScrapeRequest, ScrapingStrategy};

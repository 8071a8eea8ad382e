pub mod scraped_record;

pub use scraped_record::{ContactInfo, Coordinates, ScrapedRecord};

pub mod entities;
pub mod value_objects;

pub use entities::{ContactInfo, Coordinates, ScrapedRecord};
pub use value_objects::ScrapingSource;

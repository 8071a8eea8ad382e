pub mod scraping_source;

pub use scraping_source::ScrapingSource;

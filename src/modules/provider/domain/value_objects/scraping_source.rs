use serde::{Deserialize, Serialize};
use std::fmt;

/// Backends a scraping strategy can pull school records from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScrapingSource {
    /// Place-data search (Google Places text search)
    #[serde(rename = "places")]
    Places,
    /// National school registry (RSPO)
    #[serde(rename = "registry")]
    Registry,
}

impl ScrapingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapingSource::Places => "places",
            ScrapingSource::Registry => "registry",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScrapingSource::Places => "Google Places",
            ScrapingSource::Registry => "RSPO",
        }
    }
}

impl fmt::Display for ScrapingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use crate::modules::provider::domain::value_objects::ScrapingSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.website.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `None` for values outside the valid latitude/longitude ranges
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// One raw institution observation produced by a strategy, before merging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRecord {
    pub name: String,
    pub address: String,
    pub contact: Option<ContactInfo>,
    pub coordinates: Option<Coordinates>,
    /// Source-side identifier (Google place id, `rspo:<number>`)
    pub external_id: Option<String>,
    /// Raw institution type label as reported by the source
    pub institution_type: Option<String>,
    pub rating: Option<f64>,
    pub ratings_count: Option<u32>,
    pub source_url: Option<String>,
    pub source: ScrapingSource,
}

impl ScrapedRecord {
    pub fn new(name: &str, source: ScrapingSource) -> Self {
        Self {
            name: name.to_string(),
            address: String::new(),
            contact: None,
            coordinates: None,
            external_id: None,
            institution_type: None,
            rating: None,
            ratings_count: None,
            source_url: None,
            source,
        }
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn with_external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = (!contact.is_empty()).then_some(contact);
        self
    }

    pub fn with_coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn with_institution_type(mut self, institution_type: &str) -> Self {
        self.institution_type = Some(institution_type.to_string());
        self
    }

    pub fn with_rating(mut self, rating: f64, ratings_count: Option<u32>) -> Self {
        self.rating = Some(rating);
        self.ratings_count = ratings_count;
        self
    }

    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }

    /// Identity used for merging: external id first, then the exact name
    pub fn has_identity(&self) -> bool {
        self.external_id.as_deref().is_some_and(|id| !id.trim().is_empty())
            || !self.name.trim().is_empty()
    }
}

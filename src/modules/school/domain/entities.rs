use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::SchoolType;
use crate::modules::provider::domain::{ContactInfo, Coordinates, ScrapedRecord, ScrapingSource};

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub school_type: SchoolType,
    pub address: String,
    pub contact: ContactInfo,
    pub coordinates: Option<Coordinates>,
    /// Secondary lookup key from the source (place id, `rspo:<number>`)
    pub external_id: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    /// New catalog entry with a fresh id
    pub fn from_record(record: &ScrapedRecord) -> Self {
        let now = Utc::now();
        let school_type = record
            .institution_type
            .as_deref()
            .and_then(SchoolType::from_label)
            .or_else(|| SchoolType::from_label(&record.name))
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            name: record.name.trim().to_string(),
            school_type,
            address: record.address.clone(),
            contact: record.contact.clone().unwrap_or_default(),
            coordinates: record.coordinates,
            external_id: record.external_id.clone(),
            source_url: record.source_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the mutable fields from a newer observation.
    ///
    /// Id, name and type stay as stored; empty values in the record never
    /// erase stored data; the external id is only filled in when missing.
    pub fn apply_update(&mut self, record: &ScrapedRecord) {
        if !record.address.trim().is_empty() {
            self.address = record.address.clone();
        }

        if let Some(contact) = &record.contact {
            if contact.phone.is_some() {
                self.contact.phone = contact.phone.clone();
            }
            if contact.email.is_some() {
                self.contact.email = contact.email.clone();
            }
            if contact.website.is_some() {
                self.contact.website = contact.website.clone();
            }
        }

        if record.coordinates.is_some() {
            self.coordinates = record.coordinates;
        }

        if self.external_id.is_none() {
            self.external_id = record.external_id.clone();
        }

        if self.source_url.is_none() {
            self.source_url = record.source_url.clone();
        }

        self.updated_at = Utc::now();
    }
}

/// Rating sub-record keyed by `(school_id, review_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRating {
    pub school_id: Uuid,
    pub review_id: Uuid,
    pub source: ScrapingSource,
    /// 0.0-5.0
    pub rating: f64,
    pub ratings_count: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl SchoolRating {
    /// Deterministic review id so the same observation always maps to the same row
    pub fn review_id_for(source: ScrapingSource, key: &str) -> Uuid {
        let name = format!("{}:overall:{}", source, key);
        Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
    }

    pub fn is_valid_value(rating: f64) -> bool {
        rating.is_finite() && (0.0..=5.0).contains(&rating)
    }
}

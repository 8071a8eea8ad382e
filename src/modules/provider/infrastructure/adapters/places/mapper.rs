use super::models::PlaceResult;
use crate::modules::provider::domain::{ContactInfo, Coordinates, ScrapedRecord, ScrapingSource};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::validation::Validator;

const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?q=place_id:";

/// Maps Google Places results to scraped records
#[derive(Debug, Clone, Default)]
pub struct PlacesMapper;

impl PlacesMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map_place(&self, place: PlaceResult) -> AppResult<ScrapedRecord> {
        let name = Validator::clean_text(place.name.as_deref())
            .ok_or_else(|| AppError::ValidationError("Place without a name".to_string()))?;

        let mut record = ScrapedRecord::new(&name, ScrapingSource::Places)
            .with_address(
                &Validator::clean_text(place.formatted_address.as_deref()).unwrap_or_default(),
            )
            .with_contact(ContactInfo {
                phone: Validator::clean_phone(place.formatted_phone_number.as_deref()),
                email: None,
                website: Validator::clean_text(place.website.as_deref()),
            })
            .with_coordinates(
                place
                    .geometry
                    .as_ref()
                    .and_then(|g| Coordinates::new(g.location.lat, g.location.lng)),
            );

        if let Some(place_id) = place.place_id.as_deref().filter(|id| !id.is_empty()) {
            record = record.with_external_id(place_id);
            let url = place
                .url
                .clone()
                .unwrap_or_else(|| format!("{}{}", MAPS_PLACE_URL, place_id));
            record = record.with_source_url(&url);
        }

        if let Some(rating) = place.rating {
            record = record.with_rating(rating, place.user_ratings_total);
        }

        if let Some(label) = Self::institution_type(&place.types) {
            record = record.with_institution_type(label);
        }

        Ok(record)
    }

    fn institution_type(types: &[String]) -> Option<&'static str> {
        if types.iter().any(|t| t == "primary_school") {
            Some("szkoła podstawowa")
        } else if types.iter().any(|t| t == "secondary_school") {
            Some("szkoła ponadpodstawowa")
        } else {
            None
        }
    }
}

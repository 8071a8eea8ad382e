use super::models::RegistryInstitution;
use crate::modules::provider::domain::{ContactInfo, Coordinates, ScrapedRecord, ScrapingSource};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::validation::Validator;

pub const EXTERNAL_ID_PREFIX: &str = "rspo:";
const REGISTRY_PAGE_URL: &str = "https://rspo.gov.pl/institutions/";

/// Maps registry institutions to scraped records
#[derive(Debug, Clone, Default)]
pub struct RegistryMapper;

impl RegistryMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map_institution(&self, institution: RegistryInstitution) -> AppResult<ScrapedRecord> {
        let name = Validator::clean_text(institution.nazwa.as_deref()).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Registry entry {:?} has no name",
                institution.numer_rspo
            ))
        })?;

        let mut record = ScrapedRecord::new(&name, ScrapingSource::Registry)
            .with_address(&Self::format_address(&institution))
            .with_contact(ContactInfo {
                phone: Validator::clean_phone(institution.telefon.as_deref()),
                email: Validator::clean_email(institution.email.as_deref()),
                website: Validator::clean_text(institution.strona_internetowa.as_deref()),
            })
            .with_coordinates(
                institution
                    .geolokalizacja
                    .and_then(|geo| Coordinates::new(geo.latitude, geo.longitude)),
            );

        if let Some(number) = institution.numer_rspo {
            record = record
                .with_external_id(&format!("{}{}", EXTERNAL_ID_PREFIX, number))
                .with_source_url(&format!("{}{}", REGISTRY_PAGE_URL, number));
        }

        if let Some(kind) = institution
            .typ
            .as_ref()
            .and_then(|t| Validator::clean_text(Some(t.nazwa.as_str())))
        {
            record = record.with_institution_type(&kind);
        }

        Ok(record)
    }

    /// "ul. Szkolna 1/2, 00-001 Warszawa"; missing parts are left out
    fn format_address(institution: &RegistryInstitution) -> String {
        let clean = |value: &Option<String>| Validator::clean_text(value.as_deref());

        let mut street = clean(&institution.ulica).unwrap_or_default();
        if let Some(building) = clean(&institution.numer_budynku) {
            if !street.is_empty() {
                street.push(' ');
            }
            street.push_str(&building);
            if let Some(unit) = clean(&institution.numer_lokalu) {
                street.push('/');
                street.push_str(&unit);
            }
        }

        let locality = [clean(&institution.kod_pocztowy), clean(&institution.miejscowosc)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        [street, locality]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

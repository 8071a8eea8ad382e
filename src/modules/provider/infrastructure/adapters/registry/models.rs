// RSPO (Rejestr Szkół i Placówek Oświatowych) API v2 models.
// Listing responses are JSON-LD collections with `hydra:` prefixed keys.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistryPage {
    #[serde(rename = "hydra:member", default)]
    pub members: Vec<RegistryInstitution>,
    #[serde(rename = "hydra:totalItems", default)]
    pub total_items: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryInstitution {
    #[serde(default)]
    pub numer_rspo: Option<u64>,
    #[serde(default)]
    pub nazwa: Option<String>,
    #[serde(default)]
    pub typ: Option<InstitutionKind>,
    #[serde(default)]
    pub wojewodztwo: Option<String>,
    #[serde(default)]
    pub miejscowosc: Option<String>,
    #[serde(default)]
    pub ulica: Option<String>,
    #[serde(default)]
    pub numer_budynku: Option<String>,
    #[serde(default)]
    pub numer_lokalu: Option<String>,
    #[serde(default)]
    pub kod_pocztowy: Option<String>,
    #[serde(default)]
    pub telefon: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub strona_internetowa: Option<String>,
    #[serde(default)]
    pub geolokalizacja: Option<GeoLocation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstitutionKind {
    #[serde(default)]
    pub id: Option<u32>,
    pub nazwa: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

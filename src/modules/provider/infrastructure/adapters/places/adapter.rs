use async_trait::async_trait;
use std::sync::Arc;

use super::mapper::PlacesMapper;
use super::models::{FindPlaceResponse, TextSearchResponse, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::modules::provider::domain::{ScrapedRecord, ScrapingSource};
use crate::modules::provider::infrastructure::http_client::{FetchClient, FetchRequest};
use crate::modules::provider::traits::{
    ProgressCallback, ScrapeProgress, ScrapeRequest, ScrapingStrategy,
};
use crate::shared::config::ScraperSettings;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::proxy_rotator::ProxyRotator;

/// Google serves at most three pages of 20 results per text search
const MAX_PAGES: usize = 3;

/// Place-data backed strategy: text search for schools in each region
pub struct PlacesStrategy {
    http_client: FetchClient,
    api_key: Option<String>,
    base_url: String,
    mapper: PlacesMapper,
}

impl PlacesStrategy {
    pub fn new(http_client: FetchClient, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            mapper: PlacesMapper::new(),
        }
    }

    pub fn from_settings(settings: &ScraperSettings, proxies: Arc<ProxyRotator>) -> AppResult<Self> {
        let http_client = FetchClient::from_settings(
            ScrapingSource::Places.display_name(),
            settings,
            proxies,
        )?;
        Ok(Self::new(
            http_client,
            settings.places_api_key.clone(),
            &settings.places_base_url,
        ))
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ConfigurationError("GOOGLE_PLACES_API_KEY is not set".to_string())
        })
    }

    async fn scrape_region(
        &self,
        region: &str,
        api_key: &str,
        request: &ScrapeRequest,
        records: &mut Vec<ScrapedRecord>,
    ) -> AppResult<()> {
        let url = format!("{}/textsearch/json", self.base_url);
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            if request.is_cancelled() || request.limit_reached(records.len()) {
                break;
            }

            let fetch = FetchRequest::get(&url)
                .param("key", api_key)
                .param("language", "pl");
            let fetch = match &page_token {
                Some(token) => fetch.param("pagetoken", token.as_str()),
                None => fetch.param("query", format!("szkoła {}", region)),
            };

            let response: TextSearchResponse = self.http_client.get_json(&fetch).await?;
            if !response.is_ok() {
                return Err(AppError::ApiError(format!(
                    "Places text search returned {}: {}",
                    response.status,
                    response.error_message.unwrap_or_default()
                )));
            }

            log::debug!(
                "Places: region '{}' page {} returned {} results",
                region,
                page + 1,
                response.results.len()
            );

            for place in response.results {
                match self.mapper.map_place(place) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("Places: skipping result in '{}': {}", region, e),
                }
            }

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ScrapingStrategy for PlacesStrategy {
    fn source(&self) -> ScrapingSource {
        ScrapingSource::Places
    }

    fn name(&self) -> &str {
        ScrapingSource::Places.display_name()
    }

    async fn scrape(
        &self,
        request: &ScrapeRequest,
        on_progress: ProgressCallback,
    ) -> AppResult<Vec<ScrapedRecord>> {
        let api_key = self.api_key()?;
        let total = request.regions.len();
        let mut records = Vec::new();

        log::info!("Places: scraping {} region(s), limit {}", total, request.limit);

        for (index, region) in request.regions.iter().enumerate() {
            if request.is_cancelled() {
                log::info!("Places: cancelled before region '{}'", region);
                break;
            }
            if request.limit_reached(records.len()) {
                break;
            }

            let before = records.len();
            if let Err(e) = self
                .scrape_region(region, api_key, request, &mut records)
                .await
            {
                log::warn!(
                    "Places: region '{}' failed after {} records: {}",
                    region,
                    records.len() - before,
                    e
                );
            }

            on_progress(ScrapeProgress::new(
                index + 1,
                total,
                Some(format!("{} records after '{}'", records.len(), region)),
            ));
        }

        request.truncate(&mut records);
        log::info!("Places: collected {} records", records.len());
        Ok(records)
    }

    async fn test_connection(&self) -> AppResult<bool> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::warn!("Places: no API key configured");
            return Ok(false);
        };

        let probe = FetchRequest::get(format!("{}/findplacefromtext/json", self.base_url))
            .param("input", "szkoła podstawowa")
            .param("inputtype", "textquery")
            .param("fields", "place_id")
            .param("key", api_key)
            .with_max_retries(1);

        let response: FindPlaceResponse = self.http_client.get_json(&probe).await?;
        Ok(response.status == STATUS_OK || response.status == STATUS_ZERO_RESULTS)
    }
}

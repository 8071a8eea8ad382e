use async_trait::async_trait;
use std::sync::Arc;

use super::mapper::RegistryMapper;
use super::models::RegistryPage;
use crate::modules::provider::domain::{ScrapedRecord, ScrapingSource};
use crate::modules::provider::infrastructure::http_client::{FetchClient, FetchRequest};
use crate::modules::provider::traits::{
    ProgressCallback, ScrapeProgress, ScrapeRequest, ScrapingStrategy,
};
use crate::shared::config::ScraperSettings;
use crate::shared::errors::AppResult;
use crate::shared::utils::proxy_rotator::ProxyRotator;

/// Hard stop per region so a misbehaving paginator cannot loop forever
pub const MAX_PAGES_PER_REGION: u32 = 20;

/// Direct-fetch strategy over the national school registry (RSPO)
pub struct RegistryStrategy {
    http_client: FetchClient,
    base_url: String,
    mapper: RegistryMapper,
}

impl RegistryStrategy {
    pub fn new(http_client: FetchClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mapper: RegistryMapper::new(),
        }
    }

    pub fn from_settings(settings: &ScraperSettings, proxies: Arc<ProxyRotator>) -> AppResult<Self> {
        let http_client = FetchClient::from_settings(
            ScrapingSource::Registry.display_name(),
            settings,
            proxies,
        )?;
        Ok(Self::new(http_client, &settings.registry_base_url))
    }

    fn listing_url(&self) -> String {
        format!("{}/placowki/", self.base_url)
    }

    async fn fetch_page(&self, region: Option<&str>, page: u32) -> AppResult<RegistryPage> {
        let mut request = FetchRequest::get(self.listing_url()).param("page", page.to_string());
        if let Some(region) = region {
            request = request.param("wojewodztwo_nazwa", region);
        }
        self.http_client.get_json(&request).await
    }

    async fn scrape_region(
        &self,
        region: &str,
        region_index: usize,
        request: &ScrapeRequest,
        records: &mut Vec<ScrapedRecord>,
        on_progress: &ProgressCallback,
    ) -> AppResult<()> {
        let total_regions = request.regions.len();

        for page in 1..=MAX_PAGES_PER_REGION {
            if request.is_cancelled() || request.limit_reached(records.len()) {
                break;
            }

            let listing = self.fetch_page(Some(region), page).await?;
            if listing.members.is_empty() {
                log::debug!("RSPO: region '{}' exhausted at page {}", region, page);
                break;
            }

            for institution in listing.members {
                if request.limit_reached(records.len()) {
                    break;
                }
                match self.mapper.map_institution(institution) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("RSPO: skipping entry in '{}': {}", region, e),
                }
            }

            // Region i owns [i, i+1) of the strategy's range; pages fill it in
            let fraction = (region_index as f64 + page as f64 / MAX_PAGES_PER_REGION as f64)
                / total_regions as f64;
            on_progress(
                ScrapeProgress::new(region_index, total_regions, None)
                    .with_percentage((fraction * 100.0).floor() as u8),
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ScrapingStrategy for RegistryStrategy {
    fn source(&self) -> ScrapingSource {
        ScrapingSource::Registry
    }

    fn name(&self) -> &str {
        ScrapingSource::Registry.display_name()
    }

    async fn scrape(
        &self,
        request: &ScrapeRequest,
        on_progress: ProgressCallback,
    ) -> AppResult<Vec<ScrapedRecord>> {
        let total = request.regions.len();
        let mut records = Vec::new();

        log::info!("RSPO: scraping {} region(s), limit {}", total, request.limit);

        for (index, region) in request.regions.iter().enumerate() {
            if request.is_cancelled() {
                log::info!("RSPO: cancelled before region '{}'", region);
                break;
            }
            if request.limit_reached(records.len()) {
                break;
            }

            let before = records.len();
            if let Err(e) = self
                .scrape_region(region, index, request, &mut records, &on_progress)
                .await
            {
                log::warn!(
                    "RSPO: region '{}' failed after {} records: {}",
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
        log::info!("RSPO: collected {} records", records.len());
        Ok(records)
    }

    async fn test_connection(&self) -> AppResult<bool> {
        let request = FetchRequest::get(self.listing_url())
            .param("page", "1")
            .with_max_retries(1);
        let _: RegistryPage = self.http_client.get_json(&request).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::rate_limiter::RateLimiter;
    use crate::shared::utils::retry_policy::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn listing_url_is_built_from_base() {
        let client = FetchClient::new(
            "RSPO",
            RateLimiter::new(600),
            Arc::new(ProxyRotator::disabled()),
            RetryPolicy::none(),
            Duration::from_secs(1),
        )
        .unwrap();
        let strategy = RegistryStrategy::new(client, "https://api-rspo.example/api/");
        assert_eq!(strategy.listing_url(), "https://api-rspo.example/api/placowki/");
        assert_eq!(strategy.source(), ScrapingSource::Registry);
    }

    #[test]
    fn parses_hydra_listing() {
        let json = r#"{
            "hydra:member": [
                {"numerRspo": 1, "nazwa": "SP 1", "typ": {"id": 3, "nazwa": "Szkoła podstawowa"}},
                {"numerRspo": 2, "nazwa": "LO 2"}
            ],
            "hydra:totalItems": 2
        }"#;
        let page: RegistryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.members.len(), 2);
        assert_eq!(page.total_items, Some(2));
        assert_eq!(page.members[0].numer_rspo, Some(1));
    }
}

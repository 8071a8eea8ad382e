//! HTTP client shared by the scraping strategies
//!
//! Every attempt goes through the source's rate limiter and, when proxies are
//! configured, through the next eligible proxy. A 429 takes the proxy out of
//! rotation and backs off exponentially; other failures back off briefly.

use crate::shared::config::ScraperSettings;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use crate::shared::utils::proxy_rotator::{ProxyEntry, ProxyRotator};
use crate::shared::utils::rate_limiter::RateLimiter;
use crate::shared::utils::retry_policy::{retry_after_from_headers, RetryPolicy};
use dashmap::DashMap;
use reqwest::{Client, Method, Proxy, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const USER_AGENT: &str = "school-finder-scraper/0.1";
const MAX_LOGGED_BODY: usize = 200;

/// A single logical request; retried as a unit by [`FetchClient::fetch`]
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Total attempts including the first one
    pub max_retries: u32,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            params: Vec::new(),
            body: None,
            max_retries: 3,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(url)
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

pub struct FetchClient {
    source_name: String,
    rate_limiter: RateLimiter,
    proxies: Arc<ProxyRotator>,
    retry_policy: RetryPolicy,
    timeout: Duration,
    direct_client: Client,
    // reqwest binds proxies per client, so keep one client per proxy address
    proxied_clients: DashMap<String, Client>,
}

impl FetchClient {
    pub fn new(
        source_name: &str,
        rate_limiter: RateLimiter,
        proxies: Arc<ProxyRotator>,
        retry_policy: RetryPolicy,
        timeout: Duration,
    ) -> AppResult<Self> {
        let direct_client = build_client(timeout, None)?;
        Ok(Self {
            source_name: source_name.to_string(),
            rate_limiter,
            proxies,
            retry_policy,
            timeout,
            direct_client,
            proxied_clients: DashMap::new(),
        })
    }

    /// Client configured from settings, with its own rate limiter
    pub fn from_settings(
        source_name: &str,
        settings: &ScraperSettings,
        proxies: Arc<ProxyRotator>,
    ) -> AppResult<Self> {
        Self::new(
            source_name,
            RateLimiter::new(settings.requests_per_minute),
            proxies,
            RetryPolicy::scraping().with_max_attempts(settings.max_retries),
            settings.request_timeout,
        )
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Execute the request, retrying until a 2xx response or attempts run out.
    ///
    /// The attempt cap is the smaller of the request's `max_retries` and the
    /// client's retry policy.
    pub async fn fetch(&self, request: &FetchRequest) -> AppResult<Response> {
        let max_attempts = request.max_retries.min(self.retry_policy.max_attempts).max(1);

        for attempt in 0..max_attempts {
            self.rate_limiter.wait().await;

            let proxy = self.proxies.next();
            let client = self.client_for(proxy.as_ref())?;
            let has_next = attempt + 1 < max_attempts;
            let started = Instant::now();

            match self.send(&client, request).await {
                Ok(response) if response.status().is_success() => {
                    LogContext::api_call(
                        &self.source_name,
                        &request.url,
                        response.status().as_str(),
                        Some(started.elapsed().as_millis() as u64),
                    );
                    return Ok(response);
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if let Some(proxy) = &proxy {
                        self.proxies.mark_blocked(proxy);
                    }
                    let delay = self
                        .retry_policy
                        .calculate_delay(attempt, retry_after_from_headers(response.headers()));
                    tracing::warn!(
                        "{} rate limited {} (attempt {}/{}, proxy {})",
                        self.source_name,
                        request.url,
                        attempt + 1,
                        max_attempts,
                        describe_proxy(proxy.as_ref())
                    );
                    if has_next {
                        sleep(delay).await;
                    }
                }
                Ok(response) => {
                    tracing::warn!(
                        "{} returned {} for {} (attempt {}/{})",
                        self.source_name,
                        response.status(),
                        request.url,
                        attempt + 1,
                        max_attempts
                    );
                    if has_next {
                        sleep(self.retry_policy.error_delay).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "{} request to {} failed (attempt {}/{}): {}",
                        self.source_name,
                        request.url,
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    if has_next {
                        sleep(self.retry_policy.error_delay).await;
                    }
                }
            }
        }

        Err(AppError::FetchFailed {
            url: request.url.clone(),
            attempts: max_attempts,
        })
    }

    /// Fetch and decode a JSON body
    pub async fn get_json<T>(&self, request: &FetchRequest) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.fetch(request).await?;
        self.parse_response(response).await
    }

    async fn send(
        &self,
        client: &Client,
        request: &FetchRequest,
    ) -> Result<Response, reqwest::Error> {
        let mut builder = client
            .request(request.method.clone(), &request.url)
            .header("Accept", "application/json");

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await
    }

    async fn parse_response<T>(&self, response: Response) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response_text = response.text().await.map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to read {} response: {}",
                self.source_name, e
            ))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            let preview: String = response_text.chars().take(MAX_LOGGED_BODY).collect();
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.source_name, e, preview
            ))
        })
    }

    fn client_for(&self, proxy: Option<&ProxyEntry>) -> AppResult<Client> {
        let Some(proxy) = proxy else {
            return Ok(self.direct_client.clone());
        };

        let key = proxy.address();
        if let Some(client) = self.proxied_clients.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(self.timeout, Some(proxy))?;
        self.proxied_clients.insert(key, client.clone());
        Ok(client)
    }
}

fn build_client(timeout: Duration, proxy: Option<&ProxyEntry>) -> AppResult<Client> {
    let mut builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);

    builder = match proxy {
        Some(entry) => {
            let mut proxy = Proxy::all(entry.url()).map_err(|e| {
                AppError::ConfigurationError(format!("Invalid proxy {}: {}", entry.address(), e))
            })?;
            if let Some(credential) = &entry.credential {
                proxy = proxy.basic_auth(&credential.username, &credential.password);
            }
            builder.proxy(proxy)
        }
        // Direct means direct: ignore HTTP(S)_PROXY from the environment
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))
}

fn describe_proxy(proxy: Option<&ProxyEntry>) -> String {
    proxy.map_or_else(|| "none".to_string(), ProxyEntry::address)
}

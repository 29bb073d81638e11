// src/register/mod.rs
// Company register access. The pipeline only depends on the `RegisterClient`
// trait; the HTTP implementation is a thin collaborator that forwards the
// credential as basic auth and surfaces non-success responses as errors.
// Retry and timeout policy belong to the HTTP layer's callers, not here.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::core::{RegisterProfile, RegisterSearchItem, RegisterSearchResponse};

pub const DEFAULT_REGISTER_BASE_URL: &str = "https://api.company-information.service.gov.uk";

#[async_trait]
pub trait RegisterClient: Send + Sync {
    /// Free-text company search; returns raw hits for the ranker.
    async fn search_companies(&self, query: &str) -> Result<Vec<RegisterSearchItem>>;

    /// Profile lookup for a known company number.
    async fn company_profile(&self, company_number: &str) -> Result<RegisterProfile>;
}

pub struct HttpRegisterClient {
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl HttpRegisterClient {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self> {
        let base_url = Url::parse(base_url.unwrap_or(DEFAULT_REGISTER_BASE_URL))
            .context("Invalid register base URL")?;
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join("/search/companies")
            .context("Failed to build register search URL")?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn profile_url(&self, company_number: &str) -> Result<Url> {
        self.base_url
            .join(&format!("/company/{}", company_number))
            .context("Failed to build register profile URL")
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.api_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .context("Register request failed to send")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Register request failed with {}", status));
        }

        response
            .json::<T>()
            .await
            .context("Register response was not valid JSON")
    }
}

#[async_trait]
impl RegisterClient for HttpRegisterClient {
    async fn search_companies(&self, query: &str) -> Result<Vec<RegisterSearchItem>> {
        let url = self.search_url(query)?;
        let payload: RegisterSearchResponse = self.fetch_json(url).await?;
        Ok(payload.items)
    }

    async fn company_profile(&self, company_number: &str) -> Result<RegisterProfile> {
        let url = self.profile_url(company_number)?;
        self.fetch_json(url).await
    }
}

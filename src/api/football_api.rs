use crate::api::FootballData;
use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::Fixture;
use crate::utils::retry::{retry, RetryPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const SERVICE_NAME: &str = "API-Football";
/// How many upcoming fixtures one report covers
const UPCOMING_FIXTURES: u32 = 15;

/// Every API-Football payload wraps its data in `response`.
/// A body without that key means "no data".
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    response: Option<Vec<Value>>,
}

impl ApiEnvelope {
    fn into_items(self) -> Vec<Value> {
        self.response.unwrap_or_default()
    }
}

pub struct FootballApiClient {
    api_key: String,
    api_host: String,
    base_url: String,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl FootballApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build API-Football HTTP client")?;

        Ok(Self {
            api_key: config.api_football_key.clone(),
            api_host: config.api_football_host.clone(),
            base_url: config.api_football_base_url.clone(),
            retry: config.retry,
            client,
        })
    }

    /// GET `{base}/{path}` and return the items under `response`
    async fn fetch_items(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.base_url, path);

        retry(&self.retry, SERVICE_NAME, || async {
            let response = self
                .client
                .get(&url)
                .header("x-apisports-key", &self.api_key)
                .header("x-rapidapi-host", &self.api_host)
                .query(query)
                .send()
                .await
                .with_context(|| format!("Failed to fetch {} from API-Football", path))?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status {
                    service: SERVICE_NAME,
                    status,
                }
                .into());
            }

            let envelope: ApiEnvelope = response
                .json()
                .await
                .with_context(|| format!("Failed to parse API-Football {} response", path))?;

            Ok(envelope.into_items())
        })
        .await
    }
}

#[async_trait]
impl FootballData for FootballApiClient {
    /// Fetch the next batch of upcoming fixtures, in provider order
    async fn get_today_fixtures(&self) -> Result<Vec<Fixture>> {
        let items = self
            .fetch_items("fixtures", &[("next", UPCOMING_FIXTURES.to_string())])
            .await?;
        debug!("API-Football returned {} fixtures", items.len());

        items
            .into_iter()
            .map(|item| Fixture::from_raw(item).map_err(anyhow::Error::from))
            .collect()
    }

    async fn get_predictions(&self, fixture_id: i64) -> Result<Vec<Value>> {
        self.fetch_items("predictions", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn get_odds(&self, fixture_id: i64) -> Result<Vec<Value>> {
        self.fetch_items("odds", &[("fixture", fixture_id.to_string())])
            .await
    }
}

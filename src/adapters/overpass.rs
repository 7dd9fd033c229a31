use crate::domain::ports::FacilitySource;
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Sends Overpass QL queries as `data=<query>` form posts.
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl FacilitySource for OverpassClient {
    async fn query(&self, query: &str) -> Result<String> {
        tracing::debug!("Querying Overpass at {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::UpstreamStatus {
                service: "overpass".to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

//! Default city lookup from the caller's public IP address (ipinfo).

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::LocationError;

pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";
const USER_AGENT: &str = "Vejr/0.1.0";

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Arc<Client>,
    base_url: String,
    token: String,
}

impl IpLocator {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// City name reported for the current network address.
    ///
    /// Called once per home-screen activation; the result is not cached.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve_default_city(&self) -> Result<String, LocationError> {
        let url = format!("{}/json", self.base_url);
        let mut request = self.client.get(&url);
        if !self.token.is_empty() {
            request = request.query(&[("token", self.token.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::debug!("IP lookup returned status {}", response.status());
            return Err(LocationError::Status(response.status().as_u16()));
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Parse(e.to_string()))?;

        let city = body
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LocationError::MissingCity)?;

        tracing::info!("Resolved default city: {}", city);
        Ok(city)
    }
}

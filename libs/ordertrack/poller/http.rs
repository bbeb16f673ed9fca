//! HTTP order-status poller

use super::error::PollError;
use super::helpers::{classify_response, order_url};
use super::OrderStatusSource;
use crate::domain::{OrderId, OrderSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default store API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://store.xsolla.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues `GET /api/v2/project/{project}/order/{id}` with bearer auth
pub struct HttpPoller {
    base_url: String,
    project_id: u64,
    client: Client,
}

impl HttpPoller {
    pub fn new(base_url: impl Into<String>, project_id: u64) -> Result<Self, reqwest::Error> {
        Self::with_timeouts(base_url, project_id, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        project_id: u64,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(15))
            .build()?;

        Ok(Self::with_client(base_url, project_id, client))
    }

    /// Use a preconfigured client
    pub fn with_client(base_url: impl Into<String>, project_id: u64, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            project_id,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl OrderStatusSource for HttpPoller {
    async fn poll(&self, access_token: &str, order_id: OrderId) -> Result<OrderSnapshot, PollError> {
        let url = order_url(&self.base_url, self.project_id, order_id);
        debug!("[Poller] GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(PollError::no_response)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(PollError::no_response)?;

        debug!("[Poller] Order {} -> HTTP {}", order_id, status);
        classify_response(status, &body, order_id)
    }
}

//! Channel construction for downstream services.

use std::time::Duration;

use serde::Deserialize;
use tonic::transport::{Channel, Endpoint};

use crate::error::AppError;

/// Connection settings for one downstream service.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// The gRPC endpoint of the service (e.g., "http://board-service:9000").
    pub endpoint: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Upper bound for a single call; the request deadline may cut it shorter.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum in-flight calls on the shared channel.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            concurrency_limit: None,
        }
    }

    /// Builds a lazily connected channel. The first call establishes the
    /// connection, so startup does not depend on downstream availability.
    pub fn channel(&self) -> Result<Channel, AppError> {
        let mut endpoint = Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| {
                AppError::ConfigError(
                    anyhow::Error::new(e).context(format!("invalid endpoint {}", self.endpoint)),
                )
            })?
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .timeout(Duration::from_millis(self.request_timeout_ms));

        if let Some(limit) = self.concurrency_limit {
            endpoint = endpoint.concurrency_limit(limit);
        }

        Ok(endpoint.connect_lazy())
    }
}

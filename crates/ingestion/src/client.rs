//! HTTP client for the REST Countries dataset.

use crate::error::{IngestError, IngestResult};
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use worldtour_telemetry::Metrics;

/// Fetches the full country array in one request.
pub struct CountriesClient {
    client: Client,
    api_url: String,
    metrics: Metrics,
}

impl CountriesClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_url` - Endpoint returning the JSON array of country records
    /// * `timeout` - Upper bound for the whole request, body included
    /// * `metrics` - Metrics collector
    pub fn new(api_url: &str, timeout: Duration, metrics: Metrics) -> IngestResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| IngestError::Fetch {
                url: api_url.to_string(),
                source,
            })?;

        info!("Initialized countries client for {}", api_url);

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            metrics,
        })
    }

    /// Fetch every country record as raw JSON.
    ///
    /// Records are decoded one by one later, so a single oddly shaped record
    /// does not fail the fetch.
    pub async fn fetch_countries(&self) -> IngestResult<Vec<Value>> {
        let start = Instant::now();
        let result = self.fetch_body().await;
        self.metrics
            .observe_fetch_latency(start.elapsed().as_secs_f64());

        let body = result.map_err(|e| {
            self.metrics.inc_fetch_errors();
            warn!("Fetching {} failed: {}", self.api_url, e);
            e
        })?;

        let records = decode_records(&body)?;
        debug!("Fetched {} records ({} bytes)", records.len(), body.len());
        Ok(records)
    }

    async fn fetch_body(&self) -> IngestResult<Vec<u8>> {
        let fetch_error = |source| IngestError::Fetch {
            url: self.api_url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(fetch_error)?;

        if !response.status().is_success() {
            return Err(IngestError::Status {
                url: self.api_url.clone(),
                status: response.status(),
            });
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        Ok(body.to_vec())
    }
}

/// Read a saved copy of the dataset.
pub fn load_snapshot(path: &Path) -> IngestResult<Vec<Value>> {
    let body = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = decode_records(&body)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn decode_records(body: &[u8]) -> IngestResult<Vec<Value>> {
    serde_json::from_slice(body).map_err(IngestError::Decode)
}

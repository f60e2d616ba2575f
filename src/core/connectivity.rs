// ─── Connectivity Probe ───

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Number of targets the probe tries.
    fn targets(&self) -> usize;

    async fn is_reachable(&self) -> bool;
}

/// Reachable as soon as one configured URL answers at all.
pub struct HttpProbe {
    client: Client,
    urls: Vec<String>,
}

impl HttpProbe {
    pub fn new(client: Client, urls: Vec<String>) -> Self {
        Self { client, urls }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    fn targets(&self) -> usize {
        self.urls.len()
    }

    async fn is_reachable(&self) -> bool {
        for url in &self.urls {
            match self.client.head(url).timeout(PROBE_TIMEOUT).send().await {
                // Any HTTP answer, even an error status, proves connectivity.
                Ok(response) => {
                    debug!("Connectivity probe {} answered {}", url, response.status());
                    return true;
                }
                Err(e) => warn!("Connectivity probe {} failed: {}", url, e),
            }
        }
        false
    }
}

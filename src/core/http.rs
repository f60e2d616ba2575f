use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::config::InstallSection;

const APP_USER_AGENT: &str = concat!("ServerStarter/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client honoring the configured connect/read timeouts.
pub fn build_http_client(install: &InstallSection) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .connect_timeout(Duration::from_secs(install.connect_timeout.max(1)))
        .read_timeout(Duration::from_secs(install.read_timeout.max(1)))
        .build()
}

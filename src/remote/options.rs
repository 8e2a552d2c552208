//! Knobs for the HTTP endpoint client plus validation so a misconfigured
//! endpoint fails at construction instead of on the first call.

use anyhow::{bail, Result};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROCESSING_COST_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpointOptions {
    pub url: String,
    pub request_timeout: Duration,
}

impl HttpEndpointOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_url(&self.url)?;
        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }
        Ok(())
    }
}

pub(crate) fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("endpoint_url must start with http:// or https://");
    }
    Ok(())
}

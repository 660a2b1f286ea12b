// src/fetch/mod.rs
pub mod client;

pub use client::RateLimitedFetcher;

use crate::error::{AnalyzerError, AnalyzerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// A single HTTP GET returning parsed JSON. No retry at this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> AnalyzerResult<Value>;
}

/// reqwest-backed transport with a fixed request timeout.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> AnalyzerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AnalyzerError::InvalidConfiguration(format!("Failed to build client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::HttpStatus(status.as_u16()));
        }

        response.json::<Value>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AnalyzerError {
    if e.is_timeout() {
        AnalyzerError::ConnectionTimeout
    } else if e.is_decode() {
        AnalyzerError::UnexpectedPayload(e.to_string())
    } else {
        AnalyzerError::Request(e.to_string())
    }
}

// src/types.rs
use crate::error::{AnalyzerError, AnalyzerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One row of the token-holder export: an address and the quantity of the
/// analyzed token it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderRecord {
    pub address: String,
    pub quantity: f64,
}

/// A holder augmented with on-chain and marketplace metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedWallet {
    pub address: String,
    pub display_name: String,
    pub eth_balance: f64,
    pub tx_count: usize,
    pub held_asset_names: Vec<String>,
    pub held_asset_count: usize,
    pub enriched_at: chrono::DateTime<chrono::Utc>,
}

impl EnrichedWallet {
    /// Record with every field at its documented fallback value. Used when an
    /// enrichment task dies outright so the output sequence never shrinks.
    pub fn degraded(address: &str) -> Self {
        Self {
            address: address.to_string(),
            display_name: short_address(address),
            eth_balance: 0.0,
            tx_count: 0,
            held_asset_names: Vec::new(),
            held_asset_count: 0,
            enriched_at: chrono::Utc::now(),
        }
    }
}

/// Last 5 characters of an address, the fallback node label when no display
/// name is known.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let start = chars.len().saturating_sub(5);
    chars[start..].iter().collect()
}

/// Retry behavior for a single fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_millis(200),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Base URLs for the upstream services. Overridable so tests never touch the
/// real endpoints.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub etherscan_base: String,
    pub opensea_base: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            etherscan_base: "https://api.etherscan.io/api".to_string(),
            opensea_base: "https://api.opensea.io/api/v2".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub etherscan_api_key: String,
    pub opensea_api_key: String,
    pub sample_size: usize,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub endpoints: ApiEndpoints,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            etherscan_api_key: String::new(),
            opensea_api_key: String::new(),
            sample_size: 50,
            concurrency: 10,
            retry: RetryPolicy::default(),
            endpoints: ApiEndpoints::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Build a config from process environment variables.
    pub fn from_env() -> AnalyzerResult<Self> {
        let etherscan_api_key = std::env::var("ETHSCAN_API_KEY")
            .map_err(|_| AnalyzerError::MissingConfigurationKey("ETHSCAN_API_KEY".to_string()))?;
        let opensea_api_key = std::env::var("OPENSEA_API_KEY")
            .map_err(|_| AnalyzerError::MissingConfigurationKey("OPENSEA_API_KEY".to_string()))?;

        Ok(Self {
            etherscan_api_key,
            opensea_api_key,
            ..Self::default()
        })
    }
}

/// One row of the shared-asset report: an asset and every sampled address
/// holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedAssetRow {
    pub asset_name: String,
    pub owners: Vec<String>,
}

// src/enrich/mod.rs
pub mod services;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::fetch::RateLimitedFetcher;
use crate::types::{short_address, AnalyzerConfig, ApiEndpoints, EnrichedWallet, HolderRecord};
use serde_json::Value;

const WEI_PER_ETH: f64 = 1e18;

/// Composes the four per-wallet lookups into one enriched record.
///
/// Every lookup degrades to its documented default on failure; a holder is
/// never dropped because one upstream was flaky.
pub struct WalletEnricher {
    fetcher: RateLimitedFetcher,
    endpoints: ApiEndpoints,
    etherscan_api_key: String,
    opensea_api_key: String,
}

impl WalletEnricher {
    pub fn new(fetcher: RateLimitedFetcher, config: &AnalyzerConfig) -> Self {
        Self {
            fetcher,
            endpoints: config.endpoints.clone(),
            etherscan_api_key: config.etherscan_api_key.clone(),
            opensea_api_key: config.opensea_api_key.clone(),
        }
    }

    /// Enrich one holder. The four lookups are independent and run
    /// concurrently; none of them can fail the record as a whole.
    pub async fn enrich(&self, holder: &HolderRecord) -> EnrichedWallet {
        let address = holder.address.as_str();
        let (display_name, eth_balance, tx_count, held_asset_names) = tokio::join!(
            self.fetch_display_name(address),
            self.fetch_eth_balance(address),
            self.fetch_tx_count(address),
            self.fetch_held_assets(address),
        );

        let held_asset_count = held_asset_names.len();
        EnrichedWallet {
            address: holder.address.clone(),
            display_name,
            eth_balance,
            tx_count,
            held_asset_names,
            held_asset_count,
            enriched_at: chrono::Utc::now(),
        }
    }

    async fn fetch_eth_balance(&self, address: &str) -> f64 {
        let url = services::balance_url(
            &self.endpoints.etherscan_base,
            address,
            &self.etherscan_api_key,
        );
        match self.fetcher.fetch_json(&url, &[]).await {
            Ok(body) => match parse_wei_balance(&body) {
                Ok(eth) => eth,
                Err(e) => {
                    log::warn!("Balance payload for {} unusable, degrading to 0: {}", address, e);
                    0.0
                }
            },
            Err(e) => {
                log::warn!("Balance lookup for {} degraded to 0: {}", address, e);
                0.0
            }
        }
    }

    async fn fetch_tx_count(&self, address: &str) -> usize {
        let url = services::tx_list_url(
            &self.endpoints.etherscan_base,
            address,
            &self.etherscan_api_key,
        );
        match self.fetcher.fetch_json(&url, &[]).await {
            Ok(body) => match body.get("result").and_then(Value::as_array) {
                Some(list) => list.len(),
                None => {
                    log::warn!("Transaction list for {} not a list, counting 0", address);
                    0
                }
            },
            Err(e) => {
                log::warn!("Transaction lookup for {} degraded to 0: {}", address, e);
                0
            }
        }
    }

    async fn fetch_held_assets(&self, address: &str) -> Vec<String> {
        let url = services::nft_list_url(&self.endpoints.opensea_base, address);
        match self.fetcher.fetch_json(&url, &self.opensea_headers()).await {
            Ok(body) => match serde_json::from_value::<services::NftListPayload>(body) {
                Ok(payload) => payload.nfts.into_iter().filter_map(|nft| nft.name).collect(),
                Err(e) => {
                    log::warn!("NFT payload for {} unusable, degrading to empty: {}", address, e);
                    Vec::new()
                }
            },
            Err(e) => {
                log::warn!("NFT lookup for {} degraded to empty list: {}", address, e);
                Vec::new()
            }
        }
    }

    async fn fetch_display_name(&self, address: &str) -> String {
        let url = services::account_url(&self.endpoints.opensea_base, address);
        match self.fetcher.fetch_json(&url, &self.opensea_headers()).await {
            Ok(body) => match serde_json::from_value::<services::AccountPayload>(body) {
                Ok(payload) => payload
                    .username
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| short_address(address)),
                Err(e) => {
                    log::warn!("Account payload for {} unusable, using short address: {}", address, e);
                    short_address(address)
                }
            },
            Err(e) => {
                log::warn!("Username lookup for {} fell back to short address: {}", address, e);
                short_address(address)
            }
        }
    }

    fn opensea_headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("accept", "application/json"),
            ("x-api-key", self.opensea_api_key.as_str()),
        ]
    }
}

/// Etherscan reports balances as a decimal wei string inside `result`.
fn parse_wei_balance(body: &Value) -> AnalyzerResult<f64> {
    let raw = body.get("result").and_then(Value::as_str).ok_or_else(|| {
        AnalyzerError::UnexpectedPayload("balance result missing or not a string".to_string())
    })?;
    let wei: u128 = raw.trim().parse().map_err(|_| {
        AnalyzerError::UnexpectedPayload(format!("balance result not an integer: {}", raw))
    })?;
    Ok(wei as f64 / WEI_PER_ETH)
}

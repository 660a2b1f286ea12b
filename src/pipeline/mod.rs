// src/pipeline/mod.rs
use crate::enrich::WalletEnricher;
use crate::types::{EnrichedWallet, HolderRecord};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fans wallet enrichment out over a bounded worker pool and joins the
/// results back in submission order.
pub struct EnrichmentPipeline {
    enricher: Arc<WalletEnricher>,
    concurrency: usize,
}

impl EnrichmentPipeline {
    pub fn new(enricher: WalletEnricher, concurrency: usize) -> Self {
        Self {
            enricher: Arc::new(enricher),
            concurrency: concurrency.max(1),
        }
    }

    /// Enrich every holder, at most `concurrency` at a time.
    ///
    /// The output has the same length and order as the input. A task that
    /// dies outright (a fault the enricher's own degradation cannot absorb)
    /// is replaced by a fully degraded record for that holder.
    pub async fn run(&self, holders: Vec<HolderRecord>) -> Vec<EnrichedWallet> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(holders.len());

        for holder in &holders {
            let semaphore = semaphore.clone();
            let enricher = self.enricher.clone();
            let holder = holder.clone();
            handles.push(tokio::spawn(async move {
                // The semaphore is never closed while tasks hold it.
                match semaphore.acquire_owned().await {
                    Ok(_permit) => enricher.enrich(&holder).await,
                    Err(_) => EnrichedWallet::degraded(&holder.address),
                }
            }));
        }

        let mut wallets = Vec::with_capacity(holders.len());
        for (handle, holder) in handles.into_iter().zip(holders.iter()) {
            match handle.await {
                Ok(wallet) => wallets.push(wallet),
                Err(e) => {
                    log::error!(
                        "Enrichment task for {} died, substituting degraded record: {}",
                        holder.address,
                        e
                    );
                    wallets.push(EnrichedWallet::degraded(&holder.address));
                }
            }
        }

        wallets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerResult;
    use crate::fetch::{HttpTransport, RateLimitedFetcher};
    use crate::types::{AnalyzerConfig, RetryPolicy};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_config() -> AnalyzerConfig {
        AnalyzerConfig {
            etherscan_api_key: "scan-key".to_string(),
            opensea_api_key: "sea-key".to_string(),
            retry: RetryPolicy {
                max_retries: 1,
                retry_delay: Duration::from_millis(1),
                request_timeout: Duration::from_secs(10),
            },
            ..AnalyzerConfig::default()
        }
    }

    fn pipeline_with(transport: Arc<dyn HttpTransport>, concurrency: usize) -> EnrichmentPipeline {
        let config = test_config();
        let fetcher = RateLimitedFetcher::with_transport(transport, config.retry.clone());
        EnrichmentPipeline::new(WalletEnricher::new(fetcher, &config), concurrency)
    }

    fn holders(n: usize) -> Vec<HolderRecord> {
        (0..n)
            .map(|i| HolderRecord { address: format!("0xwallet{:04}", i), quantity: 1.0 })
            .collect()
    }

    /// Answers the username lookup with the address tail after a delay that
    /// varies per wallet, so completion order scrambles relative to
    /// submission order.
    struct SkewedDelays;

    #[async_trait]
    impl HttpTransport for SkewedDelays {
        async fn get_json(&self, url: &str, _headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
            let skew = url.bytes().map(|b| b as u64).sum::<u64>() % 20;
            tokio::time::sleep(Duration::from_millis(skew)).await;

            if url.contains("/accounts/") {
                let address = url.rsplit('/').next().unwrap_or_default();
                Ok(json!({"username": format!("user-{}", address)}))
            } else if url.contains("/nfts") {
                Ok(json!({"nfts": []}))
            } else if url.contains("action=txlist") {
                Ok(json!({"result": []}))
            } else {
                Ok(json!({"result": "0"}))
            }
        }
    }

    /// Panics inside the transport for one address so the spawned task dies.
    struct PanicsForOne;

    #[async_trait]
    impl HttpTransport for PanicsForOne {
        async fn get_json(&self, url: &str, _headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
            if url.contains("0xwallet0002") {
                panic!("injected programming fault");
            }
            if url.contains("/accounts/") {
                Ok(json!({"username": null}))
            } else if url.contains("/nfts") {
                Ok(json!({"nfts": [{"name": "Shared Thing"}]}))
            } else if url.contains("action=txlist") {
                Ok(json!({"result": []}))
            } else {
                Ok(json!({"result": "1000000000000000000"}))
            }
        }
    }

    /// Tracks how many enrichments run at once.
    struct ConcurrencyProbe {
        live: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for ConcurrencyProbe {
        async fn get_json(&self, url: &str, _headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(live, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.live.fetch_sub(1, Ordering::SeqCst);

            if url.contains("/accounts/") {
                Ok(json!({"username": null}))
            } else if url.contains("/nfts") {
                Ok(json!({"nfts": []}))
            } else if url.contains("action=txlist") {
                Ok(json!({"result": []}))
            } else {
                Ok(json!({"result": "0"}))
            }
        }
    }

    #[tokio::test]
    async fn output_matches_input_length_and_order() {
        for concurrency in [1, 3, 10] {
            let pipeline = pipeline_with(Arc::new(SkewedDelays), concurrency);
            let input = holders(12);

            let wallets = pipeline.run(input.clone()).await;

            assert_eq!(wallets.len(), input.len());
            for (wallet, holder) in wallets.iter().zip(input.iter()) {
                assert_eq!(wallet.address, holder.address);
                assert_eq!(wallet.display_name, format!("user-{}", holder.address));
            }
        }
    }

    #[tokio::test]
    async fn dead_task_is_replaced_by_degraded_record() {
        let pipeline = pipeline_with(Arc::new(PanicsForOne), 4);
        let input = holders(5);

        let wallets = pipeline.run(input.clone()).await;

        assert_eq!(wallets.len(), 5);
        assert_eq!(wallets[2].address, "0xwallet0002");
        assert_eq!(wallets[2].held_asset_count, 0);
        assert_eq!(wallets[2].display_name, "t0002");
        // Siblings are untouched by the dead worker.
        assert_eq!(wallets[0].held_asset_names, vec!["Shared Thing"]);
        assert_eq!(wallets[4].eth_balance, 1.0);
    }

    #[tokio::test]
    async fn worker_pool_is_bounded() {
        let probe = Arc::new(ConcurrencyProbe {
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let pipeline = pipeline_with(probe.clone(), 2);

        pipeline.run(holders(8)).await;

        // 2 workers with 4 concurrent lookups each.
        assert!(probe.peak.load(Ordering::SeqCst) <= 8);
        assert!(probe.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let pipeline = pipeline_with(Arc::new(SkewedDelays), 10);
        let wallets = pipeline.run(Vec::new()).await;
        assert!(wallets.is_empty());
    }
}

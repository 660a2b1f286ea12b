// src/lib.rs
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod types;

pub use crate::error::{AnalyzerError, AnalyzerResult};
pub use crate::graph::{CoOwnershipGraph, CoOwnershipGraphBuilder, SharedCountMetric};
pub use crate::types::{AnalyzerConfig, EnrichedWallet, HolderRecord, SharedAssetRow};

use crate::enrich::WalletEnricher;
use crate::fetch::RateLimitedFetcher;
use crate::pipeline::EnrichmentPipeline;
use std::path::Path;

/// Everything a renderer or report writer consumes from one run: the
/// enriched sample, the shared-asset rows, and the graph with its
/// intensity metric.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub wallets: Vec<EnrichedWallet>,
    pub shared_assets: Vec<SharedAssetRow>,
    pub graph: CoOwnershipGraph,
    pub shared_counts: SharedCountMetric,
}

/// Main analyzer - wires sampling, enrichment and graph construction
pub struct NetworkAnalyzer {
    config: AnalyzerConfig,
    pipeline: EnrichmentPipeline,
}

impl NetworkAnalyzer {
    /// Create a new analyzer
    pub fn new(config: AnalyzerConfig) -> AnalyzerResult<Self> {
        let fetcher = RateLimitedFetcher::new(config.retry.clone())?;
        let enricher = WalletEnricher::new(fetcher, &config);
        let pipeline = EnrichmentPipeline::new(enricher, config.concurrency);

        Ok(Self { config, pipeline })
    }

    /// Enrich the given holders and derive the co-ownership artifacts.
    ///
    /// Infallible by design: enrichment degrades per field and the graph
    /// phase is pure. Runs the graph build only after every enrichment has
    /// completed.
    pub async fn analyze(&self, holders: Vec<HolderRecord>) -> AnalysisOutcome {
        log::info!(
            "Enriching {} holders with {} workers",
            holders.len(),
            self.config.concurrency
        );
        let wallets = self.pipeline.run(holders).await;

        let shared_assets = CoOwnershipGraphBuilder::shared_asset_rows(&wallets);
        let (graph, shared_counts) = CoOwnershipGraphBuilder::build(&wallets);
        log::info!(
            "Graph: {} nodes, {} edges, {} shared assets",
            graph.node_count(),
            graph.edge_count(),
            shared_assets.len()
        );

        AnalysisOutcome { wallets, shared_assets, graph, shared_counts }
    }

    /// Full run: load the holder export, sample it, analyze, write the
    /// shared-asset report.
    pub async fn run(
        &self,
        export_path: &Path,
        report_path: &Path,
    ) -> AnalyzerResult<AnalysisOutcome> {
        let holders = report::load_holder_export(export_path)?;
        let sample = report::sample_holders(&holders, self.config.sample_size);
        let outcome = self.analyze(sample).await;
        report::write_shared_asset_report(report_path, &outcome.shared_assets)?;
        Ok(outcome)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpTransport;
    use crate::types::RetryPolicy;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    /// Both sampled wallets hold "Cool Cat #1"; neither has a profile name.
    struct TwoCatHolders;

    #[async_trait]
    impl HttpTransport for TwoCatHolders {
        async fn get_json(&self, url: &str, _headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
            if url.contains("/nfts") {
                Ok(json!({"nfts": [{"name": "Cool Cat #1"}, {"name": null}]}))
            } else if url.contains("/accounts/") {
                Ok(json!({"username": null}))
            } else if url.contains("action=txlist") {
                Ok(json!({"status": "1", "result": [{"hash": "0x1"}]}))
            } else {
                Ok(json!({"status": "1", "result": "2000000000000000000"}))
            }
        }
    }

    fn analyzer_with(transport: Arc<dyn HttpTransport>) -> NetworkAnalyzer {
        let config = AnalyzerConfig {
            etherscan_api_key: "scan-key".to_string(),
            opensea_api_key: "sea-key".to_string(),
            retry: RetryPolicy {
                max_retries: 2,
                retry_delay: Duration::from_millis(1),
                request_timeout: Duration::from_secs(10),
            },
            ..AnalyzerConfig::default()
        };
        let fetcher = RateLimitedFetcher::with_transport(transport, config.retry.clone());
        let enricher = WalletEnricher::new(fetcher, &config);
        let pipeline = EnrichmentPipeline::new(enricher, config.concurrency);
        NetworkAnalyzer { config, pipeline }
    }

    #[tokio::test]
    async fn two_holders_sharing_one_asset_connect() {
        let analyzer = analyzer_with(Arc::new(TwoCatHolders));
        let holders = vec![
            HolderRecord { address: "0xAAAAAAAA11".to_string(), quantity: 1.0 },
            HolderRecord { address: "0xBBBBBBBB22".to_string(), quantity: 2.0 },
        ];

        let outcome = analyzer.analyze(holders).await;

        assert_eq!(outcome.wallets.len(), 2);
        assert_eq!(outcome.wallets[0].display_name, "AAA11");
        assert_eq!(outcome.wallets[0].eth_balance, 2.0);
        assert_eq!(outcome.wallets[0].tx_count, 1);
        assert_eq!(outcome.wallets[0].held_asset_names, vec!["Cool Cat #1"]);

        assert_eq!(outcome.graph.edge_count(), 1);
        assert!(outcome.graph.contains_edge("AAA11", "BBB22"));
        assert_eq!(outcome.shared_counts.get("AAA11"), 1);
        assert_eq!(outcome.shared_counts.get("BBB22"), 1);
        assert_eq!(outcome.shared_counts.max_shared(), 1);
        assert_eq!(outcome.shared_counts.intensity("AAA11"), 1.0);
        assert_eq!(outcome.shared_counts.intensity("BBB22"), 1.0);

        assert_eq!(outcome.shared_assets.len(), 1);
        assert_eq!(outcome.shared_assets[0].asset_name, "Cool Cat #1");
        assert_eq!(
            outcome.shared_assets[0].owners,
            vec!["0xAAAAAAAA11", "0xBBBBBBBB22"]
        );
    }

    #[tokio::test]
    async fn run_reads_export_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("export-tokenholders.csv");
        let report = dir.path().join("shared_nfts.csv");
        std::fs::write(
            &export,
            "HolderAddress,Quantity\n0xAAAAAAAA11,1\n0xBBBBBBBB22,2\n",
        )
        .unwrap();

        let analyzer = analyzer_with(Arc::new(TwoCatHolders));
        let outcome = analyzer.run(&export, &report).await.unwrap();

        assert_eq!(outcome.wallets.len(), 2);
        let written = std::fs::read_to_string(&report).unwrap();
        assert!(written.starts_with("NFT Name,Wallet Addresses\n"));
        // Sampling shuffles the two holders, so check membership, not order.
        assert!(written.contains("Cool Cat #1"));
        assert!(written.contains("0xAAAAAAAA11"));
        assert!(written.contains("0xBBBBBBBB22"));
    }
}

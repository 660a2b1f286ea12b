// demos/basic_usage.rs
use nft_network_analyzer::{AnalyzerConfig, NetworkAnalyzer};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Expects ETHSCAN_API_KEY and OPENSEA_API_KEY in the environment and an
    // export-tokenholders.csv in the working directory.
    let config = AnalyzerConfig::from_env()?;
    let analyzer = NetworkAnalyzer::new(config)?;

    println!("🔎 Sampling and enriching holders...");
    let outcome = analyzer
        .run(
            Path::new("export-tokenholders.csv"),
            Path::new("shared_nfts.csv"),
        )
        .await?;

    println!("✅ Enriched {} wallets", outcome.wallets.len());
    for wallet in &outcome.wallets {
        println!(
            "💳 {}: {:.4} ETH, {} txs, {} NFTs",
            wallet.display_name, wallet.eth_balance, wallet.tx_count, wallet.held_asset_count
        );
    }

    println!(
        "🕸  Graph: {} nodes, {} edges, {} shared assets",
        outcome.graph.node_count(),
        outcome.graph.edge_count(),
        outcome.shared_assets.len()
    );
    for (name, count) in outcome.shared_counts.iter() {
        if count > 0 {
            println!(
                "🔥 {}: {} shared holdings (intensity {:.2})",
                name,
                count,
                outcome.shared_counts.intensity(name)
            );
        }
    }

    println!("📄 Shared NFTs written to shared_nfts.csv");
    Ok(())
}

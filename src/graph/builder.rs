// src/graph/builder.rs
use crate::graph::{CoOwnershipGraph, SharedCountMetric};
use crate::types::{EnrichedWallet, SharedAssetRow};
use std::collections::{BTreeSet, HashMap};

/// Asset name to the display names of every sampled wallet holding it.
/// Transient; exists only to derive edges.
pub type AssetOwnershipIndex = HashMap<String, BTreeSet<String>>;

/// Builds the co-ownership graph and shared-count metric from the full
/// enriched sample. Strictly sequential; runs after the pipeline barrier.
pub struct CoOwnershipGraphBuilder;

impl CoOwnershipGraphBuilder {
    /// One node per wallet (colliding display names collapse), one edge per
    /// co-owned asset pair. Every pair event bumps both endpoints' counts,
    /// so the metric keeps the multiplicity the edge set discards.
    pub fn build(wallets: &[EnrichedWallet]) -> (CoOwnershipGraph, SharedCountMetric) {
        let mut graph = CoOwnershipGraph::new();
        let mut counts = SharedCountMetric::default();

        for wallet in wallets {
            graph.add_node(wallet.display_name.clone());
            counts.ensure(&wallet.display_name);
        }

        let index = Self::ownership_index(wallets);
        for owners in index.values() {
            if owners.len() < 2 {
                continue;
            }
            let owners: Vec<&String> = owners.iter().collect();
            for i in 0..owners.len() {
                for j in (i + 1)..owners.len() {
                    graph.add_edge(owners[i], owners[j]);
                    counts.bump(owners[i]);
                    counts.bump(owners[j]);
                }
            }
        }

        (graph, counts)
    }

    /// Index every non-null held-asset name to its owner set.
    pub fn ownership_index(wallets: &[EnrichedWallet]) -> AssetOwnershipIndex {
        let mut index = AssetOwnershipIndex::new();
        for wallet in wallets {
            for asset in &wallet.held_asset_names {
                index
                    .entry(asset.clone())
                    .or_default()
                    .insert(wallet.display_name.clone());
            }
        }
        index
    }

    /// Report rows: assets held by at least two sampled wallets, owners
    /// listed by address in first-seen order.
    pub fn shared_asset_rows(wallets: &[EnrichedWallet]) -> Vec<SharedAssetRow> {
        let mut order: Vec<String> = Vec::new();
        let mut owners_by_asset: HashMap<String, Vec<String>> = HashMap::new();

        for wallet in wallets {
            for asset in &wallet.held_asset_names {
                if !owners_by_asset.contains_key(asset) {
                    order.push(asset.clone());
                }
                let owners = owners_by_asset.entry(asset.clone()).or_default();
                if !owners.contains(&wallet.address) {
                    owners.push(wallet.address.clone());
                }
            }
        }

        order
            .into_iter()
            .filter_map(|asset| {
                let owners = owners_by_asset.remove(&asset)?;
                if owners.len() >= 2 {
                    Some(SharedAssetRow { asset_name: asset, owners })
                } else {
                    None
                }
            })
            .collect()
    }
}

// src/enrich/services.rs
use serde::Deserialize;

/// Etherscan account balance query, result in wei.
pub fn balance_url(base: &str, address: &str, api_key: &str) -> String {
    format!(
        "{}?module=account&action=balance&address={}&apikey={}",
        base, address, api_key
    )
}

/// Etherscan transaction list query; only the list length is consumed.
pub fn tx_list_url(base: &str, address: &str, api_key: &str) -> String {
    format!(
        "{}?module=account&action=txlist&address={}&startblock=0&endblock=99999999&sort=asc&apikey={}",
        base, address, api_key
    )
}

/// OpenSea NFT holdings for an account on Ethereum.
pub fn nft_list_url(base: &str, address: &str) -> String {
    format!("{}/chain/ethereum/account/{}/nfts", base, address)
}

/// OpenSea account profile, carries the optional username.
pub fn account_url(base: &str, address: &str) -> String {
    format!("{}/accounts/{}", base, address)
}

/// One NFT in the holdings payload. The marketplace leaves `name` null for
/// unnamed tokens.
#[derive(Debug, Deserialize)]
pub struct NftEntry {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NftListPayload {
    #[serde(default)]
    pub nfts: Vec<NftEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountPayload {
    #[serde(default)]
    pub username: Option<String>,
}

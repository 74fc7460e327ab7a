//! EVM chain reads over an alloy HTTP provider

use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    providers::{Provider as _, RootProvider},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
    transports::http::Http,
};
use async_trait::async_trait;
use tracing::debug;

use super::ChainRpc;
use crate::error::{AdvisorError, Result};

/// Checksummed address controlled by a hex private key
pub fn wallet_address_from_key(key: &str) -> Result<String> {
    let signer = PrivateKeySigner::from_str(key.trim())
        .map_err(|e| AdvisorError::Validation(format!("wallet private key: {e}")))?;
    Ok(signer.address().to_string())
}

fn rpc_error(method: &'static str, err: impl std::fmt::Display) -> AdvisorError {
    AdvisorError::Rpc {
        method,
        message: err.to_string(),
    }
}

pub struct EvmRpcClient {
    provider: RootProvider,
    url: String,
}

impl EvmRpcClient {
    pub fn new(client: reqwest::Client, url: &str) -> Result<Self> {
        let parsed: reqwest::Url = url
            .parse()
            .map_err(|e| AdvisorError::Validation(format!("invalid rpc url {url}: {e}")))?;
        let http = Http::with_client(client, parsed);
        let provider = RootProvider::new(RpcClient::new(http, false));

        Ok(Self {
            provider,
            url: url.to_string(),
        })
    }
}

fn to_u128(method: &'static str, value: U256) -> Result<u128> {
    u128::try_from(value).map_err(|_| rpc_error(method, format!("{value} out of range")))
}

#[async_trait]
impl ChainRpc for EvmRpcClient {
    async fn gas_price_wei(&self) -> Result<u128> {
        debug!(url = %self.url, "eth_gasPrice");
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| rpc_error("eth_gasPrice", e))
    }

    async fn block_number(&self) -> Result<u64> {
        debug!(url = %self.url, "eth_blockNumber");
        self.provider
            .get_block_number()
            .await
            .map_err(|e| rpc_error("eth_blockNumber", e))
    }

    async fn chain_id(&self) -> Result<u64> {
        debug!(url = %self.url, "eth_chainId");
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| rpc_error("eth_chainId", e))
    }

    async fn balance_wei(&self, address: &str) -> Result<u128> {
        let owner = Address::from_str(address)
            .map_err(|e| AdvisorError::Validation(format!("wallet address {address}: {e}")))?;
        debug!(url = %self.url, %owner, "eth_getBalance");

        let wei = self
            .provider
            .get_balance(owner)
            .await
            .map_err(|e| rpc_error("eth_getBalance", e))?;
        to_u128("eth_getBalance", wei)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (account #0 of the default test mnemonic)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_wallet_address_from_key() {
        let address = wallet_address_from_key(DEV_KEY).unwrap();
        assert!(address.eq_ignore_ascii_case(DEV_ADDRESS));

        let bare = wallet_address_from_key(DEV_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(bare, address);
    }

    #[test]
    fn test_bad_wallet_key_rejected() {
        assert!(matches!(
            wallet_address_from_key("0xdead"),
            Err(AdvisorError::Validation(_))
        ));
    }

    #[test]
    fn test_balance_conversion() {
        assert_eq!(to_u128("eth_getBalance", U256::from(1_500u64)).unwrap(), 1_500);
        assert!(to_u128("eth_getBalance", U256::MAX).is_err());
    }

    #[tokio::test]
    async fn test_client_rejects_bad_url_and_address() {
        assert!(EvmRpcClient::new(reqwest::Client::new(), "not a url").is_err());

        let client = EvmRpcClient::new(reqwest::Client::new(), "http://127.0.0.1:1").unwrap();
        let err = client.balance_wei("0xnothex").await.unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(_)));
    }
}

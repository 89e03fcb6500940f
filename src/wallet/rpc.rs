use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::providers::{Http, Provider, ProviderError, RpcError};
use ethers::types::{Address, TxHash};

use crate::wallet::types::{TransferRequest, WalletError, WalletProvider};

/// Wallet reached over JSON-RPC, e.g. a local dev node with unlocked accounts.
pub struct RpcWallet {
    provider: Provider<Http>,
}

impl RpcWallet {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("Invalid wallet RPC url: {}", rpc_url))?;

        Ok(Self { provider })
    }
}

/// Keep the node's own error message when it sent one.
fn to_wallet_error(err: ProviderError) -> WalletError {
    let message = err
        .as_error_response()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| err.to_string());
    WalletError::Rejected(message)
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.provider
            .request::<(), Vec<Address>>("eth_requestAccounts", ())
            .await
            .map_err(to_wallet_error)
    }

    async fn send_transaction(&self, tx: &TransferRequest) -> Result<TxHash, WalletError> {
        self.provider
            .request::<[&TransferRequest; 1], TxHash>("eth_sendTransaction", [tx])
            .await
            .map_err(to_wallet_error)
    }

    fn name(&self) -> &str {
        "rpc"
    }
}

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use serde::Serialize;

/// Wei per ether
const WEI_PER_ETH: f64 = 1e18;

/// Params of an `eth_sendTransaction` value transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas: U256,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("No wallet provider available")]
    ProviderMissing,

    #[error("Wallet not connected")]
    NotConnected,

    /// Failure reported by the provider, message kept verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Invalid purchase amount: {0}")]
    InvalidAmount(f64),
}

/// An injected wallet: hands out accounts and submits transfers.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`. May prompt the user, who may refuse.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// `eth_sendTransaction`. Resolves once submitted, not once mined.
    async fn send_transaction(&self, tx: &TransferRequest) -> Result<TxHash, WalletError>;

    fn name(&self) -> &str;
}

/// Convert a listing (price per quintal in INR, quantity in kg) into wei at a
/// fixed INR/ETH rate: `floor(price * quantity / 100 / inr_per_eth * 1e18)`.
pub fn price_to_wei(price_inr: f64, quantity_kg: f64, inr_per_eth: f64) -> Result<U256, WalletError> {
    let total_inr = price_inr * quantity_kg / 100.0;
    let eth = total_inr / inr_per_eth;
    let wei = (eth * WEI_PER_ETH).floor();

    if !wei.is_finite() || wei < 0.0 {
        return Err(WalletError::InvalidAmount(total_inr));
    }

    // `{:.0}` prints the float's exact integer value, which may exceed u128
    U256::from_dec_str(&format!("{:.0}", wei)).map_err(|_| WalletError::InvalidAmount(total_inr))
}

pub fn random_address() -> Address {
    Address::from(rand::random::<[u8; 20]>())
}

pub fn random_tx_hash() -> TxHash {
    TxHash::from(rand::random::<[u8; 32]>())
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

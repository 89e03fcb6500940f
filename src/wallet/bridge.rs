use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::WalletConfig;
use crate::wallet::types::{price_to_wei, TransferRequest, WalletError, WalletProvider};

/// Connects dashboard roles to whatever wallet provider is installed.
///
/// A bridge without a provider is valid: every call then fails with
/// [`WalletError::ProviderMissing`] before anything is sent anywhere.
#[derive(Clone)]
pub struct WalletBridge {
    provider: Option<Arc<dyn WalletProvider>>,
    inr_per_eth: f64,
    gas_limit: u64,
    explorer_tx_url: String,
}

impl WalletBridge {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, config: &WalletConfig) -> Self {
        Self {
            provider,
            inr_per_eth: config.inr_per_eth,
            gas_limit: config.gas_limit,
            explorer_tx_url: config.explorer_tx_url.clone(),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, WalletError> {
        self.provider.as_ref().ok_or(WalletError::ProviderMissing)
    }

    /// Ask the provider for account access; the first account is used.
    pub async fn connect(&self) -> Result<Address, WalletError> {
        let provider = self.provider()?;

        let accounts = provider.request_accounts().await.map_err(|e| {
            warn!("{} refused account access: {}", provider.name(), e);
            e
        })?;

        let account = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        info!("Connected {} account {:?}", provider.name(), account);
        Ok(account)
    }

    /// Build the transfer paying `to` for `quantity_kg` at `price_inr` per quintal.
    pub fn build_transfer(
        &self,
        from: Address,
        to: Address,
        price_inr: f64,
        quantity_kg: f64,
    ) -> Result<TransferRequest, WalletError> {
        Ok(TransferRequest {
            from,
            to,
            value: price_to_wei(price_inr, quantity_kg, self.inr_per_eth)?,
            gas: U256::from(self.gas_limit),
        })
    }

    /// Submit a purchase transfer. The returned hash is final for our
    /// purposes; no receipt is awaited.
    pub async fn pay(
        &self,
        from: Address,
        to: Address,
        price_inr: f64,
        quantity_kg: f64,
    ) -> Result<TxHash, WalletError> {
        let provider = self.provider()?;
        let tx = self.build_transfer(from, to, price_inr, quantity_kg)?;

        info!("Submitting transfer of {} wei from {:?} to {:?}", tx.value, tx.from, tx.to);
        let hash = provider.send_transaction(&tx).await?;
        info!("Transaction submitted: {:?}", hash);

        Ok(hash)
    }

    pub fn explorer_link(&self, hash: &TxHash) -> String {
        format!("{}{:?}", self.explorer_tx_url, hash)
    }
}

impl std::fmt::Debug for WalletBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletBridge")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("inr_per_eth", &self.inr_per_eth)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::wallet::simulator::SimulatedWallet;

    fn bridge_with(wallet: Option<Arc<SimulatedWallet>>) -> WalletBridge {
        let provider = wallet.map(|w| w as Arc<dyn WalletProvider>);
        WalletBridge::new(provider, &WalletConfig::default())
    }

    #[tokio::test]
    async fn test_missing_provider_is_reported() {
        let bridge = bridge_with(None);

        assert!(!bridge.has_provider());
        assert_eq!(bridge.connect().await, Err(WalletError::ProviderMissing));
        assert_eq!(
            bridge.pay(Address::zero(), Address::zero(), 100.0, 10.0).await,
            Err(WalletError::ProviderMissing)
        );
    }

    #[tokio::test]
    async fn test_connect_uses_first_account() {
        let wallet = Arc::new(SimulatedWallet::new(&SimulatorConfig::default()));
        let expected = wallet.accounts()[0];
        let bridge = bridge_with(Some(wallet.clone()));

        assert_eq!(bridge.connect().await, Ok(expected));
        assert_eq!(wallet.calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_connect_carries_provider_message() {
        let wallet = Arc::new(SimulatedWallet::new(&SimulatorConfig { approval_rate: 0.0 }));
        let bridge = bridge_with(Some(wallet));

        assert_eq!(
            bridge.connect().await,
            Err(WalletError::Rejected("User rejected the request.".to_string()))
        );
    }

    #[test]
    fn test_build_transfer_uses_gas_limit() {
        let bridge = bridge_with(None);
        let to = Address::from([0x22; 20]);
        let tx = bridge.build_transfer(Address::from([0x11; 20]), to, 50_000.0, 200.0).unwrap();

        assert_eq!(tx.to, to);
        assert_eq!(tx.gas, U256::from(21_000u64));
        assert_eq!(tx.value, U256::from(500_000_000_000_000_000u128));
    }

    #[test]
    fn test_explorer_link() {
        let bridge = bridge_with(None);
        let hash = TxHash::from([0xab; 32]);

        assert_eq!(
            bridge.explorer_link(&hash),
            format!("https://etherscan.io/tx/0x{}", "ab".repeat(32))
        );
    }
}

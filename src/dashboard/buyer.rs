use ethers::types::{Address, TxHash};
use tracing::info;

use crate::dashboard::state::MarketState;
use crate::dashboard::DashboardError;
use crate::wallet::{WalletBridge, WalletError};

const INSTALL_WALLET: &str = "Please install MetaMask to make transactions!";

/// Buyer side: wallet connection and paying for listed products.
pub struct BuyerDesk {
    bridge: WalletBridge,
    wallet_address: Option<Address>,
    selected_product: Option<String>,
    last_tx: Option<TxHash>,
}

impl BuyerDesk {
    pub fn new(bridge: WalletBridge) -> Self {
        Self {
            bridge,
            wallet_address: None,
            selected_product: None,
            last_tx: None,
        }
    }

    pub fn wallet_address(&self) -> Option<Address> {
        self.wallet_address
    }

    pub fn selected_product(&self) -> Option<&str> {
        self.selected_product.as_deref()
    }

    pub async fn connect(&mut self) -> Result<Address, DashboardError> {
        let address = self.bridge.connect().await.map_err(|e| match e {
            WalletError::ProviderMissing => DashboardError::WalletMissing(INSTALL_WALLET),
            other => DashboardError::wallet(other, "Failed to connect wallet"),
        })?;

        self.wallet_address = Some(address);
        Ok(address)
    }

    /// Pay the farmer for `product_id` and turn it into an order.
    ///
    /// On failure the selection is cleared and the product stays listed.
    pub async fn buy(&mut self, state: &mut MarketState, product_id: &str) -> Result<TxHash, DashboardError> {
        if !self.bridge.has_provider() {
            return Err(DashboardError::WalletMissing(INSTALL_WALLET));
        }
        let from = self.wallet_address.ok_or(DashboardError::WalletNotConnected)?;
        let product = state
            .product(product_id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownProduct(product_id.to_string()))?;

        self.selected_product = Some(product.id.clone());
        self.last_tx = None;

        let paid = self
            .bridge
            .pay(from, product.farmer_address, product.price, product.quantity)
            .await;

        match paid {
            Ok(hash) => {
                self.last_tx = Some(hash);
                state.purchase(&product.id, hash, from);
                info!("Purchase of {} submitted: {}", product.id, self.bridge.explorer_link(&hash));
                Ok(hash)
            }
            Err(e) => {
                self.selected_product = None;
                Err(DashboardError::wallet(e, "Transaction failed"))
            }
        }
    }

    /// Selected product and its transaction, once submitted
    pub fn receipt(&self) -> Option<(&str, TxHash)> {
        match (&self.selected_product, self.last_tx) {
            (Some(id), Some(hash)) => Some((id.as_str(), hash)),
            _ => None,
        }
    }

    pub fn receipt_link(&self) -> Option<String> {
        self.last_tx.map(|hash| self.bridge.explorer_link(&hash))
    }

    pub fn close_receipt(&mut self) {
        self.selected_product = None;
        self.last_tx = None;
    }
}

use ethers::types::Address;

use crate::dashboard::state::MarketState;
use crate::dashboard::types::{Order, OrderStatus};
use crate::dashboard::DashboardError;
use crate::wallet::{WalletBridge, WalletError};

const INSTALL_WALLET: &str = "Please install MetaMask!";

/// Logistics operator view: filter the order board and move orders along.
pub struct LogisticsDesk {
    bridge: WalletBridge,
    wallet_address: Option<Address>,
    filter: Option<OrderStatus>,
}

impl LogisticsDesk {
    pub fn new(bridge: WalletBridge) -> Self {
        Self {
            bridge,
            wallet_address: None,
            filter: None,
        }
    }

    pub fn wallet_address(&self) -> Option<Address> {
        self.wallet_address
    }

    pub async fn connect(&mut self) -> Result<Address, DashboardError> {
        let address = self.bridge.connect().await.map_err(|e| match e {
            WalletError::ProviderMissing => DashboardError::WalletMissing(INSTALL_WALLET),
            other => DashboardError::wallet(other, "Failed to connect wallet"),
        })?;

        self.wallet_address = Some(address);
        Ok(address)
    }

    pub fn filter(&self) -> Option<OrderStatus> {
        self.filter
    }

    /// `None` shows every order
    pub fn set_filter(&mut self, filter: Option<OrderStatus>) {
        self.filter = filter;
    }

    pub fn visible_orders<'a>(&self, state: &'a MarketState) -> Vec<&'a Order> {
        state.filter_orders(self.filter)
    }

    pub fn advance(&self, state: &mut MarketState, order_id: &str) -> Result<OrderStatus, DashboardError> {
        Ok(state.advance_order(order_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogisticsConfig, SimulatorConfig, WalletConfig};
    use crate::dashboard::state::StateError;
    use crate::dashboard::types::Product;
    use crate::wallet::simulator::SimulatedWallet;
    use crate::wallet::types::random_address;
    use crate::wallet::WalletProvider;
    use chrono::Utc;
    use ethers::types::TxHash;
    use std::sync::Arc;

    fn state_with_orders(n: usize) -> (MarketState, Vec<String>) {
        let mut state = MarketState::new(&LogisticsConfig::default());
        let mut ids = Vec::new();
        for i in 0..n {
            let product_id = format!("PRD-{}", i);
            state.list_product(Product {
                id: product_id.clone(),
                crop_type: "Maize".to_string(),
                commodity_group: "Cereals".to_string(),
                quantity: 500.0,
                price: 2100.0,
                suggested_price: 2100.0,
                quality_grade: 2,
                market_location: "Vijayawada".to_string(),
                state: "Andhra Pradesh".to_string(),
                season: "Kharif".to_string(),
                farmer_address: random_address(),
                created_at: Utc::now(),
            });
            let order = state.purchase(&product_id, TxHash::zero(), random_address()).unwrap();
            ids.push(order.id.clone());
        }
        (state, ids)
    }

    #[tokio::test]
    async fn test_connect_messages() {
        let mut desk = LogisticsDesk::new(WalletBridge::new(None, &WalletConfig::default()));
        assert_eq!(desk.connect().await.unwrap_err().to_string(), INSTALL_WALLET);

        let wallet = Arc::new(SimulatedWallet::new(&SimulatorConfig::default()));
        let provider = Some(wallet as Arc<dyn WalletProvider>);
        let mut desk = LogisticsDesk::new(WalletBridge::new(provider, &WalletConfig::default()));
        let address = desk.connect().await.unwrap();
        assert_eq!(desk.wallet_address(), Some(address));
    }

    #[test]
    fn test_filtered_board() {
        let (mut state, ids) = state_with_orders(3);
        let mut desk = LogisticsDesk::new(WalletBridge::new(None, &WalletConfig::default()));

        desk.advance(&mut state, &ids[2]).unwrap();
        desk.set_filter(Some(OrderStatus::Pending));

        let visible: Vec<&str> = desk.visible_orders(&state).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(visible, vec![ids[0].as_str(), ids[1].as_str()]);

        desk.set_filter(None);
        assert_eq!(desk.visible_orders(&state).len(), 3);
    }

    #[test]
    fn test_in_transit_only_reaches_delivered() {
        let (mut state, ids) = state_with_orders(1);
        let desk = LogisticsDesk::new(WalletBridge::new(None, &WalletConfig::default()));

        desk.advance(&mut state, &ids[0]).unwrap();
        assert_eq!(desk.advance(&mut state, &ids[0]).unwrap(), OrderStatus::InTransit);
        assert_eq!(desk.advance(&mut state, &ids[0]).unwrap(), OrderStatus::Delivered);

        let err = desk.advance(&mut state, &ids[0]).unwrap_err();
        assert!(matches!(err, DashboardError::Order(StateError::AlreadyDelivered(_))));
    }
}

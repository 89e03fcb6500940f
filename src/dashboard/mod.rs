//! Role-based dashboard session.
//!
//! [`Dashboard`] owns the market state and the three role desks. Every user
//! action goes through it, and every failure comes back out as a
//! [`Notification`] instead of an error: nothing a user does can take the
//! session down.

pub mod buyer;
pub mod farmer;
pub mod logistics;
pub mod state;
pub mod types;

use anyhow::Result;
use ethers::types::{Address, TxHash};
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::data::catalog::RequestError;
use crate::data::types::{
    DemandForecastRequest, DemandForecastResponse, PricePredictRequest, PricePredictResponse,
};
use crate::data::{ApiError, PredictApiClient};
use crate::monitoring::CsvLogger;
use crate::wallet::{WalletBridge, WalletError, WalletProvider};

use buyer::BuyerDesk;
use farmer::FarmerDesk;
use logistics::LogisticsDesk;
use state::{MarketState, StateError};
use types::{Notification, Order, OrderStatus, Role};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    InvalidRequest(#[from] RequestError),

    #[error("Please get price suggestion first!")]
    MissingSuggestion,

    #[error("{0}")]
    WalletMissing(&'static str),

    #[error("Please connect your wallet first!")]
    WalletNotConnected,

    /// Wallet request failed; carries the provider's message
    #[error("{0}")]
    Wallet(String),

    #[error("Product {0} is no longer available")]
    UnknownProduct(String),

    #[error("{0}")]
    Order(#[from] StateError),
}

impl DashboardError {
    /// Provider message when there is one, `fallback` otherwise
    pub fn wallet(err: WalletError, fallback: &str) -> Self {
        let message = match err {
            WalletError::Rejected(msg) if !msg.trim().is_empty() => msg,
            WalletError::Rejected(_) => fallback.to_string(),
            other => other.to_string(),
        };
        DashboardError::Wallet(message)
    }
}

pub struct Dashboard {
    client: PredictApiClient,
    state: MarketState,
    farmer: FarmerDesk,
    buyer: BuyerDesk,
    logistics: LogisticsDesk,
    active_role: Role,
    notifications: Vec<Notification>,
}

impl Dashboard {
    pub fn new(config: &Config, provider: Option<Arc<dyn WalletProvider>>) -> Result<Self> {
        config.validate()?;
        let bridge = WalletBridge::new(provider, &config.wallet);

        let mut state = MarketState::new(&config.logistics);
        if config.monitoring.csv_logging {
            state = state.with_audit(CsvLogger::new(config.monitoring.csv_log_path.clone())?);
        }

        Ok(Self {
            client: PredictApiClient::new(config.api.base_url.clone()),
            state,
            farmer: FarmerDesk::new(),
            buyer: BuyerDesk::new(bridge.clone()),
            logistics: LogisticsDesk::new(bridge),
            active_role: Role::default(),
            notifications: Vec::new(),
        })
    }

    pub fn active_role(&self) -> Role {
        self.active_role
    }

    pub fn switch_role(&mut self, role: Role) {
        self.active_role = role;
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn farmer(&self) -> &FarmerDesk {
        &self.farmer
    }

    /// Form editing goes straight to the desk
    pub fn farmer_mut(&mut self) -> &mut FarmerDesk {
        &mut self.farmer
    }

    pub fn buyer(&self) -> &BuyerDesk {
        &self.buyer
    }

    pub fn logistics(&self) -> &LogisticsDesk {
        &self.logistics
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand over pending notifications, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn settle<T>(&mut self, result: Result<T, DashboardError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} action failed: {}", self.active_role, e);
                self.notifications.push(Notification::error(e.to_string()));
                None
            }
        }
    }

    fn success(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification::success(message));
    }

    // Farmer

    pub async fn request_price_suggestion(&mut self) -> Option<f64> {
        let result = self.farmer.request_suggestion(&self.client).await;
        let price = self.settle(result)?;
        self.success("Price suggestion generated!");
        Some(price)
    }

    /// List the farmer's form as a product; returns its id
    pub fn list_for_sale(&mut self) -> Option<String> {
        let product = self.farmer.list_for_sale();
        let product = self.settle(product)?;
        let id = product.id.clone();
        self.state.list_product(product);
        self.success("Product listed for sale!");
        Some(id)
    }

    pub async fn predict_price(&mut self, request: &PricePredictRequest) -> Option<PricePredictResponse> {
        let result = self.farmer.predict_price(&self.client, request).await;
        self.settle(result)
    }

    pub async fn forecast_demand(&mut self, request: &DemandForecastRequest) -> Option<DemandForecastResponse> {
        let result = self.farmer.forecast_demand(&self.client, request).await;
        self.settle(result)
    }

    // Buyer

    pub async fn connect_buyer_wallet(&mut self) -> Option<Address> {
        let result = self.buyer.connect().await;
        let address = self.settle(result)?;
        self.success("Wallet connected successfully!");
        Some(address)
    }

    pub async fn buy(&mut self, product_id: &str) -> Option<TxHash> {
        let result = self.buyer.buy(&mut self.state, product_id).await;
        let hash = self.settle(result)?;
        self.success("Transaction submitted successfully!");
        Some(hash)
    }

    pub fn close_receipt(&mut self) {
        self.buyer.close_receipt();
    }

    // Logistics

    pub async fn connect_logistics_wallet(&mut self) -> Option<Address> {
        let result = self.logistics.connect().await;
        let address = self.settle(result)?;
        self.success("Logistics wallet connected!");
        Some(address)
    }

    pub fn set_order_filter(&mut self, filter: Option<OrderStatus>) {
        self.logistics.set_filter(filter);
    }

    pub fn visible_orders(&self) -> Vec<&Order> {
        self.logistics.visible_orders(&self.state)
    }

    pub fn advance_order(&mut self, order_id: &str) -> Option<OrderStatus> {
        let result = self.logistics.advance(&mut self.state, order_id);
        let status = self.settle(result)?;
        self.success(format!("Order {} marked as {}", order_id, status.label()));
        Some(status)
    }
}

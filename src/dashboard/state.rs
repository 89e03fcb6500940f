use chrono::{Duration, Utc};
use ethers::types::{Address, TxHash};
use tracing::{info, warn};

use crate::config::LogisticsConfig;
use crate::dashboard::types::{IdGenerator, Order, OrderStatus, Product};
use crate::monitoring::CsvLogger;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Order {0} not found")]
    UnknownOrder(String),

    #[error("Order {0} is already delivered")]
    AlreadyDelivered(String),
}

/// Session-scoped marketplace: products on offer and the orders they turned into.
///
/// Nothing here is persisted. The single owner mutates it through `&mut self`,
/// so there are no concurrent writers to reconcile.
pub struct MarketState {
    products: Vec<Product>,
    orders: Vec<Order>,
    order_ids: IdGenerator,
    delivery_eta: Duration,
    buyer_location: String,
    audit: Option<CsvLogger>,
}

impl MarketState {
    pub fn new(config: &LogisticsConfig) -> Self {
        Self {
            products: Vec::new(),
            orders: Vec::new(),
            order_ids: IdGenerator::new("ORD"),
            delivery_eta: Duration::days(config.delivery_eta_days),
            buyer_location: config.buyer_location.clone(),
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: CsvLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn list_product(&mut self, product: Product) {
        info!(
            "Listed {} ({} kg @ {:.2}) as {}",
            product.crop_type, product.quantity, product.price, product.id
        );
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_listing(&product) {
                warn!("Audit log write failed: {:#}", e);
            }
        }
        self.products.push(product);
    }

    /// Turn a listed product into a `pending` order. Unknown ids change nothing.
    pub fn purchase(&mut self, product_id: &str, tx_hash: TxHash, buyer: Address) -> Option<&Order> {
        let index = self.products.iter().position(|p| p.id == product_id)?;
        let product = self.products.remove(index);

        let created_at = Utc::now();
        let order = Order {
            id: self.order_ids.next_id(),
            product_name: product.crop_type,
            quantity: product.quantity,
            buyer_address: buyer,
            farmer_location: format!("{}, {}", product.market_location, product.state),
            buyer_location: self.buyer_location.clone(),
            status: OrderStatus::Pending,
            created_at,
            estimated_delivery: created_at + self.delivery_eta,
            tx_hash,
        };
        info!("Order {} created for product {}", order.id, product_id);

        self.record(&order);
        self.orders.push(order);
        self.orders.last()
    }

    /// Move an order to the next status in the flow.
    pub fn advance_order(&mut self, order_id: &str) -> Result<OrderStatus, StateError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StateError::UnknownOrder(order_id.to_string()))?;

        let next = order
            .status
            .next()
            .ok_or_else(|| StateError::AlreadyDelivered(order_id.to_string()))?;

        info!("Order {}: {} -> {}", order_id, order.status, next);
        order.status = next;

        let order = order.clone();
        self.record(&order);
        Ok(next)
    }

    /// Orders with the given status in their original order; `None` means all.
    pub fn filter_orders(&self, status: Option<OrderStatus>) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect()
    }

    /// Order count per status, in flow order
    pub fn status_counts(&self) -> [(OrderStatus, usize); 4] {
        OrderStatus::FLOW.map(|status| {
            (status, self.orders.iter().filter(|o| o.status == status).count())
        })
    }

    fn record(&self, order: &Order) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_order(order) {
                warn!("Audit log write failed: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::types::random_address;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            crop_type: "Jowar (Sorghum)".to_string(),
            commodity_group: "Millet".to_string(),
            quantity: 150.0,
            price: 3100.0,
            suggested_price: 3050.0,
            quality_grade: 3,
            market_location: "Bellary".to_string(),
            state: "Karnataka".to_string(),
            season: "Rabi".to_string(),
            farmer_address: random_address(),
            created_at: Utc::now(),
        }
    }

    fn state_with_products(ids: &[&str]) -> MarketState {
        let mut state = MarketState::new(&LogisticsConfig::default());
        for id in ids {
            state.list_product(product(id));
        }
        state
    }

    #[test]
    fn test_purchase_moves_product_into_pending_order() {
        let mut state = state_with_products(&["PRD-1", "PRD-2"]);
        let buyer = random_address();

        let order = state.purchase("PRD-1", TxHash::from([1; 32]), buyer).unwrap().clone();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.product_name, "Jowar (Sorghum)");
        assert_eq!(order.farmer_location, "Bellary, Karnataka");
        assert_eq!(order.buyer_address, buyer);
        assert_eq!(order.estimated_delivery - order.created_at, Duration::days(3));
        assert_eq!(state.orders().len(), 1);
        assert_eq!(state.products().len(), 1);
        assert!(state.product("PRD-1").is_none());
    }

    #[test]
    fn test_purchase_unknown_product_changes_nothing() {
        let mut state = state_with_products(&["PRD-1"]);

        assert!(state.purchase("PRD-9", TxHash::zero(), random_address()).is_none());
        assert_eq!(state.products().len(), 1);
        assert!(state.orders().is_empty());
    }

    #[test]
    fn test_advance_walks_to_delivered_then_stops() {
        let mut state = state_with_products(&["PRD-1"]);
        let id = state.purchase("PRD-1", TxHash::zero(), random_address()).unwrap().id.clone();

        assert_eq!(state.advance_order(&id), Ok(OrderStatus::PickedUp));
        assert_eq!(state.advance_order(&id), Ok(OrderStatus::InTransit));
        assert_eq!(state.advance_order(&id), Ok(OrderStatus::Delivered));
        assert_eq!(state.advance_order(&id), Err(StateError::AlreadyDelivered(id.clone())));
        assert_eq!(state.order(&id).unwrap().status, OrderStatus::Delivered);
    }

    #[test]
    fn test_advance_only_touches_matching_order() {
        let mut state = state_with_products(&["PRD-1", "PRD-2"]);
        let first = state.purchase("PRD-1", TxHash::zero(), random_address()).unwrap().id.clone();
        let second = state.purchase("PRD-2", TxHash::zero(), random_address()).unwrap().id.clone();
        assert_ne!(first, second);

        state.advance_order(&second).unwrap();

        assert_eq!(state.order(&first).unwrap().status, OrderStatus::Pending);
        assert_eq!(state.order(&second).unwrap().status, OrderStatus::PickedUp);
        assert_eq!(
            state.advance_order("ORD-0"),
            Err(StateError::UnknownOrder("ORD-0".to_string()))
        );
    }

    #[test]
    fn test_filter_preserves_order() {
        let mut state = state_with_products(&["PRD-1", "PRD-2", "PRD-3", "PRD-4"]);
        let ids: Vec<String> = ["PRD-1", "PRD-2", "PRD-3", "PRD-4"]
            .iter()
            .map(|p| state.purchase(p, TxHash::zero(), random_address()).unwrap().id.clone())
            .collect();
        state.advance_order(&ids[1]).unwrap();
        state.advance_order(&ids[3]).unwrap();

        let pending: Vec<&str> = state
            .filter_orders(Some(OrderStatus::Pending))
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(pending, vec![ids[0].as_str(), ids[2].as_str()]);

        let picked: Vec<&str> = state
            .filter_orders(Some(OrderStatus::PickedUp))
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(picked, vec![ids[1].as_str(), ids[3].as_str()]);

        assert_eq!(state.filter_orders(None).len(), 4);
        assert!(state.filter_orders(Some(OrderStatus::Delivered)).is_empty());
    }

    #[test]
    fn test_status_counts() {
        let mut state = state_with_products(&["PRD-1", "PRD-2", "PRD-3"]);
        let ids: Vec<String> = ["PRD-1", "PRD-2", "PRD-3"]
            .iter()
            .map(|p| state.purchase(p, TxHash::zero(), random_address()).unwrap().id.clone())
            .collect();
        state.advance_order(&ids[0]).unwrap();
        state.advance_order(&ids[0]).unwrap();

        assert_eq!(
            state.status_counts(),
            [
                (OrderStatus::Pending, 2),
                (OrderStatus::PickedUp, 0),
                (OrderStatus::InTransit, 1),
                (OrderStatus::Delivered, 0),
            ]
        );
    }

    #[test]
    fn test_audit_trail_records_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.csv").to_string_lossy().to_string();
        let mut state = MarketState::new(&LogisticsConfig::default())
            .with_audit(CsvLogger::new(path.clone()).unwrap());

        state.list_product(product("PRD-1"));
        let id = state.purchase("PRD-1", TxHash::zero(), random_address()).unwrap().id.clone();
        state.advance_order(&id).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4);
        assert!(contents.contains(",LISTING,PRD-1,"));
        assert!(contents.contains(",pending,"));
        assert!(contents.contains(",picked_up,"));
    }
}

use chrono::{DateTime, Utc};
use ethers::types::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A crop listed for sale. Lives until somebody buys it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub crop_type: String,
    pub commodity_group: String,
    pub quantity: f64,
    /// Selling price, INR per quintal
    pub price: f64,
    pub suggested_price: f64,
    pub quality_grade: i32,
    pub market_location: String,
    pub state: String,
    pub season: String,
    pub farmer_address: Address,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub product_name: String,
    pub quantity: f64,
    pub buyer_address: Address,
    pub farmer_location: String,
    pub buyer_location: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub tx_hash: TxHash,
}

/// Delivery progress. Orders only ever move one step forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PickedUp,
    InTransit,
    Delivered,
}

impl OrderStatus {
    pub const FLOW: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::PickedUp,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
    ];

    /// Position in [`OrderStatus::FLOW`]
    pub fn step(self) -> usize {
        Self::FLOW.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// The immediate successor, `None` once delivered.
    pub fn next(self) -> Option<OrderStatus> {
        Self::FLOW.get(self.step() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending Pickup",
            OrderStatus::PickedUp => "Picked Up",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::FLOW
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Buyer,
    Logistics,
}

impl Default for Role {
    fn default() -> Self {
        Role::Farmer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "farmer"),
            Role::Buyer => write!(f, "buyer"),
            Role::Logistics => write!(f, "logistics"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

/// Hands out `PREFIX-<millis>` ids, bumping the number when two are
/// requested within the same millisecond.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: &'static str,
    last: i64,
}

impl IdGenerator {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, last: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last + 1);
        self.last = id;
        format!("{}-{}", self.prefix, id)
    }
}

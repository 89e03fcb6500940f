use serde::{Deserialize, Serialize};

/// Body of `POST /predict_price`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePredictRequest {
    /// `YYYY/MM/DD`
    pub date: String,
    pub commodity_group: String,
    pub crop_type: String,
    pub state_name: String,
    pub market_location: String,
    pub quantity_kg: f64,
    pub quality_grade: i32,
    pub season: String,
    pub transport_cost: f64,
    pub demand_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePredictResponse {
    pub predicted_price: f64,
}

/// Body of `POST /forecast_demand`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastRequest {
    /// `YYYY/MM/DD`
    pub date: String,
    pub commodity_group: String,
    pub crop_type: String,
    pub state_name: String,
    pub market_location: String,
    pub season: String,
    pub total_quantity_sold: f64,
    pub avg_price_per_kg: f64,
    pub historical_demand_7d: f64,
    pub price_trend_7d: f64,
    pub estimated_production_kg: f64,
    pub policy_support_score: f64,
    /// 0 or 1
    pub festival_flag: i32,
    pub weather_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandLevel::Low => write!(f, "Low"),
            DemandLevel::Medium => write!(f, "Medium"),
            DemandLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastResponse {
    pub demand_score: f64,
    pub demand_level: DemandLevel,
}

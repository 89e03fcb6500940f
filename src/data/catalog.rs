use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::data::types::{DemandForecastRequest, PricePredictRequest};

pub const MARKET_LOCATIONS: &[&str] = &[
    "Adoni", "Kurnool", "Anantapur", "Guntur", "Vijayawada", "Raichur", "Bellary",
];

pub const COMMODITY_GROUPS: &[&str] = &["Millet", "Oilseed", "Pulses", "Cereals"];

pub const SEASONS: &[&str] = &["Kharif", "Rabi", "Summer"];

pub const STATES: &[&str] = &[
    "Andhra Pradesh", "Karnataka", "Tamil Nadu", "Telangana", "Maharashtra",
];

const MILLET: &[&str] = &[
    "Bajra (Pearl Millet/Cumbu)", "Ragi (Finger Millet)", "Jowar (Sorghum)", "Foxtail Millet",
];
const OILSEED: &[&str] = &["Groundnut", "Sunflower", "Sesame", "Safflower", "Castor"];
const PULSES: &[&str] = &["Red Gram", "Black Gram", "Green Gram", "Bengal Gram"];
const CEREALS: &[&str] = &["Rice", "Wheat", "Maize"];

pub const MIN_QUALITY_GRADE: i32 = 1;
pub const MAX_QUALITY_GRADE: i32 = 5;
pub const MAX_DEMAND_INDEX: f64 = 2.0;

/// Crop types sold under a commodity group. The first entry is the default
/// selection when the group changes.
pub fn crops_for(group: &str) -> &'static [&'static str] {
    match group {
        "Millet" => MILLET,
        "Oilseed" => OILSEED,
        "Pulses" => PULSES,
        "Cereals" => CEREALS,
        _ => &[],
    }
}

pub fn clamp_quality_grade(grade: i32) -> i32 {
    grade.clamp(MIN_QUALITY_GRADE, MAX_QUALITY_GRADE)
}

/// Quantity stepper: never drops below `min`
pub fn step_quantity(current: f64, delta: f64, min: f64) -> f64 {
    (current + delta).max(min)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid date '{0}': expected YYYY/MM/DD")]
    InvalidDate(String),

    #[error("Quality grade must be between 1 and 5, got {0}")]
    QualityGradeOutOfRange(i32),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("Festival flag must be 0 or 1, got {0}")]
    InvalidFestivalFlag(i32),
}

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}/\d{2}/\d{2}$").expect("static date pattern"))
}

pub fn validate_date(date: &str) -> Result<NaiveDate, RequestError> {
    if !date_shape().is_match(date) {
        return Err(RequestError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%Y/%m/%d")
        .map_err(|_| RequestError::InvalidDate(date.to_string()))
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RequestError> {
    if !(min..=max).contains(&value) {
        return Err(RequestError::OutOfRange { field, min, max, value });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), RequestError> {
    if value < 0.0 || value.is_nan() {
        return Err(RequestError::Negative(field));
    }
    Ok(())
}

/// Unknown categories are still sent; the prediction service encodes them itself.
fn warn_unknown_categories(group: &str, crop: &str, state: &str, market: &str, season: &str) {
    if !COMMODITY_GROUPS.contains(&group) {
        warn!("Unknown commodity group: {}", group);
    } else if !crops_for(group).contains(&crop) {
        warn!("Crop '{}' is not listed under {}", crop, group);
    }
    if !STATES.contains(&state) {
        warn!("Unknown state: {}", state);
    }
    if !MARKET_LOCATIONS.contains(&market) {
        warn!("Unknown market location: {}", market);
    }
    if !SEASONS.contains(&season) {
        warn!("Unknown season: {}", season);
    }
}

impl PricePredictRequest {
    /// Values the price prediction form starts with
    pub fn form_defaults() -> Self {
        Self {
            date: "2026/01/12".to_string(),
            commodity_group: COMMODITY_GROUPS[0].to_string(),
            crop_type: MILLET[0].to_string(),
            state_name: STATES[0].to_string(),
            market_location: MARKET_LOCATIONS[0].to_string(),
            quantity_kg: 100.0,
            quality_grade: MIN_QUALITY_GRADE,
            season: SEASONS[0].to_string(),
            transport_cost: 20.0,
            demand_index: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        validate_date(&self.date)?;
        if !(MIN_QUALITY_GRADE..=MAX_QUALITY_GRADE).contains(&self.quality_grade) {
            return Err(RequestError::QualityGradeOutOfRange(self.quality_grade));
        }
        check_non_negative("quantity_kg", self.quantity_kg)?;
        check_non_negative("transport_cost", self.transport_cost)?;
        check_range("demand_index", self.demand_index, 0.0, MAX_DEMAND_INDEX)?;

        warn_unknown_categories(
            &self.commodity_group,
            &self.crop_type,
            &self.state_name,
            &self.market_location,
            &self.season,
        );
        Ok(())
    }
}

impl DemandForecastRequest {
    /// Values the demand forecasting form starts with
    pub fn form_defaults() -> Self {
        Self {
            date: "2026/01/12".to_string(),
            commodity_group: COMMODITY_GROUPS[0].to_string(),
            crop_type: MILLET[0].to_string(),
            state_name: STATES[0].to_string(),
            market_location: MARKET_LOCATIONS[0].to_string(),
            season: SEASONS[0].to_string(),
            total_quantity_sold: 1000.0,
            avg_price_per_kg: 50.0,
            historical_demand_7d: 500.0,
            price_trend_7d: 50.0,
            estimated_production_kg: 10000.0,
            policy_support_score: 0.5,
            festival_flag: 0,
            weather_index: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        validate_date(&self.date)?;
        check_non_negative("total_quantity_sold", self.total_quantity_sold)?;
        check_non_negative("avg_price_per_kg", self.avg_price_per_kg)?;
        check_non_negative("historical_demand_7d", self.historical_demand_7d)?;
        check_non_negative("estimated_production_kg", self.estimated_production_kg)?;
        check_range("policy_support_score", self.policy_support_score, 0.0, 1.0)?;
        check_range("weather_index", self.weather_index, 0.0, 1.0)?;
        if self.festival_flag != 0 && self.festival_flag != 1 {
            return Err(RequestError::InvalidFestivalFlag(self.festival_flag));
        }

        warn_unknown_categories(
            &self.commodity_group,
            &self.crop_type,
            &self.state_name,
            &self.market_location,
            &self.season,
        );
        Ok(())
    }
}

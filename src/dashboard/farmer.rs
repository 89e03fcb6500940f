use chrono::Utc;

use crate::dashboard::types::{IdGenerator, Product};
use crate::dashboard::DashboardError;
use crate::data::catalog::{clamp_quality_grade, crops_for, step_quantity};
use crate::data::types::{
    DemandForecastRequest, DemandForecastResponse, PricePredictRequest, PricePredictResponse,
};
use crate::data::PredictApiClient;
use crate::wallet::types::random_address;

const DEFAULT_LISTING_QUANTITY: f64 = 100.0;
const MIN_LISTING_QUANTITY: f64 = 10.0;

/// Farmer tools: price suggestions, listing crops, the stand-alone forecasts.
pub struct FarmerDesk {
    /// Listing form; also the price suggestion request
    pub form: PricePredictRequest,
    suggested_price: Option<f64>,
    selling_price: f64,
    product_ids: IdGenerator,
    last_price: Option<PricePredictResponse>,
    last_demand: Option<DemandForecastResponse>,
}

impl FarmerDesk {
    pub fn new() -> Self {
        let mut form = PricePredictRequest::form_defaults();
        form.date = "2026/01/18".to_string();
        form.quality_grade = 3;

        Self {
            form,
            suggested_price: None,
            selling_price: 0.0,
            product_ids: IdGenerator::new("PRD"),
            last_price: None,
            last_demand: None,
        }
    }

    pub fn suggested_price(&self) -> Option<f64> {
        self.suggested_price
    }

    pub fn selling_price(&self) -> f64 {
        self.selling_price
    }

    pub fn set_selling_price(&mut self, price: f64) {
        self.selling_price = price;
    }

    /// Switching group resets the crop to the group's first entry
    pub fn set_commodity_group(&mut self, group: &str) {
        self.form.commodity_group = group.to_string();
        if let Some(first) = crops_for(group).first() {
            self.form.crop_type = first.to_string();
        }
    }

    pub fn step_quality_grade(&mut self, delta: i32) {
        self.form.quality_grade = clamp_quality_grade(self.form.quality_grade + delta);
    }

    pub fn step_quantity(&mut self, delta: f64) {
        self.form.quantity_kg = step_quantity(self.form.quantity_kg, delta, MIN_LISTING_QUANTITY);
    }

    /// Ask the prediction service what the listing form should sell for.
    /// The answer becomes both the suggested and the selling price.
    pub async fn request_suggestion(&mut self, client: &PredictApiClient) -> Result<f64, DashboardError> {
        self.form.validate()?;
        let response = client.predict_price(&self.form).await?;

        self.suggested_price = Some(response.predicted_price);
        self.selling_price = response.predicted_price;
        Ok(response.predicted_price)
    }

    /// Build a product from the listing form and reset it.
    /// A suggestion of zero or less counts as no suggestion.
    pub fn list_for_sale(&mut self) -> Result<Product, DashboardError> {
        let suggested_price = self
            .suggested_price
            .filter(|price| *price > 0.0)
            .ok_or(DashboardError::MissingSuggestion)?;

        let product = Product {
            id: self.product_ids.next_id(),
            crop_type: self.form.crop_type.clone(),
            commodity_group: self.form.commodity_group.clone(),
            quantity: self.form.quantity_kg,
            price: self.selling_price,
            suggested_price,
            quality_grade: self.form.quality_grade,
            market_location: self.form.market_location.clone(),
            state: self.form.state_name.clone(),
            season: self.form.season.clone(),
            farmer_address: random_address(),
            created_at: Utc::now(),
        };

        self.suggested_price = None;
        self.selling_price = 0.0;
        self.form.quantity_kg = DEFAULT_LISTING_QUANTITY;

        Ok(product)
    }

    pub async fn predict_price(
        &mut self,
        client: &PredictApiClient,
        request: &PricePredictRequest,
    ) -> Result<PricePredictResponse, DashboardError> {
        request.validate()?;
        let response = client.predict_price(request).await?;
        self.last_price = Some(response);
        Ok(response)
    }

    pub async fn forecast_demand(
        &mut self,
        client: &PredictApiClient,
        request: &DemandForecastRequest,
    ) -> Result<DemandForecastResponse, DashboardError> {
        request.validate()?;
        let response = client.forecast_demand(request).await?;
        self.last_demand = Some(response);
        Ok(response)
    }

    /// Most recent price prediction shown on the form
    pub fn last_price(&self) -> Option<&PricePredictResponse> {
        self.last_price.as_ref()
    }

    /// Most recent demand forecast shown on the form
    pub fn last_demand(&self) -> Option<&DemandForecastResponse> {
        self.last_demand.as_ref()
    }
}

impl Default for FarmerDesk {
    fn default() -> Self {
        Self::new()
    }
}

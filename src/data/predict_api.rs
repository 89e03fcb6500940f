use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::data::types::{
    DemandForecastRequest, DemandForecastResponse, PricePredictRequest, PricePredictResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx answer. `message` is the response body, or a fallback when empty.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to parse prediction response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the price/demand prediction service.
///
/// One attempt per call: no retries and no timeout beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct PredictApiClient {
    client: Client,
    base_url: String,
}

impl PredictApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST /predict_price`
    pub async fn predict_price(
        &self,
        request: &PricePredictRequest,
    ) -> Result<PricePredictResponse, ApiError> {
        let response: PricePredictResponse = self
            .post("predict_price", request, "Failed to predict price")
            .await?;

        info!(
            "Predicted price for {} at {}: {}",
            request.crop_type, request.market_location, response.predicted_price
        );
        Ok(response)
    }

    /// `POST /forecast_demand`
    pub async fn forecast_demand(
        &self,
        request: &DemandForecastRequest,
    ) -> Result<DemandForecastResponse, ApiError> {
        let response: DemandForecastResponse = self
            .post("forecast_demand", request, "Failed to forecast demand")
            .await?;

        info!(
            "Demand forecast for {} at {}: {} ({})",
            request.crop_type, request.market_location, response.demand_score, response.demand_level
        );
        Ok(response)
    }

    async fn post<B, R>(&self, path: &str, body: &B, fallback: &str) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable body is treated like an empty one
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() { fallback.to_string() } else { text };
            warn!("{} returned {}: {}", url, status, message);
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<R>().await.map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::DemandLevel;
    use crate::test_support::serve_once;

    #[tokio::test]
    async fn test_predicted_price_returned_verbatim() {
        let (url, server) = serve_once(200, r#"{"predicted_price": 2871.46}"#).await;
        let client = PredictApiClient::new(url);

        let resp = client
            .predict_price(&PricePredictRequest::form_defaults())
            .await
            .unwrap();
        assert_eq!(resp.predicted_price, 2871.46);

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "POST /predict_price HTTP/1.1");
        let sent: PricePredictRequest = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(sent, PricePredictRequest::form_defaults());
    }

    #[tokio::test]
    async fn test_forecast_demand_parses_level() {
        let (url, server) =
            serve_once(200, r#"{"demand_score": 812.0, "demand_level": "Medium"}"#).await;
        let client = PredictApiClient::new(format!("{}/", url));

        let resp = client
            .forecast_demand(&DemandForecastRequest::form_defaults())
            .await
            .unwrap();
        assert_eq!(resp.demand_level, DemandLevel::Medium);
        assert_eq!(resp.demand_score, 812.0);

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "POST /forecast_demand HTTP/1.1");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let (url, _server) = serve_once(500, r#"{"detail":"Price model not loaded"}"#).await;
        let client = PredictApiClient::new(url);

        let err = client
            .predict_price(&PricePredictRequest::form_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Backend { status: 500, .. }));
        assert_eq!(err.to_string(), r#"{"detail":"Price model not loaded"}"#);
    }

    #[tokio::test]
    async fn test_error_status_with_empty_body_uses_fallback() {
        let (url, _server) = serve_once(503, "").await;
        let client = PredictApiClient::new(url);

        let err = client
            .forecast_demand(&DemandForecastRequest::form_defaults())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to forecast demand");

        let (url, _server) = serve_once(422, "").await;
        let err = PredictApiClient::new(url)
            .predict_price(&PricePredictRequest::form_defaults())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to predict price");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let (url, _server) = serve_once(200, r#"{"price": 10}"#).await;
        let client = PredictApiClient::new(url);

        let err = client
            .predict_price(&PricePredictRequest::form_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind and drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PredictApiClient::new(format!("http://{}", addr));
        let err = client
            .predict_price(&PricePredictRequest::form_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::Path;

use agri_predict::config::{Config, EnvConfig};
use agri_predict::dashboard::types::{NotificationLevel, Role};
use agri_predict::dashboard::Dashboard;
use agri_predict::data::catalog::crops_for;
use agri_predict::data::types::{DemandForecastRequest, PricePredictRequest};
use agri_predict::data::PredictApiClient;
use agri_predict::wallet::provider_from_config;
use agri_predict::wallet::types::short_address;

#[derive(Parser, Debug)]
#[command(name = "agri-predict", about = "Crop price and demand predictions with a demo marketplace")]
struct Cli {
    /// Path to the TOML config; defaults apply when it is missing
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the prediction service for a crop price
    PredictPrice(PriceArgs),
    /// Ask the prediction service for a demand forecast
    ForecastDemand(DemandArgs),
    /// Walk one listing through suggestion, purchase and delivery
    Demo {
        /// Override the suggested price when listing
        #[arg(long)]
        selling_price: Option<f64>,
    },
}

/// Fields shared by both forms
#[derive(Args, Debug)]
struct MarketArgs {
    /// YYYY/MM/DD
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    commodity_group: Option<String>,
    #[arg(long)]
    crop_type: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    market: Option<String>,
    #[arg(long)]
    season: Option<String>,
}

#[derive(Args, Debug)]
struct PriceArgs {
    #[command(flatten)]
    market: MarketArgs,
    #[arg(long)]
    quantity: Option<f64>,
    #[arg(long)]
    quality_grade: Option<i32>,
    #[arg(long)]
    transport_cost: Option<f64>,
    #[arg(long)]
    demand_index: Option<f64>,
}

#[derive(Args, Debug)]
struct DemandArgs {
    #[command(flatten)]
    market: MarketArgs,
    #[arg(long)]
    total_quantity_sold: Option<f64>,
    #[arg(long)]
    avg_price: Option<f64>,
    #[arg(long)]
    historical_demand: Option<f64>,
    #[arg(long)]
    price_trend: Option<f64>,
    #[arg(long)]
    estimated_production: Option<f64>,
    #[arg(long)]
    policy_score: Option<f64>,
    #[arg(long)]
    festival: bool,
    #[arg(long)]
    weather_index: Option<f64>,
}

impl MarketArgs {
    /// Overlay onto form values; a new group without a crop picks the group's first crop
    fn apply(
        self,
        date: &mut String,
        group: &mut String,
        crop: &mut String,
        state: &mut String,
        market: &mut String,
        season: &mut String,
    ) {
        if let Some(v) = self.date { *date = v; }
        if let Some(v) = self.commodity_group {
            if let Some(first) = crops_for(&v).first() {
                *crop = first.to_string();
            }
            *group = v;
        }
        if let Some(v) = self.crop_type { *crop = v; }
        if let Some(v) = self.state { *state = v; }
        if let Some(v) = self.market { *market = v; }
        if let Some(v) = self.season { *season = v; }
    }
}

impl PriceArgs {
    fn into_request(self) -> PricePredictRequest {
        let mut req = PricePredictRequest::form_defaults();
        self.market.apply(
            &mut req.date,
            &mut req.commodity_group,
            &mut req.crop_type,
            &mut req.state_name,
            &mut req.market_location,
            &mut req.season,
        );
        if let Some(v) = self.quantity { req.quantity_kg = v; }
        if let Some(v) = self.quality_grade { req.quality_grade = v; }
        if let Some(v) = self.transport_cost { req.transport_cost = v; }
        if let Some(v) = self.demand_index { req.demand_index = v; }
        req
    }
}

impl DemandArgs {
    fn into_request(self) -> DemandForecastRequest {
        let mut req = DemandForecastRequest::form_defaults();
        self.market.apply(
            &mut req.date,
            &mut req.commodity_group,
            &mut req.crop_type,
            &mut req.state_name,
            &mut req.market_location,
            &mut req.season,
        );
        if let Some(v) = self.total_quantity_sold { req.total_quantity_sold = v; }
        if let Some(v) = self.avg_price { req.avg_price_per_kg = v; }
        if let Some(v) = self.historical_demand { req.historical_demand_7d = v; }
        if let Some(v) = self.price_trend { req.price_trend_7d = v; }
        if let Some(v) = self.estimated_production { req.estimated_production_kg = v; }
        if let Some(v) = self.policy_score { req.policy_support_score = v; }
        if let Some(v) = self.weather_index { req.weather_index = v; }
        req.festival_flag = i32::from(self.festival);
        req
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        tracing::info!("No config at {}, using defaults", cli.config);
        Config::default()
    };
    let config = config.with_env(&EnvConfig::load()?);
    tracing::info!("Prediction service: {}", config.api.base_url);

    match cli.command {
        Command::PredictPrice(args) => {
            let request = args.into_request();
            request.validate()?;
            let client = PredictApiClient::new(config.api.base_url.clone());
            let response = client.predict_price(&request).await?;
            println!("Predicted price: ₹{} per quintal", response.predicted_price);
        }
        Command::ForecastDemand(args) => {
            let request = args.into_request();
            request.validate()?;
            let client = PredictApiClient::new(config.api.base_url.clone());
            let response = client.forecast_demand(&request).await?;
            println!(
                "Demand: {} (score {})",
                response.demand_level, response.demand_score
            );
        }
        Command::Demo { selling_price } => run_demo(&config, selling_price).await?,
    }

    Ok(())
}

async fn run_demo(config: &Config, selling_price: Option<f64>) -> Result<()> {
    let provider = provider_from_config(config)?;
    let mut dash = Dashboard::new(config, provider).context("Failed to start dashboard")?;

    println!("== {} ==", Role::Farmer);
    let suggested = dash.request_price_suggestion().await;
    flush(&mut dash);
    if suggested.is_none() {
        return Ok(());
    }
    if let Some(price) = selling_price {
        dash.farmer_mut().set_selling_price(price);
    }
    let Some(product_id) = dash.list_for_sale() else {
        flush(&mut dash);
        return Ok(());
    };
    flush(&mut dash);

    dash.switch_role(Role::Buyer);
    println!("== {} ==", dash.active_role());
    if let Some(address) = dash.connect_buyer_wallet().await {
        println!("Wallet {}", short_address(&address));
    }
    let bought = dash.buy(&product_id).await;
    flush(&mut dash);
    if let Some(link) = dash.buyer().receipt_link() {
        println!("View on explorer: {}", link);
    }
    dash.close_receipt();
    if bought.is_none() {
        return Ok(());
    }

    dash.switch_role(Role::Logistics);
    println!("== {} ==", dash.active_role());
    dash.connect_logistics_wallet().await;
    flush(&mut dash);

    let order_ids: Vec<String> = dash.visible_orders().iter().map(|o| o.id.clone()).collect();
    for order_id in &order_ids {
        while let Some(status) = dash.advance_order(order_id) {
            if status.is_terminal() {
                break;
            }
        }
    }
    flush(&mut dash);

    for (status, count) in dash.state().status_counts() {
        println!("{:<15} {}", status.label(), count);
    }
    Ok(())
}

fn flush(dash: &mut Dashboard) {
    for note in dash.take_notifications() {
        match note.level {
            NotificationLevel::Success => println!("  ✓ {}", note.message),
            NotificationLevel::Error => println!("  ✗ {}", note.message),
        }
    }
}

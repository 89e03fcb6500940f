use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logistics: LogisticsConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletMode {
    None,
    Simulated,
    Rpc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_wallet_mode")]
    pub mode: WalletMode,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_inr_per_eth")]
    pub inr_per_eth: f64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_approval_rate")]
    pub approval_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticsConfig {
    #[serde(default = "default_delivery_eta_days")]
    pub delivery_eta_days: i64,
    #[serde(default = "default_buyer_location")]
    pub buyer_location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

const MAX_DELIVERY_ETA_DAYS: i64 = 365;

fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_wallet_mode() -> WalletMode { WalletMode::Simulated }
fn default_rpc_url() -> String { "http://localhost:8545".to_string() }
fn default_inr_per_eth() -> f64 { 200_000.0 }
fn default_gas_limit() -> u64 { 21_000 }
fn default_explorer_tx_url() -> String { "https://etherscan.io/tx/".to_string() }
fn default_approval_rate() -> f64 { 1.0 }
fn default_delivery_eta_days() -> i64 { 3 }
fn default_buyer_location() -> String { "Buyer Location".to_string() }
fn default_csv_log_path() -> String { "orders.csv".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            mode: default_wallet_mode(),
            rpc_url: default_rpc_url(),
            inr_per_eth: default_inr_per_eth(),
            gas_limit: default_gas_limit(),
            explorer_tx_url: default_explorer_tx_url(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { approval_rate: default_approval_rate() }
    }
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            delivery_eta_days: default_delivery_eta_days(),
            buyer_location: default_buyer_location(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

/// Overrides picked up from `.env` and the process environment
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api_url: Option<String>,
    pub wallet_rpc_url: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let days = self.logistics.delivery_eta_days;
        if !(0..=MAX_DELIVERY_ETA_DAYS).contains(&days) {
            bail!(
                "logistics.delivery_eta_days must be between 0 and {}, got {}",
                MAX_DELIVERY_ETA_DAYS,
                days
            );
        }
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(url) = &env.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(url) = &env.wallet_rpc_url {
            self.wallet.rpc_url = url.clone();
        }
        self
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            api_url: std::env::var("AGRI_API_URL").ok(),
            wallet_rpc_url: std::env::var("WALLET_RPC_URL").ok(),
        })
    }
}

pub mod bridge;
pub mod rpc;
pub mod simulator;
pub mod types;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{Config, WalletMode};

pub use bridge::WalletBridge;
pub use types::{TransferRequest, WalletError, WalletProvider};

/// The provider configured for this session, if any
pub fn provider_from_config(config: &Config) -> Result<Option<Arc<dyn WalletProvider>>> {
    let provider: Option<Arc<dyn WalletProvider>> = match config.wallet.mode {
        WalletMode::None => None,
        WalletMode::Simulated => Some(Arc::new(simulator::SimulatedWallet::new(&config.simulator))),
        WalletMode::Rpc => Some(Arc::new(rpc::RpcWallet::new(&config.wallet.rpc_url)?)),
    };
    Ok(provider)
}

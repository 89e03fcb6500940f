use async_trait::async_trait;
use ethers::types::{Address, TxHash};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::config::SimulatorConfig;
use crate::wallet::types::{
    random_address, random_tx_hash, short_address, TransferRequest, WalletError, WalletProvider,
};

const USER_REJECTED: &str = "User rejected the request.";

/// Stand-in for a browser wallet. Approves each prompt with probability
/// `approval_rate` and mints random transaction hashes.
pub struct SimulatedWallet {
    accounts: Vec<Address>,
    approval_rate: f64,
    calls: AtomicUsize,
}

impl SimulatedWallet {
    pub fn new(config: &SimulatorConfig) -> Self {
        let account = random_address();
        info!(
            "Simulated wallet ready with account {} (approval rate {:.0}%)",
            short_address(&account),
            config.approval_rate * 100.0
        );

        Self {
            accounts: vec![account],
            approval_rate: config.approval_rate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Number of requests the wallet has received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn approve(&self) -> Result<(), WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let approved = rand::thread_rng().gen::<f64>() < self.approval_rate;
        if approved {
            Ok(())
        } else {
            info!("Simulated wallet: user rejected the prompt");
            Err(WalletError::Rejected(USER_REJECTED.to_string()))
        }
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.approve()?;
        Ok(self.accounts.clone())
    }

    async fn send_transaction(&self, tx: &TransferRequest) -> Result<TxHash, WalletError> {
        self.approve()?;

        if !self.accounts.contains(&tx.from) {
            return Err(WalletError::Rejected(format!(
                "Unknown account {:?}",
                tx.from
            )));
        }

        let hash = random_tx_hash();
        info!(
            "Simulated transfer: {} wei {} -> {} ({:?})",
            tx.value,
            short_address(&tx.from),
            short_address(&tx.to),
            hash
        );
        Ok(hash)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::ledger::{LedgerStats, SettlementReport};
use crate::blockchain::{Block, Ledger, Miner};
use crate::config::Config;
use crate::transaction::Amount;

/// Shared application state: the ledger plus the miner that feeds it.
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub miner: Miner,
    pub faucet_enabled: bool,
    pub mining_interval: Duration,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, miner_address: &str, config: &Config) -> Self {
        Self {
            miner: Miner::new(ledger.clone(), miner_address),
            ledger,
            faucet_enabled: config.faucet_enabled,
            mining_interval: config.mining_interval,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub difficulty: usize,
    pub chain: Vec<Block>,
}

#[derive(Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SettlementReport>,
}

/* ---------- TX API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct NewTxResponse {
    pub accepted: bool,
    pub txid: String,
    pub pool_size: usize,
}

#[derive(Serialize)]
pub struct MempoolEntry {
    pub txid: String,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub nonce: u64,
    pub fee: Amount,
    pub credits_spent: u64,
}

#[derive(Serialize)]
pub struct MempoolResponse {
    pub size: usize,
    pub transactions: Vec<MempoolEntry>,
}

/// Dev helper: sign the seven signed fields with a supplied secret key.
#[derive(Deserialize)]
pub struct SignTxRequest {
    pub private_key: String,
    pub to: String,
    pub amount: Amount,
    pub nonce: u64,
    #[serde(default)]
    pub extra_priority: u64,
    #[serde(default)]
    pub is_token_transfer: bool,
    #[serde(default)]
    pub token_id: Option<String>,
}

/* ---------- Faucet API Models (dev) ---------- */

#[derive(Deserialize)]
pub struct FaucetRequest {
    pub address: String,
    pub amount: Amount,
}

#[derive(Serialize, Deserialize)]
pub struct FaucetResponse {
    pub address: String,
    pub balance: Amount,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub ledger: LedgerStats,
    pub mining_interval_secs: u64,
    pub miner_address: String,
}

use thiserror::Error;

use crate::transaction::Amount;

/// Rejections from the ledger. None of them are fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("insufficient balance: need {needed} (amount + fees), have {available} after pending")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("stale block: expected parent {expected}, got {got}")]
    StaleBlock { expected: String, got: String },
}

impl LedgerError {
    /// Stable machine-readable kind, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidSignature => "invalid_signature",
            LedgerError::InvalidNonce { .. } => "invalid_nonce",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::StaleBlock { .. } => "stale_block",
        }
    }
}

/// Why a pooled transaction was dropped while its block settled. Logged and
/// counted, never reported back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkippedAtSettlement {
    #[error("fee {fee} exceeds settled balance {balance}")]
    FeeUncovered { fee: Amount, balance: Amount },

    #[error("amount {amount} exceeds balance {balance} after fee")]
    AmountUncovered { amount: Amount, balance: Amount },
}

use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::credits::{CreditAccount, DAILY_ALLOWANCE, TxCost};
use super::{BLOCK_REWARD, Block, Blockchain, DIFFICULTY, GENESIS_MINER, TOP_MINER_REWARD, reward};
use crate::error::{LedgerError, SkippedAtSettlement};
use crate::transaction::{Amount, Transaction};

/// An admitted, not yet settled transaction together with what admission charged for it.
#[derive(Debug, Clone, Serialize)]
pub struct PooledTransaction {
    pub tx: Transaction,
    pub cost: TxCost,
}

/// Transactions taken out of the pool by a mining tick, plus the chain tip
/// they will be sealed on top of.
#[derive(Debug)]
pub struct DrainedBatch {
    index: u64,
    previous_hash: String,
    entries: Vec<PooledTransaction>,
}

impl DrainedBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Run Proof-of-Work over the batch. CPU-bound; call without holding the ledger.
    pub fn seal(self, miner: &str, timestamp: i64) -> SealedBlock {
        let (transactions, costs): (Vec<_>, Vec<_>) =
            self.entries.into_iter().map(|e| (e.tx, e.cost)).unzip();
        let mut block = Block::new(
            self.index,
            self.previous_hash,
            transactions,
            miner.to_string(),
            timestamp,
        );
        block.seal();
        SealedBlock { block, costs }
    }
}

/// A sealed block waiting for settlement. `costs[i]` belongs to `block.transactions[i]`.
#[derive(Debug)]
pub struct SealedBlock {
    block: Block,
    costs: Vec<TxCost>,
}

impl SealedBlock {
    pub fn block(&self) -> &Block {
        &self.block
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardPayout {
    pub miner: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    pub index: u64,
    pub hash: String,
    pub applied: usize,
    pub skipped: usize,
    pub rewards: Vec<RewardPayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub address: String,
    pub balance: Amount,
    /// Next nonce admission will accept.
    pub nonce: u64,
    /// Transactions from this address actually applied by settlement.
    pub settled_nonce: u64,
    pub credits: u64,
    pub last_credit_refill: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub height: usize,
    pub difficulty: usize,
    pub pool_size: usize,
    pub accounts: usize,
    pub skipped_at_settlement: u64,
    pub last_block_hash: String,
}

/// Everything the ledger owns. Only reachable through [`Ledger`]'s lock.
#[derive(Debug)]
struct LedgerState {
    chain: Blockchain,
    balances: HashMap<String, Amount>,
    nonces: HashMap<String, u64>,
    settled_nonces: HashMap<String, u64>,
    credits: HashMap<String, CreditAccount>,
    pool: Vec<PooledTransaction>,
    skipped_at_settlement: u64,
}

impl LedgerState {
    fn balance_of(&self, address: &str) -> Amount {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn nonce_of(&self, address: &str) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    fn refill_credits(&mut self, address: &str, now: i64) -> &mut CreditAccount {
        let account = self.credits.entry(address.to_string()).or_default();
        account.refill(now);
        account
    }

    fn credit(&mut self, address: &str, amount: Amount) {
        let balance = self.balances.entry(address.to_string()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Amount + recorded fees of the sender's pooled transactions.
    fn committed_spend(&self, address: &str) -> Amount {
        self.pool
            .iter()
            .filter(|p| p.tx.from == address)
            .map(|p| p.tx.amount.saturating_add(p.cost.currency_total()))
            .sum()
    }

    /// Apply one transaction of a block. A fee that was deducted stays
    /// deducted even when the amount then turns out to be uncovered.
    fn apply(
        &mut self,
        tx: &Transaction,
        cost: &TxCost,
        now: i64,
    ) -> Result<(), SkippedAtSettlement> {
        // credits were spent at admission; this only advances the refill clock
        self.refill_credits(&tx.from, now);

        let fee = cost.currency_total();
        let balance = self.balance_of(&tx.from);
        let after_fee = balance
            .checked_sub(fee)
            .ok_or(SkippedAtSettlement::FeeUncovered { fee, balance })?;
        self.balances.insert(tx.from.clone(), after_fee);

        let remaining =
            after_fee
                .checked_sub(tx.amount)
                .ok_or(SkippedAtSettlement::AmountUncovered {
                    amount: tx.amount,
                    balance: after_fee,
                })?;
        self.balances.insert(tx.from.clone(), remaining);
        self.credit(&tx.to, tx.amount);
        *self.settled_nonces.entry(tx.from.clone()).or_insert(0) += 1;

        debug!(
            "SETTLE - {} -> {} amount={} fee={} sender_balance={}",
            tx.from, tx.to, tx.amount, fee, remaining
        );
        Ok(())
    }
}

/// The ledger state machine. Every operation runs under one exclusive lock.
#[derive(Debug)]
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_genesis_at(Utc::now().timestamp())
    }

    /// Fresh chain whose genesis (and genesis miner's credit stamp) is `timestamp`.
    pub fn with_genesis_at(timestamp: i64) -> Self {
        let chain = Blockchain::new(GENESIS_MINER, timestamp);
        let mut state = LedgerState {
            chain,
            balances: HashMap::new(),
            nonces: HashMap::new(),
            settled_nonces: HashMap::new(),
            credits: HashMap::new(),
            pool: Vec::new(),
            skipped_at_settlement: 0,
        };
        state
            .balances
            .insert(GENESIS_MINER.to_string(), BLOCK_REWARD);
        state.credits.insert(
            GENESIS_MINER.to_string(),
            CreditAccount {
                credits: DAILY_ALLOWANCE,
                last_refill: Some(timestamp),
            },
        );
        Self {
            state: Mutex::new(state),
        }
    }

    /// Validate and enqueue a signed transaction. Returns the new pool size.
    pub fn admit_to_pool(&self, tx: Transaction) -> Result<usize, LedgerError> {
        self.admit_to_pool_at(tx, Utc::now().timestamp())
    }

    pub fn admit_to_pool_at(&self, tx: Transaction, now: i64) -> Result<usize, LedgerError> {
        let mut state = self.state.lock();
        debug!(
            "POOL - admitting {} -> {} amount={} nonce={} extra_priority={} token={}",
            tx.from, tx.to, tx.amount, tx.nonce, tx.extra_priority, tx.is_token_transfer
        );

        if !tx.verify() {
            warn!("POOL - rejected {}: invalid signature", tx.from);
            return Err(LedgerError::InvalidSignature);
        }

        let expected = state.nonce_of(&tx.from);
        if tx.nonce != expected {
            warn!(
                "POOL - rejected {}: invalid nonce (expected {}, got {})",
                tx.from, expected, tx.nonce
            );
            return Err(LedgerError::InvalidNonce {
                expected,
                got: tx.nonce,
            });
        }

        let cost = state.refill_credits(&tx.from, now).charge(&tx);
        debug!(
            "POOL - {} spent {} credits, currency cost {}",
            tx.from,
            cost.credits_spent,
            cost.currency_total()
        );

        // compared unclamped: a pool that already overdraws the settled
        // balance rejects even a zero-cost transaction
        let balance = state.balance_of(&tx.from);
        let committed = state.committed_spend(&tx.from);
        let needed = tx.amount.saturating_add(cost.currency_total());
        if balance < committed.saturating_add(needed) {
            let available = balance.saturating_sub(committed);
            warn!(
                "POOL - rejected {}: need {} (amount + fee), balance {} with {} pending",
                tx.from, needed, balance, committed
            );
            return Err(LedgerError::InsufficientBalance { needed, available });
        }

        let from = tx.from.clone();
        let txid = tx.txid();
        state.pool.push(PooledTransaction { tx, cost });
        state.nonces.insert(from, expected + 1);
        let size = state.pool.len();
        info!("POOL - txid={} accepted (pool size {})", txid, size);
        Ok(size)
    }

    /// Swap the pool for an empty one. `None` when there is nothing to mine.
    pub fn drain_pool(&self) -> Option<DrainedBatch> {
        let mut state = self.state.lock();
        if state.pool.is_empty() {
            return None;
        }
        let entries = std::mem::take(&mut state.pool);
        let tip = state.chain.last_block();
        Some(DrainedBatch {
            index: tip.index + 1,
            previous_hash: tip.hash.clone(),
            entries,
        })
    }

    pub fn settle(&self, sealed: SealedBlock) -> Result<SettlementReport, LedgerError> {
        self.settle_at(sealed, Utc::now().timestamp())
    }

    /// Apply a sealed block's transactions in order, pay the block reward and
    /// append the block. Transactions the sender can no longer pay for are
    /// skipped and counted.
    pub fn settle_at(
        &self,
        sealed: SealedBlock,
        now: i64,
    ) -> Result<SettlementReport, LedgerError> {
        let SealedBlock { block, costs } = sealed;
        let mut state = self.state.lock();

        let tip = state.chain.last_block();
        if block.previous_hash != tip.hash || block.index != tip.index + 1 {
            let expected = tip.hash.clone();
            // the batch already consumed its nonces and credits; it is dropped, not requeued
            for tx in &block.transactions {
                warn!(
                    "SETTLE - stale block #{} dropped tx from {} (nonce {})",
                    block.index, tx.from, tx.nonce
                );
            }
            state.skipped_at_settlement += block.transactions.len() as u64;
            return Err(LedgerError::StaleBlock {
                expected,
                got: block.previous_hash,
            });
        }

        let mut tally: BTreeMap<String, u64> = BTreeMap::new();
        let mut skipped = 0;
        for (tx, cost) in block.transactions.iter().zip(&costs) {
            match state.apply(tx, cost, now) {
                Ok(()) => *tally.entry(block.miner.clone()).or_insert(0) += 1,
                Err(reason) => {
                    skipped += 1;
                    state.skipped_at_settlement += 1;
                    warn!(
                        "SETTLE - block #{} skipped tx from {} (nonce {}): {}",
                        block.index, tx.from, tx.nonce, reason
                    );
                }
            }
        }
        let applied = block.transactions.len() - skipped;

        let payouts = if block.transactions.is_empty() {
            Vec::new()
        } else if tally.is_empty() {
            // every transaction was skipped: the block's miner still ranks first
            vec![(block.miner.clone(), TOP_MINER_REWARD)]
        } else {
            reward::distribute(&tally)
        };
        for (miner, amount) in &payouts {
            state.credit(miner, *amount);
        }

        let report = SettlementReport {
            index: block.index,
            hash: block.hash.clone(),
            applied,
            skipped,
            rewards: payouts
                .into_iter()
                .map(|(miner, amount)| RewardPayout { miner, amount })
                .collect(),
        };
        state.chain.push(block);
        info!(
            "SETTLE - block #{} appended (applied {}, skipped {}, height {})",
            report.index,
            report.applied,
            report.skipped,
            state.chain.len()
        );
        Ok(report)
    }

    /// Chain integrity check. Read-only.
    pub fn is_valid(&self) -> bool {
        self.state.lock().chain.is_valid_chain()
    }

    /// Development faucet: credit `address` directly. Returns the new balance.
    pub fn fund(&self, address: &str, amount: Amount) -> Amount {
        let mut state = self.state.lock();
        state.credit(address, amount);
        state.balance_of(address)
    }

    pub fn account(&self, address: &str) -> AccountView {
        let state = self.state.lock();
        let credit = state.credits.get(address).copied().unwrap_or_default();
        AccountView {
            address: address.to_string(),
            balance: state.balance_of(address),
            nonce: state.nonce_of(address),
            settled_nonce: state.settled_nonces.get(address).copied().unwrap_or(0),
            credits: credit.credits,
            last_credit_refill: credit.last_refill,
        }
    }

    pub fn pool(&self) -> Vec<PooledTransaction> {
        self.state.lock().pool.clone()
    }

    pub fn pool_len(&self) -> usize {
        self.state.lock().pool.len()
    }

    pub fn chain_len(&self) -> usize {
        self.state.lock().chain.len()
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.state.lock().chain.blocks().to_vec()
    }

    pub fn last_block(&self) -> Block {
        self.state.lock().chain.last_block().clone()
    }

    pub fn stats(&self) -> LedgerStats {
        let state = self.state.lock();
        LedgerStats {
            height: state.chain.len(),
            difficulty: DIFFICULTY,
            pool_size: state.pool.len(),
            accounts: state.balances.len(),
            skipped_at_settlement: state.skipped_at_settlement,
            last_block_hash: state.chain.last_block().hash.clone(),
        }
    }
}

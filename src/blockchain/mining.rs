use chrono::Utc;
use log::{debug, error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::Ledger;
use super::ledger::SettlementReport;

/// Periodic block producer: drain the pool, seal outside the ledger lock, settle.
#[derive(Debug, Clone)]
pub struct Miner {
    ledger: Arc<Ledger>,
    address: String,
    // serialises ticks so two of them never seal on the same parent
    tick_guard: Arc<Mutex<()>>,
}

impl Miner {
    pub fn new(ledger: Arc<Ledger>, address: impl Into<String>) -> Self {
        Self {
            ledger,
            address: address.into(),
            tick_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// One mining cycle. Returns `None` when the pool was empty.
    /// Blocking: run it off the async executor.
    pub fn tick(&self) -> Option<SettlementReport> {
        let _guard = self.tick_guard.lock();

        let Some(batch) = self.ledger.drain_pool() else {
            debug!("MINER - tick: no transactions in pool");
            return None;
        };
        info!(
            "MINER - sealing block #{} over {} transactions",
            batch.index(),
            batch.len()
        );

        // the ledger lock is released here: admissions keep flowing while we seal
        let sealed = batch.seal(&self.address, Utc::now().timestamp());
        info!(
            "MINER - sealed block #{} (hash={}, nonce={})",
            sealed.block().index,
            sealed.block().hash,
            sealed.block().nonce
        );

        match self.ledger.settle(sealed) {
            Ok(report) => Some(report),
            Err(e) => {
                error!("MINER - settlement refused: {e}");
                None
            }
        }
    }

    /// Run [`Miner::tick`] every `interval` until the returned handle is shut down.
    pub fn spawn(self, interval: Duration) -> MiningHandle {
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; start mining one interval in
            ticker.tick().await;
            info!(
                "MINER - started for {} (every {}s)",
                self.address,
                interval.as_secs_f64()
            );

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        let miner = self.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || miner.tick()).await {
                            error!("MINER - tick panicked: {e}");
                        }
                    }
                }
            }
            info!("MINER - stopped");
        });
        MiningHandle { cancel, join }
    }
}

/// Owner of a running mining loop.
#[derive(Debug)]
pub struct MiningHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl MiningHandle {
    /// Signal the loop to stop and wait for it. A tick already in flight runs to completion.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            error!("MINER - loop ended abnormally: {e}");
        }
    }
}

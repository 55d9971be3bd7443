pub mod block;
pub mod credits;
pub mod ledger;
pub mod mining;
pub mod model;
pub mod reward;

pub use block::Block;
pub use ledger::Ledger;
pub use mining::Miner;
pub use model::Blockchain;

use crate::transaction::Amount;

/// Proof-of-Work difficulty (number of leading zero hex characters). Fixed.
pub const DIFFICULTY: usize = 2;

/// Miner credited at genesis.
pub const GENESIS_MINER: &str = "genesis_miner";

/// Total reward per non-empty block; also the genesis miner's opening balance.
pub const BLOCK_REWARD: Amount = Amount::from_coins(10);

/// Flat share paid to the top-ranked miner of a block.
pub const TOP_MINER_REWARD: Amount = Amount::from_coins(5);

/// Default seconds between mining ticks.
pub const DEFAULT_MINING_INTERVAL_SECS: u64 = 10;

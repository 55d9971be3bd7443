use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::DIFFICULTY;
use crate::transaction::Transaction;
use crate::transaction::canonical::{CanonicalEncoder, DOMAIN_BLOCK};

/// A single hash-linked block. Built once via [`Block::seal`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64, // Proof-of-Work nonce
    pub miner: String,
}

impl Block {
    /// Create the genesis block (index 0, no transactions) and seal it.
    pub fn genesis(miner: &str, timestamp: i64) -> Self {
        let mut block = Self::new(0, String::from("0"), Vec::new(), miner.to_string(), timestamp);
        block.seal();
        block
    }

    /// Create a new, unsealed block. Call [`Block::seal`] to perform PoW.
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        miner: String,
        timestamp: i64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash: String::new(),
            nonce: 0,
            miner,
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over the canonical encoding of every field except `hash`.
    pub fn compute_hash(&self) -> String {
        let mut enc = CanonicalEncoder::new(DOMAIN_BLOCK);
        enc.put_u64(self.index)
            .put_i64(self.timestamp)
            .put_u64(self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode_record(&mut enc);
        }
        enc.put_str(&self.previous_hash)
            .put_u64(self.nonce)
            .put_str(&self.miner);
        hex::encode(Sha256::digest(enc.finish()))
    }

    /// Proof-of-Work: bump the nonce until the hex hash starts with
    /// [`DIFFICULTY`] zeros. Unbounded, but ~256 attempts on average.
    pub fn seal(&mut self) {
        let target_prefix = "0".repeat(DIFFICULTY);
        loop {
            self.hash = self.compute_hash();
            if self.hash.starts_with(&target_prefix) {
                break;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    pub fn meets_difficulty(&self) -> bool {
        self.hash.len() >= DIFFICULTY && self.hash.chars().take(DIFFICULTY).all(|c| c == '0')
    }

    /// The cached `hash` matches the content and satisfies the PoW target.
    /// Does NOT check chain linkage.
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash() && self.meets_difficulty()
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::{Amount, Transaction};
    use crate::wallet::Wallet;

    fn sample_tx() -> Transaction {
        Wallet::generate().create_transaction("addr", Amount::from_coins(1), 0)
    }

    #[test]
    fn genesis_is_sealed() {
        let b = Block::genesis("genesis_miner", 1_700_000_000);
        assert_eq!(b.index, 0);
        assert_eq!(b.previous_hash, "0");
        assert!(b.transactions.is_empty());
        assert!(b.hash.starts_with("00"));
        assert!(b.is_valid());
    }

    #[test]
    fn sealing_produces_leading_zeros() {
        let mut b = Block::new(1, "prev".into(), vec![sample_tx()], "miner".into(), 1);
        b.seal();
        assert!(b.hash.starts_with("00"));
        assert_eq!(b.hash, b.compute_hash());
        assert!(b.is_valid());
    }

    #[test]
    fn hash_covers_miner_and_transactions() {
        let mut b = Block::new(2, "prev".into(), vec![sample_tx()], "miner".into(), 1);
        b.seal();
        let old_hash = b.hash.clone();

        let mut other_miner = b.clone();
        other_miner.miner = "thief".into();
        assert_ne!(other_miner.compute_hash(), old_hash);
        assert!(!other_miner.is_valid());

        b.transactions.push(sample_tx());
        assert_ne!(old_hash, b.compute_hash());
        assert!(!b.is_valid());
    }

    #[test]
    fn forged_hash_fails_difficulty() {
        let mut b = Block::new(3, "prev".into(), Vec::new(), "m".into(), 1);
        b.hash = "ff".repeat(32);
        assert!(!b.meets_difficulty());
    }
}

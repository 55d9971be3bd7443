use super::Block;

/// Ordered, hash-linked sequence of blocks starting at genesis.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
}

impl Blockchain {
    /// Initialize a new chain with a sealed genesis block.
    pub fn new(genesis_miner: &str, timestamp: i64) -> Self {
        Self {
            chain: vec![Block::genesis(genesis_miner, timestamp)],
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Append an already sealed block. Caller checks linkage.
    pub(crate) fn push(&mut self, block: Block) {
        self.chain.push(block);
    }

    /// Walk the chain from index 1: every block must link to its predecessor
    /// and its stored hash must match a recomputation (and the PoW target).
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if genesis.index != 0 || genesis.hash != genesis.compute_hash() {
            return false;
        }

        self.chain.windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.previous_hash == prev.hash && current.is_valid()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with_blocks(n: u64) -> Blockchain {
        let mut bc = Blockchain::new("g", 1);
        for i in 0..n {
            let prev = bc.last_block().hash.clone();
            let mut b = Block::new(bc.len() as u64, prev, Vec::new(), "m".into(), 2 + i as i64);
            b.seal();
            bc.push(b);
        }
        bc
    }

    #[test]
    fn fresh_chain_is_valid() {
        let bc = Blockchain::new("g", 1);
        assert_eq!(bc.len(), 1);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn linked_chain_is_valid() {
        let bc = chain_with_blocks(3);
        assert_eq!(bc.len(), 4);
        assert_eq!(bc.last_block().index, 3);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn broken_link_is_detected() {
        let mut bc = chain_with_blocks(2);
        bc.chain[2].previous_hash = "00dead".into();
        assert!(!bc.is_valid_chain());
    }

    #[test]
    fn tampered_block_is_detected() {
        let mut bc = chain_with_blocks(2);
        bc.chain[1].timestamp += 1;
        assert!(!bc.is_valid_chain());
    }
}

use std::collections::BTreeMap;

use super::{BLOCK_REWARD, TOP_MINER_REWARD};
use crate::transaction::Amount;

/// Split a block's reward across the miners in `tally` (miner -> applied
/// transaction count).
///
/// The top-ranked miner gets [`TOP_MINER_REWARD`]. The rest of
/// [`BLOCK_REWARD`] goes to the other miners in proportion to their share of
/// the transactions the top miner did not apply; with a single miner it is
/// not paid to anyone. Ties rank by ascending address.
pub fn distribute(tally: &BTreeMap<String, u64>) -> Vec<(String, Amount)> {
    let mut ranked: Vec<(&String, u64)> = tally.iter().map(|(m, c)| (m, *c)).collect();
    // stable: equal counts keep the map's address order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let Some((top, top_count)) = ranked.first().copied() else {
        return Vec::new();
    };

    let mut payouts = vec![(top.clone(), TOP_MINER_REWARD)];
    let remaining_reward = BLOCK_REWARD.saturating_sub(TOP_MINER_REWARD);
    let total: u64 = ranked.iter().map(|(_, c)| *c).sum();
    let remaining_tx = total - top_count;
    if remaining_tx == 0 {
        return payouts;
    }

    for (miner, count) in ranked.into_iter().skip(1) {
        let share = remaining_reward.mul_ratio(count, remaining_tx);
        payouts.push((miner.clone(), share));
    }
    payouts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(m, c)| (m.to_string(), *c)).collect()
    }

    #[test]
    fn empty_tally_pays_nothing() {
        assert!(distribute(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn single_miner_gets_only_the_flat_share() {
        let payouts = distribute(&tally(&[("m", 3)]));
        assert_eq!(payouts, vec![("m".to_string(), Amount::from_coins(5))]);
    }

    #[test]
    fn remainder_is_split_by_share_of_non_top_transactions() {
        let payouts = distribute(&tally(&[("a", 1), ("b", 4), ("c", 3)]));
        assert_eq!(payouts[0], ("b".to_string(), Amount::from_coins(5)));
        // remaining_tx = 4: a gets 1/4 * 5, c gets 3/4 * 5
        assert_eq!(payouts[1], ("c".to_string(), Amount::from_base_units(375_000_000)));
        assert_eq!(payouts[2], ("a".to_string(), Amount::from_base_units(125_000_000)));
        let minted: Amount = payouts.iter().map(|(_, a)| *a).sum();
        assert_eq!(minted, BLOCK_REWARD);
    }

    #[test]
    fn ties_rank_by_address() {
        let payouts = distribute(&tally(&[("zed", 2), ("amy", 2)]));
        assert_eq!(payouts[0].0, "amy");
        assert_eq!(payouts[1], ("zed".to_string(), Amount::from_coins(5)));
    }

    #[test]
    fn zero_count_miners_share_nothing() {
        let payouts = distribute(&tally(&[("top", 2), ("idle", 0)]));
        assert_eq!(payouts, vec![("top".to_string(), Amount::from_coins(5))]);
    }
}

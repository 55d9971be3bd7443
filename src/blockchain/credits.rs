//! Resource credits ("base power"): a per-address, time-replenished allowance
//! spent in place of a currency fee.

use serde::Serialize;

use crate::transaction::{Amount, Transaction};

/// Credits granted per day, and the ceiling an account can hold.
pub const DAILY_ALLOWANCE: u64 = 100;
pub const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Credits required by an ordinary transfer and by a token transfer.
pub const TRANSFER_CREDITS: u64 = 1;
pub const TOKEN_TRANSFER_CREDITS: u64 = 10;

/// Currency fee charged instead when credits fall short (0.001 / 0.01).
pub const TRANSFER_FEE: Amount = Amount::from_base_units(100_000);
pub const TOKEN_TRANSFER_FEE: Amount = Amount::from_base_units(1_000_000);

/// Surcharge per extra-priority unit (0.001), always paid in currency.
pub const EXTRA_PRIORITY_UNIT_COST: Amount = Amount::from_base_units(100_000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreditAccount {
    pub credits: u64,
    /// `None` until the first refill.
    pub last_refill: Option<i64>,
}

impl CreditAccount {
    /// Lazy top-up. A never-refilled account starts at the daily allowance;
    /// afterwards `DAILY_ALLOWANCE * elapsed_days` is added once at least one
    /// full day has passed, capped at the allowance.
    pub fn refill(&mut self, now: i64) {
        let Some(last) = self.last_refill else {
            self.credits = DAILY_ALLOWANCE;
            self.last_refill = Some(now);
            return;
        };

        let elapsed = now.saturating_sub(last);
        if elapsed < SECONDS_PER_DAY {
            return;
        }
        let days = (elapsed / SECONDS_PER_DAY) as u64;
        self.credits = self
            .credits
            .saturating_add(DAILY_ALLOWANCE.saturating_mul(days))
            .min(DAILY_ALLOWANCE);
        self.last_refill = Some(now);
    }

    /// Decide how `tx` is paid for. Spends credits when they cover the
    /// requirement, otherwise leaves them untouched and charges the currency fee.
    pub fn charge(&mut self, tx: &Transaction) -> TxCost {
        let required = required_credits(tx);
        let surcharge = priority_surcharge(tx);
        if self.credits >= required {
            self.credits -= required;
            TxCost {
                credits_spent: required,
                fee: Amount::ZERO,
                surcharge,
            }
        } else {
            TxCost {
                credits_spent: 0,
                fee: currency_fee(tx),
                surcharge,
            }
        }
    }
}

/// What a transaction was charged at admission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TxCost {
    pub credits_spent: u64,
    pub fee: Amount,
    pub surcharge: Amount,
}

impl TxCost {
    /// Currency owed on top of the transfer amount.
    pub fn currency_total(&self) -> Amount {
        self.fee.saturating_add(self.surcharge)
    }
}

pub fn required_credits(tx: &Transaction) -> u64 {
    if tx.is_token_transfer {
        TOKEN_TRANSFER_CREDITS
    } else {
        TRANSFER_CREDITS
    }
}

pub fn currency_fee(tx: &Transaction) -> Amount {
    if tx.is_token_transfer {
        TOKEN_TRANSFER_FEE
    } else {
        TRANSFER_FEE
    }
}

pub fn priority_surcharge(tx: &Transaction) -> Amount {
    EXTRA_PRIORITY_UNIT_COST.saturating_mul(tx.extra_priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;

    fn transfer() -> Transaction {
        Transaction::new("a".into(), "b".into(), Amount::from_coins(1), 0)
    }

    fn token_transfer() -> Transaction {
        let mut tx = transfer();
        tx.is_token_transfer = true;
        tx.token_id = Some("tok".into());
        tx
    }

    #[test]
    fn first_refill_grants_daily_allowance() {
        let mut acc = CreditAccount::default();
        acc.refill(T0);
        assert_eq!(acc.credits, DAILY_ALLOWANCE);
        assert_eq!(acc.last_refill, Some(T0));
    }

    #[test]
    fn partial_day_adds_nothing_and_keeps_stamp() {
        let mut acc = CreditAccount {
            credits: 40,
            last_refill: Some(T0),
        };
        acc.refill(T0 + SECONDS_PER_DAY - 1);
        assert_eq!(acc.credits, 40);
        assert_eq!(acc.last_refill, Some(T0));
    }

    #[test]
    fn never_exceeds_ceiling() {
        let mut acc = CreditAccount {
            credits: 40,
            last_refill: Some(T0),
        };
        acc.refill(T0 + 30 * SECONDS_PER_DAY);
        assert_eq!(acc.credits, DAILY_ALLOWANCE);
        assert_eq!(acc.last_refill, Some(T0 + 30 * SECONDS_PER_DAY));

        // clock going backwards never adds or underflows
        acc.credits = 3;
        acc.refill(T0);
        assert_eq!(acc.credits, 3);
    }

    #[test]
    fn credits_cover_transfer() {
        let mut acc = CreditAccount {
            credits: 5,
            last_refill: Some(T0),
        };
        let cost = acc.charge(&transfer());
        assert_eq!(acc.credits, 4);
        assert_eq!(cost.credits_spent, 1);
        assert_eq!(cost.currency_total(), Amount::ZERO);
    }

    #[test]
    fn short_credits_fall_back_to_currency_fee() {
        let mut acc = CreditAccount {
            credits: 9,
            last_refill: Some(T0),
        };
        let cost = acc.charge(&token_transfer());
        assert_eq!(acc.credits, 9);
        assert_eq!(cost.fee, TOKEN_TRANSFER_FEE);
        assert_eq!(cost.currency_total().to_string(), "0.01");

        let mut empty = CreditAccount::default();
        assert_eq!(empty.charge(&transfer()).fee.to_string(), "0.001");
    }

    #[test]
    fn surcharge_is_added_regardless_of_credits() {
        let mut tx = transfer();
        tx.extra_priority = 5;

        let mut rich = CreditAccount {
            credits: 100,
            last_refill: Some(T0),
        };
        let cost = rich.charge(&tx);
        assert_eq!(cost.fee, Amount::ZERO);
        assert_eq!(cost.currency_total().to_string(), "0.005");

        let mut poor = CreditAccount::default();
        assert_eq!(poor.charge(&tx).currency_total().to_string(), "0.006");
    }
}

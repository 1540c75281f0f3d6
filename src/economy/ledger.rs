//! Currency balances and the credit/debit rules that guard them.
//!
//! Balances are mutated only through [`Ledger::credit`] and
//! [`Ledger::debit`]; a debit that would go negative is rejected whole.

use serde::{Deserialize, Serialize};

/// The currencies tracked by every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// Primary currency, earned from destroyed and consumed bodies.
    Shards,
    /// Prestige currency, awarded only on reset.
    Singularity,
}

/// Named non-negative accumulators plus lifetime totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    shards: f64,
    singularity: f64,
    /// Cumulative shards ever credited; never decreases, survives prestige.
    lifetime_shards: f64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Shards => self.shards,
            Currency::Singularity => self.singularity,
        }
    }

    pub fn lifetime_shards(&self) -> f64 {
        self.lifetime_shards
    }

    /// Credit is always accepted and monotone. Non-positive amounts are
    /// ignored so a crediting path can never shrink a balance.
    pub fn credit(&mut self, currency: Currency, amount: f64) {
        if amount <= 0.0 || !amount.is_finite() {
            return;
        }
        match currency {
            Currency::Shards => {
                self.shards += amount;
                self.lifetime_shards += amount;
            }
            Currency::Singularity => self.singularity += amount,
        }
    }

    /// All-or-nothing debit. Returns false (and changes nothing) if the
    /// balance cannot cover the amount.
    #[must_use]
    pub fn debit(&mut self, currency: Currency, amount: f64) -> bool {
        if amount < 0.0 || !amount.is_finite() {
            return false;
        }
        let balance = match currency {
            Currency::Shards => &mut self.shards,
            Currency::Singularity => &mut self.singularity,
        };
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        debug_assert!(*balance >= 0.0);
        true
    }

    /// Prestige zeroes the primary balance only; singularity and lifetime
    /// totals are untouched.
    pub fn reset_primary(&mut self) {
        self.shards = 0.0;
    }

    /// Restore balances from a save record. Only used by persistence.
    pub(crate) fn restore(shards: f64, singularity: f64, lifetime_shards: f64) -> Self {
        Self {
            shards: shards.max(0.0),
            singularity: singularity.max(0.0),
            lifetime_shards: lifetime_shards.max(0.0),
        }
    }
}

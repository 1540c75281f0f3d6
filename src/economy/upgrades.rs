//! Upgrade/building definitions and the geometric cost curve.
//!
//! Cost for the next n units is computed by explicit per-unit summation so
//! bulk purchases floor and round exactly like sequential single buys.

use serde::{Deserialize, Serialize};

use super::ledger::{Currency, Ledger};
use crate::error::PurchaseError;

/// Everything purchasable with shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeId {
    /// Passive shard production per second.
    Collector,
    /// Orbital turret; each purchase past the first levels it up.
    Turret,
    /// Hunter drone targeting the weakest hostile.
    Drone,
    /// Hit-scan lance bound to a single target.
    Lance,
    /// Straight-line scatter emitter.
    Scatter,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 5] = [
        UpgradeId::Collector,
        UpgradeId::Turret,
        UpgradeId::Drone,
        UpgradeId::Lance,
        UpgradeId::Scatter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeId::Collector => "collector",
            UpgradeId::Turret => "turret",
            UpgradeId::Drone => "drone",
            UpgradeId::Lance => "lance",
            UpgradeId::Scatter => "scatter",
        }
    }

    pub fn def(self) -> &'static UpgradeDef {
        match self {
            UpgradeId::Collector => &UpgradeDef {
                base_cost: 50.0,
                growth: 1.2,
                base_output: 1.0,
                max_count: None,
            },
            UpgradeId::Turret => &UpgradeDef {
                base_cost: 200.0,
                growth: 1.35,
                base_output: 0.0,
                max_count: Some(50),
            },
            UpgradeId::Drone => &UpgradeDef {
                base_cost: 1_200.0,
                growth: 1.4,
                base_output: 0.0,
                max_count: Some(50),
            },
            UpgradeId::Lance => &UpgradeDef {
                base_cost: 8_000.0,
                growth: 1.45,
                base_output: 0.0,
                max_count: Some(50),
            },
            UpgradeId::Scatter => &UpgradeDef {
                base_cost: 30_000.0,
                growth: 1.5,
                base_output: 0.0,
                max_count: Some(50),
            },
        }
    }
}

/// Static balance data for one upgrade line.
#[derive(Debug, Clone)]
pub struct UpgradeDef {
    pub base_cost: f64,
    /// Cost growth ratio, > 1 so cost is strictly increasing in count.
    pub growth: f64,
    /// Shards per second per owned unit (collectors only).
    pub base_output: f64,
    pub max_count: Option<u32>,
}

/// Hard bound on units bought in one call; bulk UI paths stay far below it.
pub const BULK_LIMIT: u32 = 10_000;

/// Cost of the single unit after `count` are already owned.
pub fn unit_cost(id: UpgradeId, count: u32) -> f64 {
    let def = id.def();
    // Counts far past any real run saturate the curve to infinity instead
    // of wrapping the powi exponent.
    let exp = count.min(1 << 20) as i32;
    (def.base_cost * def.growth.powi(exp)).floor()
}

/// Cost of the next `quantity` units starting from `count` owned, by
/// explicit geometric summation (never a closed-form shortcut).
pub fn cost(id: UpgradeId, count: u32, quantity: u32) -> f64 {
    let mut total = 0.0;
    for i in 0..quantity {
        total += unit_cost(id, count.saturating_add(i));
        if !total.is_finite() {
            break;
        }
    }
    total
}

/// Owned counts per upgrade line. Field-per-line so legacy saves merge
/// against defaults one field at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    #[serde(default)]
    pub collector: u32,
    #[serde(default)]
    pub turret: u32,
    #[serde(default)]
    pub drone: u32,
    #[serde(default)]
    pub lance: u32,
    #[serde(default)]
    pub scatter: u32,
}

impl Upgrades {
    pub fn count(&self, id: UpgradeId) -> u32 {
        match id {
            UpgradeId::Collector => self.collector,
            UpgradeId::Turret => self.turret,
            UpgradeId::Drone => self.drone,
            UpgradeId::Lance => self.lance,
            UpgradeId::Scatter => self.scatter,
        }
    }

    fn count_mut(&mut self, id: UpgradeId) -> &mut u32 {
        match id {
            UpgradeId::Collector => &mut self.collector,
            UpgradeId::Turret => &mut self.turret,
            UpgradeId::Drone => &mut self.drone,
            UpgradeId::Lance => &mut self.lance,
            UpgradeId::Scatter => &mut self.scatter,
        }
    }

    /// Buy `quantity` units, debiting the ledger atomically. On failure
    /// neither the balance nor the count changes.
    pub fn purchase(
        &mut self,
        ledger: &mut Ledger,
        id: UpgradeId,
        quantity: u32,
    ) -> Result<f64, PurchaseError> {
        if quantity == 0 {
            return Err(PurchaseError::ZeroQuantity);
        }
        if quantity > BULK_LIMIT {
            return Err(PurchaseError::BulkLimit { limit: BULK_LIMIT });
        }
        let count = self.count(id);
        let Some(new_count) = count.checked_add(quantity) else {
            return Err(PurchaseError::MaxedOut { item: id.name() });
        };
        if let Some(max) = id.def().max_count {
            if new_count > max {
                return Err(PurchaseError::MaxedOut { item: id.name() });
            }
        }
        let total = cost(id, count, quantity);
        if !ledger.debit(Currency::Shards, total) {
            return Err(PurchaseError::InsufficientFunds {
                cost: total,
                balance: ledger.balance(Currency::Shards),
            });
        }
        *self.count_mut(id) += quantity;
        Ok(total)
    }

    /// Largest affordable quantity, found by iterative accumulation (to
    /// match sequential single purchases exactly), bounded by `cap`.
    /// Returns the units bought and the total paid.
    pub fn buy_max(&mut self, ledger: &mut Ledger, id: UpgradeId, cap: u32) -> (u32, f64) {
        let balance = ledger.balance(Currency::Shards);
        let count = self.count(id);
        let limit = match id.def().max_count {
            Some(max) => cap.min(max.saturating_sub(count)),
            None => cap,
        }
        .min(BULK_LIMIT);
        let mut quantity = 0;
        let mut total = 0.0;
        while quantity < limit {
            let next = unit_cost(id, count + quantity);
            if total + next > balance {
                break;
            }
            total += next;
            quantity += 1;
        }
        if quantity == 0 {
            return (0, 0.0);
        }
        // Cannot fail: total was accumulated against the live balance.
        let paid = self.purchase(ledger, id, quantity).unwrap_or_default();
        debug_assert_eq!(paid, total);
        (quantity, paid)
    }

    /// Zero every non-prestige line. Called on prestige.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(amount: f64) -> Ledger {
        let mut ledger = Ledger::new();
        ledger.credit(Currency::Shards, amount);
        ledger
    }

    #[test]
    fn collector_cost_matches_floored_sequence() {
        // floor(50) + floor(60) + floor(72) = 182
        assert_eq!(cost(UpgradeId::Collector, 0, 3), 182.0);
    }

    #[test]
    fn purchase_scenario_from_zero_balance() {
        let mut ledger = funded(500.0);
        let mut upgrades = Upgrades::default();
        let paid = upgrades
            .purchase(&mut ledger, UpgradeId::Collector, 3)
            .unwrap();
        assert_eq!(paid, 182.0);
        assert_eq!(upgrades.collector, 3);
        assert_eq!(ledger.balance(Currency::Shards), 318.0);
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let mut ledger = funded(100.0);
        let mut upgrades = Upgrades::default();
        let err = upgrades
            .purchase(&mut ledger, UpgradeId::Collector, 3)
            .unwrap_err();
        assert!(matches!(err, PurchaseError::InsufficientFunds { .. }));
        assert_eq!(upgrades.collector, 0);
        assert_eq!(ledger.balance(Currency::Shards), 100.0);
    }

    #[test]
    fn cost_is_strictly_increasing_in_count() {
        for id in UpgradeId::ALL {
            for count in 0..40 {
                assert!(unit_cost(id, count + 1) > unit_cost(id, count));
            }
        }
    }

    #[test]
    fn buy_max_matches_sequential_purchases() {
        let mut ledger_a = funded(1_000.0);
        let mut upgrades_a = Upgrades::default();
        let (bought, paid) = upgrades_a.buy_max(&mut ledger_a, UpgradeId::Collector, 100);

        let mut ledger_b = funded(1_000.0);
        let mut upgrades_b = Upgrades::default();
        let mut sequential = 0;
        while upgrades_b.purchase(&mut ledger_b, UpgradeId::Collector, 1).is_ok() {
            sequential += 1;
        }

        assert_eq!(bought, sequential);
        assert_eq!(ledger_a, ledger_b);
        // The reported spend accounts for every shard that left the ledger.
        assert_eq!(paid, 1_000.0 - ledger_a.balance(Currency::Shards));
    }

    #[test]
    fn buy_max_respects_safety_cap() {
        let mut ledger = funded(f64::MAX / 2.0);
        let mut upgrades = Upgrades::default();
        let (bought, paid) = upgrades.buy_max(&mut ledger, UpgradeId::Collector, 25);
        assert_eq!(bought, 25);
        assert_eq!(paid, cost(UpgradeId::Collector, 0, 25));
    }

    #[test]
    fn oversized_bulk_quantity_is_rejected() {
        let mut ledger = funded(1e12);
        let mut upgrades = Upgrades::default();
        let err = upgrades
            .purchase(&mut ledger, UpgradeId::Collector, u32::MAX)
            .unwrap_err();
        assert!(matches!(err, PurchaseError::BulkLimit { .. }));
        assert_eq!(upgrades.collector, 0);
        assert_eq!(ledger.balance(Currency::Shards), 1e12);
    }

    #[test]
    fn count_near_the_integer_ceiling_cannot_wrap() {
        let mut ledger = funded(f64::MAX / 2.0);
        let mut upgrades = Upgrades::default();
        upgrades.collector = u32::MAX - 1;
        let err = upgrades
            .purchase(&mut ledger, UpgradeId::Collector, 2)
            .unwrap_err();
        assert!(matches!(err, PurchaseError::MaxedOut { .. }));
        assert_eq!(upgrades.collector, u32::MAX - 1);
    }

    #[test]
    fn cost_saturates_instead_of_spinning() {
        // Growth makes the running total overflow to infinity long before
        // the loop bound; the summation must stop there.
        assert!(cost(UpgradeId::Collector, 0, BULK_LIMIT).is_infinite());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unit_cost_is_strictly_monotone(count in 0u32..80) {
                for id in UpgradeId::ALL {
                    prop_assert!(unit_cost(id, count + 1) > unit_cost(id, count));
                }
            }

            #[test]
            fn split_purchases_cost_the_same_as_whole(
                count in 0u32..25,
                a in 1u32..8,
                b in 1u32..8,
            ) {
                let whole = cost(UpgradeId::Collector, count, a + b);
                let split = cost(UpgradeId::Collector, count, a)
                    + cost(UpgradeId::Collector, count + a, b);
                prop_assert!((whole - split).abs() < 1e-9);
            }

            #[test]
            fn purchase_conserves_value(balance in 0.0f64..1e6, qty in 1u32..10) {
                let mut ledger = funded(balance);
                let mut upgrades = Upgrades::default();
                match upgrades.purchase(&mut ledger, UpgradeId::Collector, qty) {
                    Ok(paid) => {
                        prop_assert_eq!(ledger.balance(Currency::Shards), balance - paid);
                        prop_assert_eq!(upgrades.collector, qty);
                    }
                    Err(_) => {
                        prop_assert_eq!(ledger.balance(Currency::Shards), balance);
                        prop_assert_eq!(upgrades.collector, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn purchase_past_max_count_is_rejected() {
        let mut ledger = funded(f64::MAX / 2.0);
        let mut upgrades = Upgrades::default();
        upgrades.turret = 50;
        let err = upgrades
            .purchase(&mut ledger, UpgradeId::Turret, 1)
            .unwrap_err();
        assert!(matches!(err, PurchaseError::MaxedOut { .. }));
        assert_eq!(upgrades.turret, 50);
    }
}

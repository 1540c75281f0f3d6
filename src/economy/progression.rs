//! Tier unlocks, milestone multipliers, and prestige math.

use serde::{Deserialize, Serialize};

use super::upgrades::{UpgradeId, Upgrades};
use crate::tuning::PrestigeTuning;

/// One-directional tier ladder; crossing a lifetime-earnings threshold
/// multiplies subsequent production by the tier's factor.
#[derive(Debug, Clone, Copy)]
pub struct TierDef {
    pub threshold: f64,
    pub multiplier: f64,
}

pub const TIERS: [TierDef; 5] = [
    TierDef { threshold: 1_000.0, multiplier: 1.5 },
    TierDef { threshold: 25_000.0, multiplier: 2.0 },
    TierDef { threshold: 500_000.0, multiplier: 2.0 },
    TierDef { threshold: 10_000_000.0, multiplier: 2.5 },
    TierDef { threshold: 250_000_000.0, multiplier: 3.0 },
];

/// Owned-unit-count thresholds that each compound the milestone multiplier.
pub const MILESTONE_COUNTS: [u32; 5] = [25, 50, 100, 200, 500];
pub const MILESTONE_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Number of unlocked tiers (index into TIERS of the next locked one).
    #[serde(default)]
    pub tier: u32,
    /// Times the player has prestiged.
    #[serde(default)]
    pub prestige_count: u32,
    /// Compound multiplier from all crossed milestones. Recomputed from
    /// scratch on every count change; never mutated incrementally.
    #[serde(skip)]
    milestone_multiplier: f64,
}

impl Progression {
    pub fn new() -> Self {
        Self {
            tier: 0,
            prestige_count: 0,
            milestone_multiplier: 1.0,
        }
    }

    /// Walk the tier ladder upward. Never steps down.
    pub fn update_tier(&mut self, lifetime_shards: f64) {
        while (self.tier as usize) < TIERS.len()
            && lifetime_shards >= TIERS[self.tier as usize].threshold
        {
            self.tier += 1;
        }
    }

    /// Compound factor of all unlocked tiers.
    pub fn tier_multiplier(&self) -> f64 {
        TIERS[..self.tier as usize]
            .iter()
            .fold(1.0, |acc, t| acc * t.multiplier)
    }

    /// Recompute the milestone multiplier from the full set of applicable
    /// thresholds. Idempotent: calling twice with the same counts yields
    /// the same value.
    pub fn recompute_milestones(&mut self, upgrades: &Upgrades) {
        let mut multiplier = 1.0;
        for id in UpgradeId::ALL {
            let count = upgrades.count(id);
            for &threshold in MILESTONE_COUNTS.iter() {
                if count >= threshold {
                    multiplier *= MILESTONE_FACTOR;
                }
            }
        }
        self.milestone_multiplier = multiplier;
    }

    pub fn milestone_multiplier(&self) -> f64 {
        // A deserialized Progression has 0.0 here until recomputed.
        if self.milestone_multiplier <= 0.0 {
            1.0
        } else {
            self.milestone_multiplier
        }
    }

    /// Everything production is multiplied by, prestige bonus included.
    pub fn production_multiplier(&self, prestige: &PrestigeTuning, singularity: f64) -> f64 {
        self.tier_multiplier()
            * self.milestone_multiplier()
            * (1.0 + prestige.bonus_per_point * singularity)
    }

    /// Prestige award for a given pre-reset primary balance:
    /// `floor(sqrt(balance / divisor))`, monotonic and concave.
    pub fn prestige_award(balance: f64, tuning: &PrestigeTuning) -> f64 {
        if balance <= 0.0 {
            return 0.0;
        }
        (balance / tuning.divisor).sqrt().floor()
    }

    pub fn can_prestige(balance: f64, tuning: &PrestigeTuning) -> bool {
        balance >= tuning.threshold
    }

    /// Zero the tier ladder; prestige count survives (and increments at
    /// the call site).
    pub fn reset_tiers(&mut self) {
        self.tier = 0;
        self.milestone_multiplier = 1.0;
    }
}

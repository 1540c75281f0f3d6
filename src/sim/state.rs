//! Aggregate simulation state.
//!
//! Everything a tick reads or writes lives here. The economy survives
//! restarts through the save record; bodies, traces, and combo state are
//! ephemeral and rebuilt from the seeded RNG.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{Pool, WeaponId};
use super::spawner::Spawner;
use super::weapons::{self, HitscanShot, TraceEvent, Weapon};
use crate::economy::{Currency, Ledger, Progression, UpgradeId, Upgrades};
use crate::error::PurchaseError;
use crate::tuning::Tuning;

/// Current phase of gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    Paused,
}

/// Kill-streak state. `timer` counts ticks since the last kill, for the
/// timeout reset policy.
#[derive(Debug, Clone, Default)]
pub struct ComboState {
    pub count: u32,
    pub timer: f32,
}

/// Temporary modifiers (pickup-style speed boosts).
#[derive(Debug, Clone, Default)]
pub struct Buffs {
    /// Remaining duration of the fire-rate boost, in nominal frames.
    pub speed_ticks: f32,
    pub speed_mult: f32,
}

impl Buffs {
    pub fn speed_multiplier(&self) -> f32 {
        if self.speed_ticks > 0.0 && self.speed_mult > 0.0 {
            self.speed_mult
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// RNG seed for this run, kept for reproduction.
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Ticks simulated since the run started.
    pub time_ticks: u64,
    /// Wave index; derived from `time_ticks`, drives escalation.
    pub wave: u32,
    pub pool: Pool,
    pub weapons: Vec<Weapon>,
    /// Weapon id 0 is reserved for manual zaps.
    pub next_weapon_id: WeaponId,
    pub spawner: Spawner,
    pub combo: ComboState,
    /// Hostiles consumed by the well this tick; feeds the breach reset.
    pub breaches_this_tick: u32,
    /// Cosmetic fire lines, cleared every tick.
    pub traces: Vec<TraceEvent>,
    /// Hit-scan shots queued for the resolver this tick.
    pub pending_hits: Vec<HitscanShot>,
    pub ledger: Ledger,
    pub upgrades: Upgrades,
    pub progression: Progression,
    pub buffs: Buffs,
    pub tuning: Tuning,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let spawner = Spawner::new(&tuning.spawn);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            time_ticks: 0,
            wave: 0,
            pool: Pool::new(),
            weapons: Vec::new(),
            next_weapon_id: 1,
            spawner,
            combo: ComboState::default(),
            breaches_this_tick: 0,
            traces: Vec::new(),
            pending_hits: Vec::new(),
            ledger: Ledger::new(),
            upgrades: Upgrades::default(),
            progression: Progression::new(),
            buffs: Buffs::default(),
            tuning,
        }
    }

    /// Current kill-streak multiplier: `min(1 + count * step, cap)`.
    pub fn combo_multiplier(&self) -> f64 {
        (1.0 + self.combo.count as f64 * self.tuning.combo.step)
            .min(self.tuning.combo.max_multiplier)
    }

    /// Passive shard income per wall-clock second, multipliers included.
    pub fn passive_rate(&self) -> f64 {
        let def = UpgradeId::Collector.def();
        self.upgrades.collector as f64
            * def.base_output
            * self.progression.production_multiplier(
                &self.tuning.prestige,
                self.ledger.balance(Currency::Singularity),
            )
    }

    /// Buy upgrades and keep the derived state (weapons, milestones) in
    /// step. All purchases go through here.
    pub fn purchase(&mut self, id: UpgradeId, quantity: u32) -> Result<f64, PurchaseError> {
        let paid = self.upgrades.purchase(&mut self.ledger, id, quantity)?;
        self.after_purchase(id, quantity, paid);
        Ok(paid)
    }

    /// Buy as many units as the balance covers, bounded by `cap`.
    pub fn purchase_max(&mut self, id: UpgradeId, cap: u32) -> u32 {
        let (bought, paid) = self.upgrades.buy_max(&mut self.ledger, id, cap);
        if bought > 0 {
            self.after_purchase(id, bought, paid);
        }
        bought
    }

    fn after_purchase(&mut self, id: UpgradeId, quantity: u32, paid: f64) {
        log::info!(
            "purchased {}x {} for {paid:.0} shards",
            quantity,
            id.name()
        );
        self.progression.recompute_milestones(&self.upgrades);
        weapons::sync_weapons(self);
    }

    /// Reset the run for prestige currency. Returns the award, or None if
    /// the balance is below the threshold (nothing changes in that case).
    pub fn prestige(&mut self) -> Option<f64> {
        let balance = self.ledger.balance(Currency::Shards);
        if !Progression::can_prestige(balance, &self.tuning.prestige) {
            return None;
        }
        let award = Progression::prestige_award(balance, &self.tuning.prestige);
        log::info!("prestige: {balance:.0} shards -> {award} singularity");
        self.ledger.credit(Currency::Singularity, award);
        self.ledger.reset_primary();
        self.upgrades.reset();
        self.progression.reset_tiers();
        self.progression.prestige_count += 1;
        self.progression.recompute_milestones(&self.upgrades);
        self.weapons.clear();
        self.pool.clear();
        self.combo = ComboState::default();
        self.pending_hits.clear();
        self.traces.clear();
        self.buffs = Buffs::default();
        self.wave = 0;
        self.time_ticks = 0;
        self.spawner = Spawner::new(&self.tuning.spawn);
        Some(award)
    }
}

//! Data-driven game balance.
//!
//! Each mini-game variant instantiates the same engine with a different
//! `Tuning`. Values that the original balance left heuristic (offline
//! efficiency, combo reset behavior) are plain configurable fields here.

use serde::{Deserialize, Serialize};

/// Gravity-well and motion constants. All speeds/accelerations are in
/// pixels per nominal frame; `friction` is applied as `friction^dt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsTuning {
    /// Gravitational constant for the central well.
    pub gravity_const: f32,
    /// Mass of the central well. Zero disables the well entirely
    /// (wave-defense variants use straight-line motion).
    pub center_mass: f32,
    /// Radius of the well. Bodies at distance <= this are consumed.
    pub well_radius: f32,
    /// Per-tick velocity damping, < 1.0. Use 1.0 for no damping.
    pub friction: f32,
    /// Gravity scale for hostiles and resource nodes.
    pub hostile_gravity_factor: f32,
    /// Gravity scale for projectiles (pulled harder than hostiles, by design).
    pub projectile_gravity_factor: f32,
    /// Fraction of a body's reward credited when the well consumes it.
    pub well_reward_fraction: f64,
    /// Velocity impulse transferred to a hostile on projectile hit.
    pub knockback: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity_const: 6.0,
            center_mass: 900.0,
            well_radius: 40.0,
            friction: 0.995,
            hostile_gravity_factor: 1.0,
            projectile_gravity_factor: 1.6,
            well_reward_fraction: 0.25,
            knockback: 0.3,
        }
    }
}

/// Spawn pacing and wave escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTuning {
    /// Countdown between spawns at wave 0, in nominal frames.
    pub base_interval: f32,
    /// Multiplier applied to the interval per wave (< 1.0 shrinks it).
    pub interval_decay: f32,
    /// Hard floor for the spawn interval, in nominal frames.
    pub min_interval: f32,
    /// Period of the forced elite spawn, in nominal frames.
    pub elite_period: f32,
    /// Archetype roll weights (base / rare / elite).
    pub weights: [f32; 3],
    /// Hostile health at wave 0.
    pub base_health: f32,
    /// Hostile reward at wave 0.
    pub base_reward: f64,
    /// Per-wave multiplier on health and reward.
    pub wave_growth: f32,
    /// Inward speed of freshly spawned hostiles, pixels per nominal frame.
    pub base_speed: f32,
    /// Number of fragments a destroyed non-fragment hostile splits into.
    pub fragment_count: u32,
    /// Ticks a wave lasts before the index advances.
    pub wave_length: u64,
    /// Period of the resource-node spawn, in nominal frames.
    pub node_period: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_interval: 120.0,
            interval_decay: 0.93,
            min_interval: 18.0,
            elite_period: 1800.0,
            weights: [0.80, 0.16, 0.04],
            base_health: 40.0,
            base_reward: 10.0,
            wave_growth: 1.18,
            base_speed: 0.9,
            fragment_count: 2,
            wave_length: 3600,
            node_period: 900.0,
        }
    }
}

/// Offline catch-up policy. The efficiency discount is heuristic in the
/// source material and stays a plain constant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineTuning {
    /// Gaps shorter than this are ignored (no noisy short-session reports).
    pub min_elapsed_secs: f64,
    /// Gaps are clamped to this before crediting.
    pub max_elapsed_secs: f64,
    /// Fraction of the online passive rate earned while away.
    pub efficiency: f64,
}

impl Default for OfflineTuning {
    fn default() -> Self {
        Self {
            min_elapsed_secs: 60.0,
            max_elapsed_secs: 24.0 * 3600.0,
            efficiency: 0.5,
        }
    }
}

/// When the kill-streak multiplier resets. The variants genuinely differ
/// here, so both behaviors are kept as named policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComboPolicy {
    /// Reset when a hostile reaches the well (the player "takes damage").
    ResetOnBreach,
    /// Reset when no kill lands within the window, in nominal frames.
    ResetOnTimeout { window: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboTuning {
    pub policy: ComboPolicy,
    /// Multiplier gained per kill in the streak.
    pub step: f64,
    /// Multiplier ceiling.
    pub max_multiplier: f64,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            policy: ComboPolicy::ResetOnBreach,
            step: 0.1,
            max_multiplier: 3.0,
        }
    }
}

/// Prestige thresholds and award curve: `floor(sqrt(balance / divisor))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeTuning {
    /// Primary balance required before prestige becomes available.
    pub threshold: f64,
    /// Divisor in the award formula.
    pub divisor: f64,
    /// Production bonus per prestige currency held.
    pub bonus_per_point: f64,
}

impl Default for PrestigeTuning {
    fn default() -> Self {
        Self {
            threshold: 1_000_000.0,
            divisor: 1_000_000.0,
            bonus_per_point: 0.02,
        }
    }
}

/// Complete balance sheet for one game variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub spawn: SpawnTuning,
    pub offline: OfflineTuning,
    pub combo: ComboTuning,
    pub prestige: PrestigeTuning,
    /// Damage dealt by a manual activation (tap/click) zap.
    pub zap_damage: f32,
    /// Reach of the manual zap, in pixels.
    pub zap_range: f32,
    /// Fire-rate multiplier granted by destroying a resource node.
    pub buff_multiplier: f32,
    /// Duration of the fire-rate buff, in nominal frames.
    pub buff_duration: f32,
    /// Autosave period in seconds.
    pub autosave_secs: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            spawn: SpawnTuning::default(),
            offline: OfflineTuning::default(),
            combo: ComboTuning::default(),
            prestige: PrestigeTuning::default(),
            zap_damage: 15.0,
            zap_range: 80.0,
            buff_multiplier: 1.5,
            buff_duration: 600.0,
            autosave_secs: 8.0,
        }
    }
}

impl Tuning {
    /// The gravity-well variant: central attractor, breach resets combo.
    pub fn gravity_well() -> Self {
        Self::default()
    }

    /// The wave-defense variant: no central well, straight-line motion,
    /// combo decays on a timeout instead of on breach.
    pub fn wave_defense() -> Self {
        let mut t = Self::default();
        t.physics.center_mass = 0.0;
        t.physics.friction = 1.0;
        t.combo.policy = ComboPolicy::ResetOnTimeout { window: 300.0 };
        t
    }
}

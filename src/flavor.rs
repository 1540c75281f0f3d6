//! Flavor content seam: pluggable generator with a deterministic offline
//! fallback.
//!
//! The engine never waits on this. A generator either answers now or the
//! caller falls back to the built-in pool; failures are logged and
//! swallowed, never surfaced to the loop.

use crate::error::GeneratorError;

/// What the generator gets to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlavorContext {
    pub wave: u32,
    pub tier: u32,
    pub prestige_count: u32,
}

/// One piece of presentable content plus a small shard bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorCard {
    pub title: String,
    pub description: String,
    pub reward: f64,
}

/// Seam for external content sources.
pub trait ContentGenerator {
    fn generate(&mut self, context: &FlavorContext) -> Result<FlavorCard, GeneratorError>;
}

const TITLES: [&str; 6] = [
    "Accretion Spike",
    "Tidal Surge",
    "Event Horizon Flicker",
    "Debris Cascade",
    "Singularity Hum",
    "Orbital Resonance",
];

const DESCRIPTIONS: [&str; 6] = [
    "The well pulls harder for a moment; loose matter streams inward.",
    "A ripple crosses the disk and the collectors sing.",
    "Something on the far side of the horizon winks back.",
    "Shattered hulls tumble past the mounts in a glittering line.",
    "A low vibration settles into the turret housings.",
    "Two drifting bodies lock into a brief, perfect orbit.",
];

/// Deterministic pool: the same context always yields the same card, so
/// the fallback is indistinguishable in kind from generated output.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFlavorPool;

impl OfflineFlavorPool {
    pub fn card(context: &FlavorContext) -> FlavorCard {
        let mix = (context.wave as u64)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add((context.tier as u64).wrapping_mul(0x85EB_CA6B))
            .wrapping_add(context.prestige_count as u64);
        let index = (mix % TITLES.len() as u64) as usize;
        FlavorCard {
            title: TITLES[index].to_string(),
            description: DESCRIPTIONS[index].to_string(),
            reward: 25.0 * (1 + context.tier) as f64,
        }
    }
}

impl ContentGenerator for OfflineFlavorPool {
    fn generate(&mut self, context: &FlavorContext) -> Result<FlavorCard, GeneratorError> {
        Ok(Self::card(context))
    }
}

/// Ask the generator, degrade to the pool on any failure.
pub fn flavor_with_fallback(
    generator: &mut dyn ContentGenerator,
    context: &FlavorContext,
) -> FlavorCard {
    match generator.generate(context) {
        Ok(card) => card,
        Err(err) => {
            log::warn!("content generator failed ({err}), using offline pool");
            OfflineFlavorPool::card(context)
        }
    }
}

//! Deterministic simulation module.
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Normalized tick deltas only
//! - Seeded RNG only
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod body;
pub mod clock;
pub mod collision;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapons;

pub use body::{Body, BodyId, BodyKind, Health, Pool, WeaponId};
pub use clock::{Clock, wall_clock_ms};
pub use spawner::{Archetype, Spawner};
pub use state::{Buffs, ComboState, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use weapons::{TargetRule, TraceEvent, Weapon, WeaponKind};

//! Driftwell - a gravity-well incremental arcade engine
//!
//! A frame-loop combat simulation (hostiles falling toward a central well,
//! automated weapons on a mount ring) feeding an incremental economy
//! (geometric upgrade costs, tiers, milestones, prestige) with offline
//! catch-up and durable saves.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, bodies, physics, weapons, tick)
//! - `economy`: Ledger, upgrades, progression, offline reconciliation
//! - `persistence`: Abstract save store, records, import/export tokens
//! - `engine`: Per-instance controller and fixed-timestep accumulator
//! - `scheduler`: Keyed cancellable timers
//! - `flavor`: Content-generator seam with deterministic fallback
//! - `tuning`: Data-driven game balance

pub mod economy;
pub mod engine;
pub mod error;
pub mod flavor;
pub mod persistence;
pub mod scheduler;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, FrameSnapshot};
pub use sim::{GameState, TickInput};
pub use tuning::Tuning;

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Duration of one nominal frame at the reference 60 Hz rate, in ms.
    /// All per-tick quantities are "per nominal frame".
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest normalized delta a single clock tick may report.
    pub const DELTA_CAP: f32 = 4.0;
    /// Maximum substeps per display frame to prevent spiral of death.
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Radius beyond which bodies are culled.
    pub const SIM_BOUNDS: f32 = 640.0;
    /// Radius of the ring hostiles spawn on.
    pub const SPAWN_RING: f32 = 600.0;
    /// Radius of the ring weapons are mounted on.
    pub const MOUNT_RADIUS: f32 = 60.0;

    /// Cap on decorative particles; the oldest are evicted past this.
    pub const MAX_PARTICLES: usize = 256;

    /// Projectile launch speed, pixels per nominal frame.
    pub const PROJECTILE_SPEED: f32 = 6.0;
    /// Projectile lifetime, in nominal frames.
    pub const PROJECTILE_LIFETIME: f32 = 180.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

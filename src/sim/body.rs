//! Transient simulation bodies and the flat pool that owns them.
//!
//! Removal is deferred: consumers mark bodies dead during the tick and a
//! single cleanup pass swap-removes them, so slots are released within the
//! same tick but never mid-iteration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub type BodyId = u32;
pub type WeaponId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hp: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { hp: max, max }
    }
}

/// Closed set of body kinds; every consumer matches exhaustively so a new
/// kind is a compile-time change, not a silent fallthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyKind {
    Hostile {
        /// Countdown for special actions (elite lunges), in nominal frames.
        behavior_cooldown: f32,
        /// Fragments never fragment again; splits are strictly depth-1.
        fragment: bool,
    },
    ResourceNode,
    Projectile {
        damage: f32,
        pierce: u32,
        weapon: WeaponId,
        /// Hostiles already damaged by this projectile; a projectile with
        /// pierce p damages at most p distinct targets.
        hits: Vec<BodyId>,
    },
    /// Purely visual; skipped by gravity and collision.
    Particle,
    /// Floating reward token; visual only.
    FloatingReward { amount: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Absent for pure visuals.
    pub health: Option<Health>,
    /// Remaining lifetime in nominal frames; <= 0 removes the body.
    pub lifetime: f32,
    /// Shards granted on destruction (before multipliers).
    pub reward: f64,
}

impl Body {
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, BodyKind::Hostile { .. })
    }

    pub fn is_targetable(&self) -> bool {
        matches!(self.kind, BodyKind::Hostile { .. } | BodyKind::ResourceNode)
    }

    pub fn is_visual(&self) -> bool {
        matches!(
            self.kind,
            BodyKind::Particle | BodyKind::FloatingReward { .. }
        )
    }
}

/// Flat mutable pool with cheap insertion and O(1) removal-by-swap.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    bodies: Vec<Body>,
    next_id: BodyId,
    dead: Vec<BodyId>,
}

impl Pool {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
            dead: Vec::new(),
        }
    }

    fn next_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a body built from a freshly allocated id.
    pub fn spawn(&mut self, build: impl FnOnce(BodyId) -> Body) -> BodyId {
        let id = self.next_id();
        let body = build(id);
        debug_assert_eq!(body.id, id);
        self.bodies.push(body);
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Defer removal until the end-of-tick cleanup pass.
    pub fn mark_dead(&mut self, id: BodyId) {
        if !self.dead.contains(&id) {
            self.dead.push(id);
        }
    }

    pub fn is_dead(&self, id: BodyId) -> bool {
        self.dead.contains(&id)
    }

    /// Live hostiles, for targeting.
    pub fn live_targets(&self) -> impl Iterator<Item = &Body> {
        self.bodies
            .iter()
            .filter(|b| b.is_targetable() && !self.dead.contains(&b.id))
    }

    pub fn count_particles(&self) -> usize {
        self.bodies
            .iter()
            .filter(|b| matches!(b.kind, BodyKind::Particle))
            .count()
    }

    /// Evict the oldest particle to make room under the particle cap.
    pub fn evict_oldest_particle(&mut self) {
        if let Some(idx) = self
            .bodies
            .iter()
            .position(|b| matches!(b.kind, BodyKind::Particle))
        {
            self.bodies.swap_remove(idx);
        }
    }

    /// Swap-remove every marked body, then restore ascending-id order so
    /// the next tick iterates deterministically.
    pub fn cleanup(&mut self) -> usize {
        let removed = self.dead.len();
        for id in std::mem::take(&mut self.dead) {
            if let Some(idx) = self.bodies.iter().position(|b| b.id == id) {
                self.bodies.swap_remove(idx);
            }
        }
        self.bodies.sort_by_key(|b| b.id);
        removed
    }

    /// Drop all bodies (prestige / teardown). Ids keep counting up.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.dead.clear();
    }
}

//! Automated weapons: target selection and fire control.
//!
//! Weapons live on a mount ring around the well. Each tick, any weapon
//! whose cooldown has expired picks a target by its configured rule and
//! either spawns a projectile body or queues a hit-scan shot for the
//! collision resolver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind, WeaponId};
use super::state::GameState;
use crate::consts::{MOUNT_RADIUS, PROJECTILE_LIFETIME, PROJECTILE_SPEED};
use crate::economy::UpgradeId;
use crate::polar_to_cartesian;

/// How a weapon picks its target from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    /// Closest live hostile to the well center (most dangerous).
    NearestToAnchor,
    /// Live hostile with the least remaining health.
    LowestHealth,
    /// No target; fires radially outward from the mount.
    StraightLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Turret,
    Drone,
    Lance,
    Scatter,
}

impl WeaponKind {
    pub fn base_damage(self) -> f32 {
        match self {
            WeaponKind::Turret => 12.0,
            WeaponKind::Drone => 20.0,
            WeaponKind::Lance => 45.0,
            WeaponKind::Scatter => 8.0,
        }
    }

    /// Cooldown at level 1, in nominal frames.
    pub fn base_cooldown(self) -> f32 {
        match self {
            WeaponKind::Turret => 45.0,
            WeaponKind::Drone => 70.0,
            WeaponKind::Lance => 150.0,
            WeaponKind::Scatter => 25.0,
        }
    }

    pub fn pierce(self) -> u32 {
        match self {
            WeaponKind::Turret => 1,
            WeaponKind::Drone => 2,
            WeaponKind::Lance => 1,
            WeaponKind::Scatter => 3,
        }
    }

    pub fn rule(self) -> TargetRule {
        match self {
            WeaponKind::Turret => TargetRule::NearestToAnchor,
            WeaponKind::Drone => TargetRule::LowestHealth,
            WeaponKind::Lance => TargetRule::NearestToAnchor,
            WeaponKind::Scatter => TargetRule::StraightLine,
        }
    }

    /// Hit-scan weapons apply damage through the resolver without a
    /// physical projectile.
    pub fn hitscan(self) -> bool {
        matches!(self, WeaponKind::Lance)
    }

    /// Maximum hit-scan reach.
    pub fn range(self) -> f32 {
        match self {
            WeaponKind::Lance => 500.0,
            _ => f32::MAX,
        }
    }

    pub fn upgrade_id(self) -> UpgradeId {
        match self {
            WeaponKind::Turret => UpgradeId::Turret,
            WeaponKind::Drone => UpgradeId::Drone,
            WeaponKind::Lance => UpgradeId::Lance,
            WeaponKind::Scatter => UpgradeId::Scatter,
        }
    }
}

/// One automated emitter. Created on purchase, upgraded in place, removed
/// only by prestige.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    pub kind: WeaponKind,
    pub level: u32,
    /// Remaining cooldown in nominal frames.
    pub cooldown: f32,
}

impl Weapon {
    pub fn new(id: WeaponId, kind: WeaponKind) -> Self {
        Self {
            id,
            kind,
            level: 1,
            cooldown: 0.0,
        }
    }

    /// Monotonic in level.
    pub fn effective_damage(&self) -> f32 {
        self.kind.base_damage() * self.level as f32
    }

    /// Monotonically shrinking in level, floored at 40% of base.
    pub fn effective_cooldown(&self) -> f32 {
        let base = self.kind.base_cooldown();
        (base / (1.0 + (self.level as f32 - 1.0) * 0.15)).max(base * 0.4)
    }

    /// Fixed mount angle derived from the weapon id.
    pub fn mount_theta(&self) -> f32 {
        self.id as f32 * 2.399_963 // golden angle spreads mounts evenly
    }

    pub fn mount_pos(&self) -> Vec2 {
        polar_to_cartesian(MOUNT_RADIUS, self.mount_theta())
    }
}

/// A hit-scan shot bound to a target id, resolved by the collision pass.
#[derive(Debug, Clone, Copy)]
pub struct HitscanShot {
    pub weapon: WeaponId,
    pub target: BodyId,
    pub damage: f32,
    pub max_range: f32,
}

/// Cosmetic emitter-to-target line for the presentation layer. Carries no
/// simulation state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraceEvent {
    pub from: Vec2,
    pub to: Vec2,
    pub weapon: WeaponId,
}

/// Pick a target id for a rule, or None to hold fire.
pub fn select_target(rule: TargetRule, anchor: Vec2, pool: &super::body::Pool) -> Option<BodyId> {
    match rule {
        TargetRule::NearestToAnchor => pool
            .live_targets()
            .min_by(|a, b| {
                let da = (a.pos - anchor).length_squared();
                let db = (b.pos - anchor).length_squared();
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|b| b.id),
        TargetRule::LowestHealth => pool
            .live_targets()
            .min_by(|a, b| {
                let ha = a.health.map(|h| h.hp).unwrap_or(f32::MAX);
                let hb = b.health.map(|h| h.hp).unwrap_or(f32::MAX);
                ha.partial_cmp(&hb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|b| b.id),
        TargetRule::StraightLine => None,
    }
}

/// Decay cooldowns and fire every ready weapon.
pub fn run_fire_control(state: &mut GameState, dt: f32) {
    let speed_mod = state.buffs.speed_multiplier();
    let any_hostile = state.pool.live_targets().any(|b| b.is_hostile());

    for widx in 0..state.weapons.len() {
        state.weapons[widx].cooldown -= dt;
        if state.weapons[widx].cooldown > 0.0 || !any_hostile {
            continue;
        }

        let (weapon_id, kind, damage, cooldown, mount) = {
            let w = &state.weapons[widx];
            (
                w.id,
                w.kind,
                w.effective_damage(),
                w.effective_cooldown(),
                w.mount_pos(),
            )
        };

        let fired = match kind.rule() {
            TargetRule::StraightLine => {
                let dir = polar_to_cartesian(1.0, state.weapons[widx].mount_theta());
                spawn_projectile(state, weapon_id, kind, damage, mount, dir);
                state.traces.push(TraceEvent {
                    from: mount,
                    to: mount + dir * 60.0,
                    weapon: weapon_id,
                });
                true
            }
            rule => {
                let target = select_target(rule, Vec2::ZERO, &state.pool);
                match target {
                    None => false,
                    Some(target_id) => {
                        let target_pos = state
                            .pool
                            .get(target_id)
                            .map(|b| b.pos)
                            .unwrap_or(Vec2::ZERO);
                        if kind.hitscan() {
                            state.pending_hits.push(HitscanShot {
                                weapon: weapon_id,
                                target: target_id,
                                damage,
                                max_range: kind.range(),
                            });
                        } else {
                            let dir = (target_pos - mount).normalize_or_zero();
                            spawn_projectile(state, weapon_id, kind, damage, mount, dir);
                        }
                        state.traces.push(TraceEvent {
                            from: mount,
                            to: target_pos,
                            weapon: weapon_id,
                        });
                        true
                    }
                }
            }
        };

        if fired {
            state.weapons[widx].cooldown = cooldown / speed_mod;
        }
    }
}

fn spawn_projectile(
    state: &mut GameState,
    weapon: WeaponId,
    kind: WeaponKind,
    damage: f32,
    from: Vec2,
    dir: Vec2,
) {
    state.pool.spawn(|id| Body {
        id,
        kind: BodyKind::Projectile {
            damage,
            pierce: kind.pierce(),
            weapon,
            hits: Vec::new(),
        },
        pos: from,
        vel: dir * PROJECTILE_SPEED,
        radius: 4.0,
        health: None,
        lifetime: PROJECTILE_LIFETIME,
        reward: 0.0,
    });
}

/// Manual activation: zap the hostile nearest the activation point, if any
/// is within reach.
pub fn manual_zap(state: &mut GameState, point: Vec2) {
    let zap_range = state.tuning.zap_range;
    let target = state
        .pool
        .live_targets()
        .filter(|b| (b.pos - point).length() <= zap_range)
        .min_by(|a, b| {
            let da = (a.pos - point).length_squared();
            let db = (b.pos - point).length_squared();
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })
        .map(|b| (b.id, b.pos));

    if let Some((target_id, target_pos)) = target {
        state.pending_hits.push(HitscanShot {
            weapon: 0,
            target: target_id,
            damage: state.tuning.zap_damage,
            max_range: f32::MAX,
        });
        state.traces.push(TraceEvent {
            from: point,
            to: target_pos,
            weapon: 0,
        });
    }
}

/// Rebuild and level weapons after a purchase or a save restore: one
/// weapon per owned kind, level equal to the owned count, identity stable
/// across upgrades.
pub fn sync_weapons(state: &mut GameState) {
    for kind in [
        WeaponKind::Turret,
        WeaponKind::Drone,
        WeaponKind::Lance,
        WeaponKind::Scatter,
    ] {
        let owned = state.upgrades.count(kind.upgrade_id());
        let existing = state.weapons.iter_mut().find(|w| w.kind == kind);
        match (owned, existing) {
            (0, _) => {}
            (level, Some(weapon)) => weapon.level = level,
            (level, None) => {
                let id = state.next_weapon_id;
                state.next_weapon_id += 1;
                let mut weapon = Weapon::new(id, kind);
                weapon.level = level;
                state.weapons.push(weapon);
            }
        }
    }
}

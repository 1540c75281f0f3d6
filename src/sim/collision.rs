//! Hit resolution: queued hit-scan shots, projectile overlap sweeps, and
//! destruction payouts.
//!
//! Rewards for a destroyed body are credited exactly once, here, with the
//! combo and production multipliers applied at the moment of destruction.

use glam::Vec2;

use super::body::{Body, BodyId, BodyKind, Health};
use super::physics::spawn_particle_burst;
use super::state::GameState;
use crate::economy::Currency;

/// Resolve all damage sources queued or overlapping this tick.
pub fn resolve(state: &mut GameState) {
    resolve_hitscan(state);
    resolve_projectiles(state);
}

fn resolve_hitscan(state: &mut GameState) {
    let shots = std::mem::take(&mut state.pending_hits);
    for shot in shots {
        // Targets can die or despawn between queueing and resolution.
        let target = state
            .pool
            .get(shot.target)
            .filter(|b| b.is_targetable())
            .map(|b| b.pos);
        let Some(pos) = target else { continue };
        if state.pool.is_dead(shot.target) || pos.length() > shot.max_range {
            continue;
        }
        apply_damage(state, shot.target, shot.damage, None);
    }
}

fn resolve_projectiles(state: &mut GameState) {
    let knockback = state.tuning.physics.knockback;

    // Gather overlapping pairs first, then mutate. The pool is small
    // enough (dozens of bodies) that the O(n*m) sweep is fine.
    let mut pairs: Vec<(BodyId, BodyId)> = Vec::new();
    for projectile in state
        .pool
        .iter()
        .filter(|b| matches!(b.kind, BodyKind::Projectile { .. }))
    {
        for hostile in state.pool.iter().filter(|b| b.is_targetable()) {
            let reach = projectile.radius + hostile.radius;
            if (projectile.pos - hostile.pos).length_squared() < reach * reach {
                pairs.push((projectile.id, hostile.id));
            }
        }
    }

    for (proj_id, hostile_id) in pairs {
        if state.pool.is_dead(proj_id) || state.pool.is_dead(hostile_id) {
            continue;
        }
        // Re-check the hit ledger each application; earlier pairs in this
        // pass may have spent the projectile's pierce.
        let hit = {
            let Some(projectile) = state.pool.get_mut(proj_id) else {
                continue;
            };
            let velocity = projectile.vel;
            let BodyKind::Projectile {
                damage,
                pierce,
                hits,
                ..
            } = &mut projectile.kind
            else {
                continue;
            };
            if hits.contains(&hostile_id) || hits.len() >= *pierce as usize {
                None
            } else {
                hits.push(hostile_id);
                Some((*damage, hits.len() >= *pierce as usize, velocity))
            }
        };
        let Some((damage, spent, velocity)) = hit else {
            continue;
        };
        if spent {
            state.pool.mark_dead(proj_id);
        }
        apply_damage(state, hostile_id, damage, Some(velocity * knockback));
    }
}

/// Subtract health, transfer knockback, and destroy on depletion.
fn apply_damage(state: &mut GameState, id: BodyId, damage: f32, knockback: Option<Vec2>) {
    let depleted = {
        let Some(body) = state.pool.get_mut(id) else {
            return;
        };
        if let Some(impulse) = knockback {
            body.vel += impulse;
        }
        match body.health.as_mut() {
            Some(health) => {
                health.hp -= damage;
                health.hp <= 0.0
            }
            None => false,
        }
    };
    if depleted {
        destroy(state, id);
    }
}

/// Destruction payout and aftermath: credit the scaled reward once, float a
/// reward token, burst particles, split non-fragment hostiles, and extend
/// the kill streak.
pub fn destroy(state: &mut GameState, id: BodyId) {
    if state.pool.is_dead(id) {
        return;
    }
    let snapshot = {
        let Some(body) = state.pool.get(id) else {
            return;
        };
        let fragment = matches!(body.kind, BodyKind::Hostile { fragment: true, .. });
        (
            body.pos,
            body.radius,
            body.reward,
            body.health.map(|h| h.max).unwrap_or(0.0),
            body.is_hostile(),
            fragment,
            matches!(body.kind, BodyKind::ResourceNode),
        )
    };
    let (pos, radius, reward, max_hp, is_hostile, is_fragment, is_node) = snapshot;
    state.pool.mark_dead(id);

    let multiplier = state.combo_multiplier()
        * state.progression.production_multiplier(
            &state.tuning.prestige,
            state.ledger.balance(Currency::Singularity),
        );
    let payout = reward * multiplier;
    state.ledger.credit(Currency::Shards, payout);

    if is_hostile {
        state.combo.count += 1;
        state.combo.timer = 0.0;
    }

    // Resource nodes carry the fire-rate buff; a fresh one replaces
    // whatever remains of the last.
    if is_node {
        state.buffs.speed_mult = state.tuning.buff_multiplier;
        state.buffs.speed_ticks = state.tuning.buff_duration;
    }

    state.pool.spawn(|id| Body {
        id,
        kind: BodyKind::FloatingReward { amount: payout },
        pos,
        vel: Vec2::new(0.0, -0.8),
        radius: 0.0,
        health: None,
        lifetime: 50.0,
        reward: 0.0,
    });

    let rng = &mut state.rng;
    spawn_particle_burst(&mut state.pool, rng, pos, 8);

    // Splits are strictly depth-1: fragments never fragment again.
    if is_hostile && !is_fragment {
        spawn_fragments(state, pos, radius, reward, max_hp);
    }
}

fn spawn_fragments(state: &mut GameState, pos: Vec2, radius: f32, reward: f64, max_hp: f32) {
    use rand::Rng;
    let count = state.tuning.spawn.fragment_count;
    for _ in 0..count {
        let theta = state.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = state.rng.random_range(0.8..1.6);
        state.pool.spawn(|id| Body {
            id,
            kind: BodyKind::Hostile {
                behavior_cooldown: 0.0,
                fragment: true,
            },
            pos,
            vel: Vec2::new(theta.cos(), theta.sin()) * speed,
            radius: (radius * 0.6).max(4.0),
            health: Some(Health::full((max_hp * 0.35).max(1.0))),
            lifetime: f32::MAX,
            reward: reward * 0.3,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameState;
    use crate::sim::weapons::HitscanShot;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(7, Tuning::gravity_well())
    }

    fn add_hostile(state: &mut GameState, pos: Vec2, hp: f32, reward: f64) -> BodyId {
        state.pool.spawn(|id| Body {
            id,
            kind: BodyKind::Hostile {
                behavior_cooldown: 0.0,
                fragment: false,
            },
            pos,
            vel: Vec2::ZERO,
            radius: 10.0,
            health: Some(Health::full(hp)),
            lifetime: f32::MAX,
            reward,
        })
    }

    fn add_projectile(
        state: &mut GameState,
        pos: Vec2,
        vel: Vec2,
        damage: f32,
        pierce: u32,
    ) -> BodyId {
        state.pool.spawn(|id| Body {
            id,
            kind: BodyKind::Projectile {
                damage,
                pierce,
                weapon: 1,
                hits: Vec::new(),
            },
            pos,
            vel,
            radius: 4.0,
            health: None,
            lifetime: 100.0,
            reward: 0.0,
        })
    }

    #[test]
    fn projectile_damages_and_knocks_back() {
        let mut s = state();
        let hostile = add_hostile(&mut s, Vec2::new(100.0, 0.0), 50.0, 10.0);
        add_projectile(&mut s, Vec2::new(102.0, 0.0), Vec2::new(5.0, 0.0), 20.0, 1);
        resolve(&mut s);
        let body = s.pool.get(hostile).unwrap();
        assert_eq!(body.health.unwrap().hp, 30.0);
        assert!(body.vel.x > 0.0, "knockback follows projectile velocity");
    }

    #[test]
    fn pierce_caps_distinct_targets() {
        let mut s = state();
        let a = add_hostile(&mut s, Vec2::new(100.0, 0.0), 50.0, 10.0);
        let b = add_hostile(&mut s, Vec2::new(105.0, 0.0), 50.0, 10.0);
        let c = add_hostile(&mut s, Vec2::new(110.0, 0.0), 50.0, 10.0);
        let proj = add_projectile(&mut s, Vec2::new(104.0, 0.0), Vec2::X, 5.0, 2);
        resolve(&mut s);
        let damaged = [a, b, c]
            .iter()
            .filter(|&&id| s.pool.get(id).unwrap().health.unwrap().hp < 50.0)
            .count();
        assert_eq!(damaged, 2);
        assert!(s.pool.is_dead(proj), "projectile consumed at pierce limit");
    }

    #[test]
    fn destruction_credits_scaled_reward_exactly_once() {
        let mut s = state();
        s.combo.count = 5; // multiplier 1.5
        let hostile = add_hostile(&mut s, Vec2::new(100.0, 0.0), 10.0, 40.0);
        add_projectile(&mut s, Vec2::new(100.0, 0.0), Vec2::X, 99.0, 1);
        resolve(&mut s);
        assert!(s.pool.is_dead(hostile));
        assert_eq!(s.ledger.balance(Currency::Shards), 40.0 * 1.5);
        // Streak extended by the kill.
        assert_eq!(s.combo.count, 6);
        // A reward token floats up.
        assert!(
            s.pool
                .iter()
                .any(|b| matches!(b.kind, BodyKind::FloatingReward { .. }))
        );
    }

    #[test]
    fn fragments_split_only_one_level_deep() {
        let mut s = state();
        let parent = add_hostile(&mut s, Vec2::new(100.0, 0.0), 10.0, 40.0);
        destroy(&mut s, parent);
        let fragments: Vec<BodyId> = s
            .pool
            .iter()
            .filter(|b| matches!(b.kind, BodyKind::Hostile { fragment: true, .. }))
            .map(|b| b.id)
            .collect();
        assert_eq!(fragments.len() as u32, s.tuning.spawn.fragment_count);
        s.pool.cleanup();
        let highest_before = fragments.iter().copied().max().unwrap();
        destroy(&mut s, fragments[0]);
        let second_generation = s
            .pool
            .iter()
            .filter(|b| b.is_hostile() && b.id > highest_before)
            .count();
        assert_eq!(second_generation, 0, "fragments must not fragment again");
    }

    #[test]
    fn hitscan_skips_dead_and_out_of_range_targets() {
        let mut s = state();
        let dead = add_hostile(&mut s, Vec2::new(50.0, 0.0), 50.0, 10.0);
        s.pool.mark_dead(dead);
        let far = add_hostile(&mut s, Vec2::new(600.0, 0.0), 50.0, 10.0);
        s.pending_hits.push(HitscanShot {
            weapon: 1,
            target: dead,
            damage: 20.0,
            max_range: f32::MAX,
        });
        s.pending_hits.push(HitscanShot {
            weapon: 1,
            target: far,
            damage: 20.0,
            max_range: 500.0,
        });
        resolve(&mut s);
        assert_eq!(s.pool.get(dead).unwrap().health.unwrap().hp, 50.0);
        assert_eq!(s.pool.get(far).unwrap().health.unwrap().hp, 50.0);
    }

    #[test]
    fn lethal_threshold_is_checked_on_the_finishing_hit() {
        let mut s = state();
        let hostile = add_hostile(&mut s, Vec2::new(100.0, 0.0), 100.0, 10.0);
        s.pending_hits.push(HitscanShot {
            weapon: 1,
            target: hostile,
            damage: 60.0,
            max_range: f32::MAX,
        });
        resolve(&mut s);
        assert_eq!(s.pool.get(hostile).unwrap().health.unwrap().hp, 40.0);
        assert!(!s.pool.is_dead(hostile));
        s.pending_hits.push(HitscanShot {
            weapon: 1,
            target: hostile,
            damage: 60.0,
            max_range: f32::MAX,
        });
        resolve(&mut s);
        assert!(s.pool.is_dead(hostile));
    }

    #[test]
    fn destroying_a_node_grants_the_fire_rate_buff() {
        let mut s = state();
        let node = s.pool.spawn(|id| Body {
            id,
            kind: BodyKind::ResourceNode,
            pos: Vec2::new(200.0, 0.0),
            vel: Vec2::ZERO,
            radius: 12.0,
            health: Some(Health::full(30.0)),
            lifetime: 1800.0,
            reward: 50.0,
        });
        destroy(&mut s, node);
        assert_eq!(s.buffs.speed_multiplier(), s.tuning.buff_multiplier);
        assert!(s.buffs.speed_ticks > 0.0);
        // Nodes pay out but don't extend the kill streak.
        assert_eq!(s.ledger.balance(Currency::Shards), 50.0);
        assert_eq!(s.combo.count, 0);
    }

    #[test]
    fn destroy_twice_credits_once() {
        let mut s = state();
        let hostile = add_hostile(&mut s, Vec2::new(100.0, 0.0), 10.0, 40.0);
        destroy(&mut s, hostile);
        let after_first = s.ledger.balance(Currency::Shards);
        destroy(&mut s, hostile);
        assert_eq!(s.ledger.balance(Currency::Shards), after_first);
    }
}

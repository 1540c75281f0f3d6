//! Force integration: gravity toward the central well, damping, and the
//! terminal well-consumption transition.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::body::{Body, BodyKind, Pool};
use super::state::GameState;
use crate::consts::{MAX_PARTICLES, SIM_BOUNDS};
use crate::economy::Currency;

/// Advance every body by one normalized tick.
pub fn integrate(state: &mut GameState, dt: f32) {
    let physics = state.tuning.physics.clone();
    let mut dead: Vec<u32> = Vec::new();
    let mut consumed: Vec<(Vec2, f64, bool)> = Vec::new();

    for body in state.pool.iter_mut() {
        // Per-kind gravity scale; visuals are integrated separately below.
        let gravity_factor = match &body.kind {
            BodyKind::Hostile { .. } | BodyKind::ResourceNode => physics.hostile_gravity_factor,
            BodyKind::Projectile { .. } => physics.projectile_gravity_factor,
            BodyKind::Particle => {
                update_particle(body, dt);
                if body.lifetime <= 0.0 {
                    dead.push(body.id);
                }
                continue;
            }
            BodyKind::FloatingReward { .. } => {
                body.pos += body.vel * dt;
                body.lifetime -= dt;
                if body.lifetime <= 0.0 {
                    dead.push(body.id);
                }
                continue;
            }
        };

        if physics.center_mass > 0.0 {
            let distance = body.pos.length();
            // Strict comparison: the force formula divides by distance².
            if distance > physics.well_radius {
                let accel = physics.gravity_const * physics.center_mass / (distance * distance);
                body.vel += (-body.pos / distance) * accel * gravity_factor * dt;
            } else {
                // Terminal transition: the well eats the body whole.
                consumed.push((body.pos, body.reward, body.is_hostile()));
                dead.push(body.id);
                continue;
            }
        }

        if physics.friction < 1.0 {
            body.vel *= physics.friction.powf(dt);
        }
        body.pos += body.vel * dt;
        body.lifetime -= dt;

        if body.lifetime <= 0.0 || body.pos.length() > SIM_BOUNDS {
            dead.push(body.id);
        }
    }

    for id in dead {
        state.pool.mark_dead(id);
    }

    for (pos, reward, was_hostile) in consumed {
        let fractional = reward * physics.well_reward_fraction;
        state.ledger.credit(Currency::Shards, fractional);
        if was_hostile {
            state.breaches_this_tick += 1;
        }
        let rng = &mut state.rng;
        spawn_particle_burst(&mut state.pool, rng, pos, 6);
    }
}

fn update_particle(body: &mut Body, dt: f32) {
    // Light drift toward the center plus damping, like debris circling a
    // drain. Purely visual.
    let to_center = -body.pos.normalize_or_zero();
    body.vel += to_center * 0.8 * dt;
    body.vel *= 0.98_f32.powf(dt);
    body.pos += body.vel * dt;
    body.lifetime -= dt * 1.5;
}

/// Decorative particles, capped; the oldest are evicted to make room.
pub fn spawn_particle_burst(pool: &mut Pool, rng: &mut Pcg32, pos: Vec2, count: usize) {
    for _ in 0..count {
        while pool.count_particles() >= MAX_PARTICLES {
            pool.evict_oldest_particle();
        }
        let theta = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(0.5..2.5);
        let life = rng.random_range(20.0..50.0);
        pool.spawn(|id| Body {
            id,
            kind: BodyKind::Particle,
            pos,
            vel: Vec2::new(theta.cos(), theta.sin()) * speed,
            radius: 2.0,
            health: None,
            lifetime: life,
            reward: 0.0,
        });
    }
}

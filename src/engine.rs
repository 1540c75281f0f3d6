//! Per-instance controller: owns the state, the store, the clock, and the
//! timers, and turns display-refresh callbacks into fixed substeps.
//!
//! Single-threaded by construction; everything external (storage, content
//! generation) happens between substeps and reports through typed errors.

use glam::Vec2;
use serde::Serialize;

use crate::consts::MAX_SUBSTEPS;
use crate::economy::{Currency, OfflineSummary, reconcile};
use crate::error::{ImportError, StoreError};
use crate::persistence::{SaveRecord, SaveStore, export_token, import_token, load_record, save_record};
use crate::scheduler::{Scheduler, TimerKey};
use crate::sim::clock::{Clock, wall_clock_ms};
use crate::sim::state::{GamePhase, GameState};
use crate::sim::tick::{TickInput, tick};
use crate::sim::body::BodyKind;
use crate::tuning::Tuning;

/// Read-only view of one frame for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub shards: f64,
    pub singularity: f64,
    pub lifetime_shards: f64,
    pub passive_rate: f64,
    pub wave: u32,
    pub tier: u32,
    pub combo_count: u32,
    pub combo_multiplier: f64,
    pub paused: bool,
    pub elite_warning: bool,
    pub bodies: Vec<BodySnapshot>,
    pub traces: Vec<TraceSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodySnapshot {
    pub id: u32,
    pub kind: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    /// 0..=1 health fraction; 1.0 for bodies without health.
    pub health_frac: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceSnapshot {
    pub from: Vec2,
    pub to: Vec2,
}

pub struct Engine<S: SaveStore> {
    state: GameState,
    store: S,
    save_key: String,
    scheduler: Scheduler,
    clock: Clock,
    accumulator: f32,
    /// Input from frames too short to run a substep, held for the next one.
    pending_input: TickInput,
    offline_summary: Option<OfflineSummary>,
}

impl<S: SaveStore> Engine<S> {
    /// Load the save under `save_key` (or start fresh), reconcile the time
    /// away, and arm the autosave timer.
    pub fn new(store: S, save_key: &str, seed: u64, tuning: Tuning) -> Self {
        Self::with_now(store, save_key, seed, tuning, wall_clock_ms())
    }

    /// Like `new` but with an injected wall clock, for tests.
    pub fn with_now(store: S, save_key: &str, seed: u64, tuning: Tuning, now_ms: f64) -> Self {
        let record = load_record(&store, save_key);
        let seed = if record.seed != 0 { record.seed } else { seed };
        let mut state = GameState::new(seed, tuning);
        record.restore(&mut state);

        let offline_summary = if record.last_save_ms > 0.0 {
            let elapsed_secs = (now_ms - record.last_save_ms) / 1000.0;
            let rate = state.passive_rate();
            reconcile(&mut state.ledger, rate, elapsed_secs, &state.tuning.offline)
        } else {
            None
        };

        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(TimerKey::Autosave, state.tuning.autosave_secs);

        Self {
            state,
            store,
            save_key: save_key.to_string(),
            scheduler,
            clock: Clock::new(),
            accumulator: 0.0,
            pending_input: TickInput::default(),
            offline_summary,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// The startup catch-up report, if the absence was long enough to
    /// credit. One-shot; presentation takes it once.
    pub fn take_offline_summary(&mut self) -> Option<OfflineSummary> {
        self.offline_summary.take()
    }

    /// One display-refresh callback: convert elapsed wall time into whole
    /// nominal-frame substeps (bounded), then run the timers.
    pub fn advance(&mut self, now_ms: f64, input: &TickInput) {
        let delta = self.clock.tick(now_ms);
        self.accumulator += delta;

        // Coalesce with input held over from frames too short to run a
        // substep: pause toggles combine by parity, the latest activation
        // point wins.
        let mut held = std::mem::take(&mut self.pending_input);
        held.pause ^= input.pause;
        if input.activation.is_some() {
            held.activation = input.activation;
        }

        let mut first = true;
        let mut steps = 0;
        while self.accumulator >= 1.0 && steps < MAX_SUBSTEPS {
            // Edge-triggered input applies to the first substep only.
            let step_input = if first { held } else { TickInput::default() };
            tick(&mut self.state, &step_input, 1.0);
            self.accumulator -= 1.0;
            first = false;
            steps += 1;
        }
        if first {
            // No substep ran; keep the input for the next whole frame
            // rather than spending a fractional tick on it.
            self.pending_input = held;
        }

        self.scheduler
            .set_paused(self.state.phase == GamePhase::Paused);
        for key in self.scheduler.advance(delta as f64 * crate::consts::NOMINAL_FRAME_MS / 1000.0) {
            match key {
                TimerKey::Autosave => {
                    if let Err(err) = self.save_now(now_ms) {
                        log::warn!("autosave failed: {err}");
                    }
                }
                TimerKey::Custom(_) => {}
            }
        }
    }

    /// Write the current run to the store immediately.
    pub fn save_now(&mut self, now_ms: f64) -> Result<(), StoreError> {
        let record = SaveRecord::from_state(&self.state, now_ms);
        save_record(&mut self.store, &self.save_key, &record)?;
        log::debug!("saved '{}' at {now_ms:.0}ms", self.save_key);
        Ok(())
    }

    /// Stop all timers and flush one final save.
    pub fn teardown(&mut self, now_ms: f64) {
        self.scheduler.cancel_all();
        if let Err(err) = self.save_now(now_ms) {
            log::warn!("final save failed: {err}");
        }
    }

    /// Bundle every stored record into an opaque text token.
    pub fn export(&self) -> Result<String, StoreError> {
        export_token(&self.store)
    }

    /// Replace stored records from a token and reload this run from the
    /// store. A failed import changes nothing; imports never trigger
    /// offline credit.
    pub fn import(&mut self, token: &str) -> Result<usize, ImportError> {
        let imported = import_token(&mut self.store, token)?;
        let record = load_record(&self.store, &self.save_key);
        let mut state = GameState::new(
            if record.seed != 0 { record.seed } else { self.state.seed },
            self.state.tuning.clone(),
        );
        record.restore(&mut state);
        self.state = state;
        Ok(imported)
    }

    /// Capture everything the presentation layer draws from.
    pub fn snapshot(&mut self) -> FrameSnapshot {
        let elite_warning = self.state.spawner.take_elite_warning();
        let state = &self.state;
        FrameSnapshot {
            shards: state.ledger.balance(Currency::Shards),
            singularity: state.ledger.balance(Currency::Singularity),
            lifetime_shards: state.ledger.lifetime_shards(),
            passive_rate: state.passive_rate(),
            wave: state.wave,
            tier: state.progression.tier,
            combo_count: state.combo.count,
            combo_multiplier: state.combo_multiplier(),
            paused: state.phase == GamePhase::Paused,
            elite_warning,
            bodies: state
                .pool
                .iter()
                .map(|b| BodySnapshot {
                    id: b.id,
                    kind: match b.kind {
                        BodyKind::Hostile { .. } => "hostile",
                        BodyKind::ResourceNode => "resource",
                        BodyKind::Projectile { .. } => "projectile",
                        BodyKind::Particle => "particle",
                        BodyKind::FloatingReward { .. } => "reward",
                    },
                    pos: b.pos,
                    radius: b.radius,
                    health_frac: b
                        .health
                        .map(|h| (h.hp / h.max).clamp(0.0, 1.0))
                        .unwrap_or(1.0),
                })
                .collect(),
            traces: state
                .traces
                .iter()
                .map(|t| TraceSnapshot {
                    from: t.from,
                    to: t.to,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NOMINAL_FRAME_MS;
    use crate::economy::UpgradeId;
    use crate::persistence::MemoryStore;

    fn engine_at(now_ms: f64) -> Engine<MemoryStore> {
        Engine::with_now(MemoryStore::new(), "slot.test", 99, Tuning::gravity_well(), now_ms)
    }

    #[test]
    fn advance_runs_whole_substeps_and_banks_the_rest() {
        let mut engine = engine_at(0.0);
        engine.advance(0.0, &TickInput::default()); // first tick: delta 1.0
        assert_eq!(engine.state().time_ticks, 1);
        engine.advance(NOMINAL_FRAME_MS * 2.5, &TickInput::default());
        assert_eq!(engine.state().time_ticks, 3);
        // The banked 0.5 completes on the next frame.
        engine.advance(NOMINAL_FRAME_MS * 3.0, &TickInput::default());
        assert_eq!(engine.state().time_ticks, 4);
    }

    #[test]
    fn short_frames_hold_input_without_spending_a_tick() {
        let mut engine = engine_at(0.0);
        engine.advance(0.0, &TickInput::default());
        assert_eq!(engine.state().time_ticks, 1);

        // Quarter-frame callbacks: the tick count stays put and the pause
        // request is held, not applied to a fractional step.
        let pause = TickInput { pause: true, ..Default::default() };
        engine.advance(NOMINAL_FRAME_MS * 0.25, &pause);
        assert_eq!(engine.state().time_ticks, 1);
        assert_eq!(engine.state().phase, GamePhase::Running);
        engine.advance(NOMINAL_FRAME_MS * 0.5, &TickInput::default());
        assert_eq!(engine.state().time_ticks, 1);

        // A whole frame finally accrues; the held pause lands exactly once.
        engine.advance(NOMINAL_FRAME_MS * 1.5, &TickInput::default());
        assert_eq!(engine.state().phase, GamePhase::Paused);
        assert_eq!(engine.state().time_ticks, 1);
    }

    #[test]
    fn stalled_frames_are_bounded_by_the_substep_cap() {
        let mut engine = engine_at(0.0);
        engine.advance(0.0, &TickInput::default());
        let before = engine.state().time_ticks;
        engine.advance(60_000.0, &TickInput::default());
        assert!(engine.state().time_ticks - before <= MAX_SUBSTEPS as u64);
    }

    #[test]
    fn autosave_fires_and_restart_restores_the_run() {
        let mut engine = engine_at(1_000.0);
        engine.state_mut().ledger.credit(Currency::Shards, 5_000.0);
        engine.state_mut().purchase(UpgradeId::Collector, 3).unwrap();
        engine.teardown(10_000.0);

        let store = engine.store.clone();
        let mut revived =
            Engine::with_now(store, "slot.test", 1, Tuning::gravity_well(), 20_000.0);
        assert_eq!(revived.state().upgrades.collector, 3);
        assert_eq!(revived.state().seed, 99, "seed survives the save");
        // 10 seconds away is under the offline minimum.
        assert!(revived.take_offline_summary().is_none());
    }

    #[test]
    fn long_absence_is_credited_on_startup() {
        let mut engine = engine_at(0.0);
        engine.state_mut().ledger.credit(Currency::Shards, 5_000.0);
        engine.state_mut().purchase(UpgradeId::Collector, 4).unwrap();
        engine.teardown(1_000.0);
        let rate = engine.state().passive_rate();

        let store = engine.store.clone();
        let hour_later_ms = 1_000.0 + 3_600.0 * 1000.0;
        let mut revived =
            Engine::with_now(store, "slot.test", 1, Tuning::gravity_well(), hour_later_ms);
        let summary = revived.take_offline_summary().unwrap();
        assert_eq!(summary.elapsed_secs, 3_600.0);
        let expected = rate * revived.state().tuning.offline.efficiency * 3_600.0;
        assert!((summary.credited - expected).abs() < 1e-6);
    }

    #[test]
    fn import_failure_keeps_the_current_run() {
        let mut engine = engine_at(0.0);
        engine.state_mut().ledger.credit(Currency::Shards, 777.0);
        engine.save_now(0.0).unwrap();
        let err = engine.import("not a token").unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
        assert_eq!(engine.state().ledger.balance(Currency::Shards), 777.0);
    }

    #[test]
    fn export_import_moves_a_run_between_stores() {
        let mut engine = engine_at(0.0);
        engine.state_mut().ledger.credit(Currency::Shards, 12_345.0);
        engine.save_now(500.0).unwrap();
        let token = engine.export().unwrap();

        let mut other = engine_at(0.0);
        other.import(&token).unwrap();
        assert_eq!(other.state().ledger.balance(Currency::Shards), 12_345.0);
    }

    #[test]
    fn snapshot_reflects_the_economy() {
        let mut engine = engine_at(0.0);
        engine.state_mut().ledger.credit(Currency::Shards, 300.0);
        engine.state_mut().purchase(UpgradeId::Collector, 1).unwrap();
        let snap = engine.snapshot();
        assert_eq!(snap.shards, 250.0);
        assert_eq!(snap.passive_rate, 1.0);
        assert!(!snap.paused);
    }
}

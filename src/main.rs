//! Headless demo: drives the engine with synthetic frame times and a
//! greedy purchase policy, printing a status line every simulated minute.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use driftwell::consts::NOMINAL_FRAME_MS;
    use driftwell::economy::{Currency, UpgradeId};
    use driftwell::engine::Engine;
    use driftwell::persistence::MemoryStore;
    use driftwell::sim::TickInput;
    use driftwell::tuning::Tuning;

    env_logger::init();

    let minutes: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);
    let seed = 0xD41F7;

    let mut engine = Engine::new(
        MemoryStore::new(),
        "slot.demo",
        seed,
        Tuning::gravity_well(),
    );
    log::info!("driftwell demo: {minutes} simulated minute(s), seed {seed:#x}");

    let frames = minutes * 60 * 60;
    let mut now_ms = 0.0;
    for frame in 0..frames {
        now_ms += NOMINAL_FRAME_MS;
        engine.advance(now_ms, &TickInput::default());

        // Greedy policy: collectors first, then whatever weapon unlocks.
        let state = engine.state_mut();
        for id in UpgradeId::ALL {
            state.purchase_max(id, 10);
        }

        if frame % 3600 == 0 {
            let snap = engine.snapshot();
            println!(
                "t={:>4}m shards={:>12.0} rate={:>8.2}/s wave={} tier={} combo=x{:.1} bodies={}",
                frame / 3600,
                snap.shards,
                snap.passive_rate,
                snap.wave,
                snap.tier,
                snap.combo_multiplier,
                snap.bodies.len(),
            );
        }
    }

    if let Some(award) = engine.state_mut().prestige() {
        println!("prestiged for {award} singularity");
    }
    engine.teardown(now_ms);

    let state = engine.state();
    println!(
        "final: lifetime {:.0} shards, {} singularity, {} prestige(s)",
        state.ledger.lifetime_shards(),
        state.ledger.balance(Currency::Singularity),
        state.progression.prestige_count,
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build is consumed as a library; see `driftwell::engine`.
}

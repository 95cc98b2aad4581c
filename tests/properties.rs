// Invariant checks over long randomized sessions. Native-only, no browser APIs.

use aim_trainer::{
    FixedSurface, Mode, RoundConfig, RoundController, SpawnPattern, Surface, accuracy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Play one round of random input at irregular frame times, checking invariants after each step.
fn play_checked(config: RoundConfig, surface: FixedSurface, seed: u64) {
    let mut input = StdRng::seed_from_u64(seed ^ 0x5eed);
    let mut c = RoundController::new(config.clone(), surface, StdRng::seed_from_u64(seed));
    c.start_round(Mode::Standard, 0.0);

    let (w, h) = surface.size();
    let mut now = 0.0;
    let mut last_size = c.state().target_size;
    let mut last_time = c.state().time_remaining;
    while c.state().running {
        now += input.gen_range(1.0..120.0);
        match input.gen_range(0..3u8) {
            0 => {
                c.register_hit(now);
            }
            1 => {
                c.register_miss();
            }
            _ => {
                c.advance_time(now);
            }
        }
        let st = c.state();
        assert_eq!(st.shots, st.hits + st.misses);
        assert!(st.time_remaining >= 0.0 && st.time_remaining <= config.duration_secs);
        assert!(st.time_remaining <= last_time);
        assert!(st.target_size <= last_size, "target grew");
        assert!(st.target_size >= config.size_end && st.target_size <= config.size_start);
        let p = st.target_position;
        assert!(p.x >= 0.0 && p.y >= 0.0, "{p:?}");
        assert!(p.x + st.target_size <= w && p.y + st.target_size <= h, "{p:?} on {w}x{h}");
        let acc = c.hud().accuracy;
        assert!(acc <= 100);
        assert_eq!(acc, accuracy(st.hits, st.shots));
        last_size = st.target_size;
        last_time = st.time_remaining;
    }
    assert_eq!(c.state().time_remaining, 0.0);
}

#[test]
fn invariants_hold_for_uniform_spawns() {
    for seed in 0..20 {
        play_checked(RoundConfig::default(), FixedSurface::new(900.0, 600.0), seed);
    }
}

#[test]
fn invariants_hold_for_edge_spawns() {
    let config = RoundConfig { spawn: SpawnPattern::Edge, ..RoundConfig::default() };
    for seed in 0..20 {
        play_checked(config.clone(), FixedSurface::new(640.0, 480.0), seed);
    }
}

#[test]
fn invariants_hold_on_smallest_supported_surface() {
    // 2 * margin + SIZE_START
    let side = 2.0 * 20.0 + 80.0;
    for seed in 0..10 {
        play_checked(RoundConfig::default(), FixedSurface::new(side, side), seed);
    }
}

#[test]
fn accuracy_zero_without_shots() {
    let mut c = RoundController::new(
        RoundConfig::default(),
        FixedSurface::new(800.0, 600.0),
        StdRng::seed_from_u64(9),
    );
    assert_eq!(c.hud().accuracy, 0);
    c.start_round(Mode::Standard, 0.0);
    c.advance_time(10_000.0);
    assert_eq!(c.hud().accuracy, 0);
}

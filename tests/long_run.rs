use rand::SeedableRng;
use rand::rngs::SmallRng;

use statecraft::bus::EventBus;
use statecraft::model::{GameState, RECENT_EVENTS_CAP};
use statecraft::sim::Scheduler;

fn run_turns(seed: u64, turns: u32) -> GameState {
    let mut scheduler = Scheduler::new(
        GameState::default(),
        Box::new(SmallRng::seed_from_u64(seed)),
        EventBus::new(),
    );
    scheduler.advance_turns(turns);
    scheduler.state().clone()
}

fn assert_invariants(state: &GameState, seed: u64) {
    let eco = &state.economy;
    assert!(
        (-10.0..=12.0).contains(&eco.gdp_growth),
        "seed {seed}: gdp {} out of range",
        eco.gdp_growth
    );
    assert!(
        (3.0..=12.0).contains(&eco.unemployment),
        "seed {seed}: unemployment {} out of range",
        eco.unemployment
    );
    assert!(
        (-2.0..=15.0).contains(&eco.inflation),
        "seed {seed}: inflation {} out of range",
        eco.inflation
    );
    assert!((0.0..=100.0).contains(&eco.confidence));
    assert!((0.0..=300.0).contains(&eco.national_debt));

    let pol = &state.politics;
    assert!(
        (0.0..=100.0).contains(&pol.approval),
        "seed {seed}: approval {} out of range",
        pol.approval
    );
    assert!(pol.independents() >= 0.0);
    assert!((0.0..=100.0).contains(&pol.coalition.support));
    assert!((0.0..=100.0).contains(&pol.political_capital));
    for party in &pol.opposition_parties {
        assert!((5.0..=45.0).contains(&party.support), "seed {seed}");
        assert!((15.0..=70.0).contains(&party.approval), "seed {seed}");
    }

    for crisis in &state.crises.active {
        assert!((0.0..=100.0).contains(&crisis.severity), "seed {seed}");
        assert!((0.0..=100.0).contains(&crisis.media_attention));
        assert!((0.0..=100.0).contains(&crisis.public_concern));
    }
    assert!(state.crises.history.len() <= 104);
    assert!(state.log.recent.len() <= RECENT_EVENTS_CAP);

    for rel in state.diplomacy.relations.values() {
        assert!((0.0..=100.0).contains(&rel.score), "seed {seed}");
    }
}

#[test]
fn two_years_unattended_holds_every_invariant() {
    for seed in [42, 99, 123, 777] {
        let state = run_turns(seed, 104);
        assert_invariants(&state, seed);
    }
}

#[test]
fn eight_years_unattended_stays_bounded() {
    for seed in [7, 2026] {
        let state = run_turns(seed, 416);
        assert_invariants(&state, seed);
        // Either the game ended or the clock kept pace with the turns run.
        if !state.game_over() {
            assert_eq!(state.clock.absolute_week(), 417);
        }
    }
}

#[test]
fn identical_seeds_produce_identical_worlds() {
    for seed in [1, 55, 9000] {
        let a = run_turns(seed, 60);
        let b = run_turns(seed, 60);
        assert_eq!(a, b, "seed {seed} diverged");
    }
}

#[test]
fn different_seeds_diverge() {
    let a = run_turns(100, 60);
    let b = run_turns(101, 60);
    assert_ne!(a, b);
}

#[test]
fn sector_shares_stay_a_partition() {
    for seed in [42, 777] {
        let state = run_turns(seed, 104);
        let total: f64 = state.economy.sectors.iter().map(|s| s.share).sum();
        assert!(
            (total - 1.0).abs() < 1e-6,
            "seed {seed}: shares sum to {total}"
        );
    }
}

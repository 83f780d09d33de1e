//! Property-based tests: ingestion clamps, rotation and resolver invariants.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use slotkeep_engine::config::MIN_UPDATE_INTERVAL;
use slotkeep_engine::resolver::{ConditionalTracker, ResolverState};
use slotkeep_engine::{
    AssignmentStrategy, ConditionalState, EnergyDecision, EnergyPolicy, EnergyRequest,
    InstanceConfig, ModuleDefinition, ResolveContext, RotationStore, VelocityGate,
};
use slotkeep_protocol::ObjectTypeId;

fn arb_ratio() -> impl Strategy<Value = f32> {
    prop_oneof![-2.0f32..3.0, Just(f32::NAN), Just(0.0), Just(1.0)]
}

proptest! {
    #[test]
    fn ingested_ratios_are_ordered_and_bounded(
        maintain in arb_ratio(),
        refill in arb_ratio(),
        interval in -1.0f32..5.0,
        min_set in -3.0f32..3.0,
    ) {
        let config = InstanceConfig::ingest(&ModuleDefinition {
            maintain_below_ratio: maintain,
            refill_to_ratio: refill,
            update_interval: interval,
            min_set_energy_interval: min_set,
            ..ModuleDefinition::default()
        });
        prop_assert!((0.0..=1.0).contains(&config.maintain_below_ratio));
        prop_assert!((0.0..=1.0).contains(&config.refill_to_ratio));
        prop_assert!(config.refill_to_ratio >= config.maintain_below_ratio);
        prop_assert!(config.update_interval >= MIN_UPDATE_INTERVAL);
        prop_assert!(config.min_set_energy_interval >= 0.0);
    }

    #[test]
    fn rotation_cycles_through_every_offset(count in 1usize..12, spawns in 1usize..40) {
        let store = RotationStore::new();
        let type_id = ObjectTypeId::new("Sword");
        for spawn in 0..spawns {
            prop_assert_eq!(store.claim(&type_id, count), spawn % count);
        }
    }

    #[test]
    fn random_pick_is_sticky(seed in any::<u64>(), count in 1usize..8, slot in 0usize..8) {
        let mut state = ResolverState::default();
        state.prepare(0, 0.0);
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = ResolveContext { now: 0.0, held: false, speed: 0.0 };
        let first = AssignmentStrategy::RandomPerSpawn
            .resolve(slot, count, &mut state, &ctx, &mut rng);
        prop_assert!(first.is_some_and(|i| i < count));
        for _ in 0..10 {
            let again = AssignmentStrategy::RandomPerSpawn
                .resolve(slot, count, &mut state, &ctx, &mut rng);
            prop_assert_eq!(again, first);
        }
    }

    #[test]
    fn fast_holds_inside_dead_band(
        threshold in 0.0f32..20.0,
        hysteresis in 0.0f32..5.0,
        fraction in 0.0f32..1.0,
        elapsed in 0.0f32..10.0,
    ) {
        let gate = VelocityGate { threshold, hysteresis, min_switch_interval: 0.25 };
        let mut tracker = ConditionalTracker::default();
        tracker.reset(0.0);
        tracker.update(&gate, &ResolveContext { now: 0.0, held: false, speed: gate.enter_fast() });
        prop_assert_eq!(tracker.state(), ConditionalState::Fast);

        let band = gate.enter_fast() - gate.exit_fast();
        let speed = gate.exit_fast() + band * fraction;
        let state = tracker.update(&gate, &ResolveContext { now: elapsed, held: false, speed });
        prop_assert_eq!(state, ConditionalState::Fast);
    }

    #[test]
    fn maintenance_write_never_exceeds_target(
        current in 0.0f32..50.0,
        target in 0.0f32..50.0,
        maintain in 0.0f32..1.0,
        refill_extra in 0.0f32..1.0,
    ) {
        let refill = maintain + (1.0 - maintain) * refill_extra;
        let policy = EnergyPolicy {
            keep_filled: true,
            maintain_below_ratio: maintain,
            refill_to_ratio: refill,
            min_set_energy_interval: 0.0,
        };
        let decision = policy.decide(&EnergyRequest {
            current,
            target,
            forced: false,
            mismatch_handled: false,
            last_write: None,
            now: 0.0,
        });
        if let EnergyDecision::Write { energy } = decision {
            prop_assert!(energy <= target);
            prop_assert!(current <= target * maintain);
        }
    }
}

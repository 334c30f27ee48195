//! One night's lane assignment: parking followed by dispatching.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{
    dispatch, DispatchOutcome, DispatchRecord, Occupancy, ParkingEngine, UnmatchedDeparture,
    UnplaceableArrival,
};
use crate::config::DepotConfig;
use crate::models::{Lane, PatternCatalogue, TypeCatalogue, VehicleId, VehicleType};
use crate::validation::{build_lanes, validate_arrivals, validate_lanes, ValidationError};

/// Complete result of a night's run.
///
/// Holds the lane state right after parking (the arrival mapping the output
/// layer labels) as well as what dispatching did with it.
#[derive(Debug, Clone, Serialize)]
pub struct NightPlan {
    /// Lanes as they stood after the last arrival was parked.
    pub parked: Occupancy,
    /// Arrivals that could not be parked.
    pub unplaceable: Vec<UnplaceableArrival>,
    /// Departures served per lane ordinal.
    pub dispatches: BTreeMap<usize, Vec<DispatchRecord>>,
    /// Vehicles still parked after the last departure.
    pub remaining: Occupancy,
    /// Departures that could not be served.
    pub unmatched: Vec<UnmatchedDeparture>,
}

impl NightPlan {
    /// Parks `arrivals` into `lanes`, then serves `departures`.
    ///
    /// Fails if two lanes share an ordinal, a lane has a zero-capacity
    /// block, or an arrival appears twice. Lane types are not checked here:
    /// a lane of a type no vehicle has simply stays empty. Use
    /// [`NightPlan::from_catalogue`] to check types against the fleet.
    /// Placement failures are reported in the plan.
    pub fn run(
        lanes: Vec<Lane>,
        arrivals: &[VehicleId],
        departures: &[VehicleType],
    ) -> Result<Self, Vec<ValidationError>> {
        Self::run_with(&ParkingEngine::new(), lanes, arrivals, departures)
    }

    /// Like [`NightPlan::run`] with a configured parking engine.
    #[instrument(
        level = "info",
        skip_all,
        fields(lanes = lanes.len(), arrivals = arrivals.len(), departures = departures.len())
    )]
    pub fn run_with(
        parking: &ParkingEngine,
        lanes: Vec<Lane>,
        arrivals: &[VehicleId],
        departures: &[VehicleType],
    ) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_lanes(&lanes) {
            errors.extend(e);
        }
        if let Err(e) = validate_arrivals(arrivals) {
            errors.extend(e);
        }
        if !errors.is_empty() {
            for e in &errors {
                warn!(kind = ?e.kind, "{}", e.message);
            }
            return Err(errors);
        }

        let parked = parking.park(lanes, arrivals);
        let snapshot = parked.occupancy.clone();
        let DispatchOutcome {
            dispatches,
            remaining,
            unmatched,
        } = dispatch(parked.occupancy, departures);

        let plan = Self {
            parked: snapshot,
            unplaceable: parked.unplaceable,
            dispatches,
            remaining,
            unmatched,
        };
        info!(
            unplaceable = plan.unplaceable.len(),
            unmatched = plan.unmatched.len(),
            "Night plan finished"
        );
        Ok(plan)
    }

    /// Builds lanes from an oracle catalogue and runs the night.
    pub fn from_catalogue(
        catalogue: &PatternCatalogue,
        types: &TypeCatalogue,
        config: &DepotConfig,
        arrivals: &[VehicleId],
        departures: &[VehicleType],
    ) -> Result<Self, Vec<ValidationError>> {
        let lanes = build_lanes(catalogue, types, config)?;
        Self::run(lanes, arrivals, departures)
    }

    /// Whether every arrival was parked and every departure served.
    pub fn is_complete(&self) -> bool {
        self.unplaceable.is_empty() && self.unmatched.is_empty()
    }

    /// Departures served from the lane with ordinal `lane_index`.
    pub fn dispatches_for(&self, lane_index: usize) -> &[DispatchRecord] {
        self.dispatches
            .get(&lane_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{park, ParkingPolicy, Tier};
    use crate::models::{LaneSide, Pattern};
    use crate::validation::ValidationErrorKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    const CODES: [&str; 3] = ["A", "B", "C"];

    fn ids(raws: &[&str]) -> Vec<VehicleId> {
        raws.iter().map(|s| VehicleId::parse(s, 1).unwrap()).collect()
    }

    fn types(codes: &[&str]) -> Vec<VehicleType> {
        codes.iter().map(|c| VehicleType::new(*c)).collect()
    }

    /// Random night over types A/B/C. Lanes only ever hold A or B, so C
    /// arrivals are always unplaceable and C departures always unmatched.
    fn random_night(seed: u64) -> (Vec<Lane>, Vec<VehicleId>, Vec<VehicleType>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let lane_count = rng.random_range(1..8);
        let lanes: Vec<Lane> = (0..lane_count)
            .map(|i| {
                let exit = CODES[rng.random_range(0..2)];
                let pattern = if rng.random_bool(0.3) {
                    Pattern::single(exit, rng.random_range(1..4))
                } else {
                    let entry = CODES[rng.random_range(0..2)];
                    Pattern::double(exit, rng.random_range(1..4), entry, rng.random_range(1..4))
                };
                Lane::new(pattern, i)
            })
            .collect();

        let arrival_count = rng.random_range(0..30);
        let arrivals: Vec<VehicleId> = (0..arrival_count)
            .map(|n| {
                let code = CODES[rng.random_range(0..CODES.len())];
                VehicleId::parse(&format!("{code}{n}"), 1).unwrap()
            })
            .collect();

        let departure_count = rng.random_range(0..35);
        let departures: Vec<VehicleType> = (0..departure_count)
            .map(|_| VehicleType::new(CODES[rng.random_range(0..CODES.len())]))
            .collect();

        (lanes, arrivals, departures)
    }

    #[test]
    fn test_scenario_two_block_lane() {
        let lanes = vec![Lane::new(Pattern::double("A", 2, "B", 1), 0)];
        let plan = NightPlan::run(lanes, &ids(&["A1", "A2", "B1"]), &types(&["A", "A", "B"]))
            .unwrap();

        let parked = &plan.parked.lanes()[0];
        assert_eq!(parked.exit_occupants().len(), 2);
        assert_eq!(parked.entry_occupants().len(), 1);

        let order: Vec<&str> = plan
            .dispatches_for(0)
            .iter()
            .map(|r| r.vehicle.as_str())
            .collect();
        assert_eq!(order, vec!["A1", "A2", "B1"]);
        assert!(plan.is_complete());
        assert_eq!(plan.remaining.parked_count(), 0);
    }

    #[test]
    fn test_scenario_unknown_type() {
        let lanes = vec![Lane::new(Pattern::double("A", 2, "B", 1), 0)];
        let plan = NightPlan::run(lanes, &ids(&["C1"]), &[]).unwrap();
        assert_eq!(plan.unplaceable.len(), 1);
        assert_eq!(plan.parked.parked_count(), 0);
        assert!(!plan.is_complete());
    }

    #[test]
    fn test_duplicate_arrival_is_fatal() {
        let lanes = vec![Lane::new(Pattern::single("A", 2), 0)];
        let errors = NightPlan::run(lanes, &ids(&["A1", "A1"]), &[]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateArrival);
    }

    #[test]
    fn test_hand_built_lanes_checked() {
        let lanes = vec![
            Lane::new(Pattern::single("A", 2), 4),
            Lane::new(Pattern::double("B", 0, "A", 1), 4),
        ];
        let errors = NightPlan::run(lanes, &ids(&["A1", "A1"]), &[]).unwrap_err();
        let kinds: Vec<&ValidationErrorKind> = errors.iter().map(|e| &e.kind).collect();
        assert!(kinds.contains(&&ValidationErrorKind::DuplicateLane));
        assert!(kinds.contains(&&ValidationErrorKind::ZeroCapacity));
        assert!(kinds.contains(&&ValidationErrorKind::DuplicateArrival));
    }

    #[test]
    fn test_oracle_ordinals_preserved() {
        let lanes = vec![
            Lane::new(Pattern::double("A", 1, "B", 1), 11),
            Lane::new(Pattern::single("A", 1), 3),
        ];
        let plan = NightPlan::run(lanes, &ids(&["A1", "A2", "B1"]), &types(&["A", "A", "B"]))
            .unwrap();

        assert_eq!(plan.parked.locate(&ids(&["A2"])[0]), Some((3, LaneSide::Exit)));
        let lane_11: Vec<&str> = plan
            .dispatches_for(11)
            .iter()
            .map(|r| r.vehicle.as_str())
            .collect();
        assert_eq!(lane_11, vec!["A1", "B1"]);
        assert_eq!(plan.dispatches_for(3)[0].vehicle.as_str(), "A2");
        assert!(plan.dispatches_for(0).is_empty());
        assert!(plan.dispatches_for(1).is_empty());
    }

    #[test]
    fn test_from_catalogue() {
        let catalogue = PatternCatalogue::new()
            .with_pattern(Pattern::double("SMV", 4, "STV", 2), 1)
            .with_pattern(Pattern::single("STS", 1), 2);
        let types_cat = TypeCatalogue::standard();
        let (arrivals, skipped) =
            types_cat.filter_known(["SVV703", "STS1", "STV5", "STS2", "STS3", "HUOLTO9"]);
        assert_eq!(skipped.len(), 1);

        let departures: Vec<VehicleType> = ["STS", "SMV", "STV"]
            .iter()
            .map(|c| types_cat.parse_type(c).unwrap())
            .collect();

        let plan = NightPlan::from_catalogue(
            &catalogue,
            &types_cat,
            &DepotConfig::default(),
            &arrivals,
            &departures,
        )
        .unwrap();

        assert_eq!(plan.unplaceable.len(), 1);
        assert_eq!(plan.unplaceable[0].vehicle.as_str(), "STS3");
        assert_eq!(
            plan.parked.locate(&arrivals[0]),
            Some((0, LaneSide::Exit))
        );
        assert_eq!(arrivals[0].as_str(), "SMV703");
        assert!(plan.unmatched.is_empty());
        assert_eq!(plan.dispatches_for(1)[0].vehicle.as_str(), "STS1");
    }

    #[test]
    fn test_from_catalogue_rejects_malformed() {
        let catalogue = PatternCatalogue::new().with_pattern(Pattern::single("DMV", 0), 1);
        let result = NightPlan::from_catalogue(
            &catalogue,
            &TypeCatalogue::standard(),
            &DepotConfig::default(),
            &[],
            &[],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_capacity_and_conservation() {
        for seed in 0..200 {
            let (lanes, arrivals, _) = random_night(seed);
            let out = park(lanes, &arrivals);

            for lane in out.occupancy.lanes() {
                assert!(lane.exit_occupants().len() <= lane.exit_capacity());
                assert!(lane.entry_occupants().len() <= lane.entry_capacity());
                if lane.is_single_block() {
                    assert!(lane.entry_occupants().is_empty());
                }
            }

            let unplaceable: HashSet<&str> =
                out.unplaceable.iter().map(|u| u.vehicle.as_str()).collect();
            for vehicle in &arrivals {
                let parked = out.occupancy.locate(vehicle).is_some();
                assert!(
                    parked != unplaceable.contains(vehicle.as_str()),
                    "seed {seed}: {vehicle} parked={parked}"
                );
            }
            assert_eq!(
                out.occupancy.parked_count() + out.unplaceable.len(),
                arrivals.len()
            );
        }
    }

    #[test]
    fn test_fifo_and_entry_blocked() {
        for seed in 0..200 {
            let (lanes, arrivals, departures) = random_night(seed);
            let plan = NightPlan::run(lanes, &arrivals, &departures).unwrap();

            for lane in plan.parked.lanes() {
                let i = lane.index;
                let records = plan.dispatches_for(i);
                for (side, queue) in [
                    (LaneSide::Exit, lane.exit_occupants()),
                    (LaneSide::Entry, lane.entry_occupants()),
                ] {
                    let removed: Vec<&VehicleId> = records
                        .iter()
                        .filter(|r| r.side() == side)
                        .map(|r| &r.vehicle)
                        .collect();
                    let expected: Vec<&VehicleId> = queue.iter().take(removed.len()).collect();
                    assert_eq!(removed, expected, "seed {seed}, lane {i}");
                }

                // Every entry pop happens after all exit occupants have left.
                let exit_total = lane.exit_occupants().len();
                let mut exits_seen = 0;
                for r in records {
                    match r.tier {
                        Tier::TwoBlockEntry => assert_eq!(exits_seen, exit_total, "seed {seed}"),
                        _ => exits_seen += 1,
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_departure_accounted() {
        for seed in 0..200 {
            let (lanes, arrivals, departures) = random_night(seed);
            let plan = NightPlan::run(lanes, &arrivals, &departures).unwrap();

            let mut slots: Vec<usize> = plan
                .dispatches
                .values()
                .flatten()
                .map(|r| r.slot)
                .chain(plan.unmatched.iter().map(|u| u.slot))
                .collect();
            slots.sort_unstable();
            assert_eq!(slots, (0..departures.len()).collect::<Vec<_>>());

            for r in plan.dispatches.values().flatten() {
                assert_eq!(r.vehicle.vehicle_type(), &departures[r.slot]);
            }
            assert_eq!(
                plan.remaining.parked_count() + plan.dispatches.values().flatten().count(),
                plan.parked.parked_count()
            );
        }
    }

    #[test]
    fn test_unmatched_only_when_exit_blocks_exhausted() {
        for seed in 0..200 {
            let (lanes, arrivals, departures) = random_night(seed);
            let plan = NightPlan::run(lanes, &arrivals, &departures).unwrap();

            // Lanes only lose vehicles while dispatching, so a vehicle still
            // in an exit block at the end was reachable at every earlier slot.
            for u in &plan.unmatched {
                let reachable = plan
                    .remaining
                    .lanes()
                    .iter()
                    .any(|l| l.exit_can_release(&u.vehicle_type));
                assert!(!reachable, "seed {seed}: slot {} left unserved", u.slot);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for seed in 0..50 {
            let (lanes, arrivals, departures) = random_night(seed);
            let a = NightPlan::run(lanes.clone(), &arrivals, &departures).unwrap();
            let b = NightPlan::run(lanes, &arrivals, &departures).unwrap();
            assert_eq!(a.parked, b.parked);
            assert_eq!(a.dispatches, b.dispatches);
            assert_eq!(a.remaining, b.remaining);
            assert_eq!(a.unplaceable, b.unplaceable);
            assert_eq!(a.unmatched, b.unmatched);
        }
    }

    #[test]
    fn test_lane_priority_plan_keeps_invariants() {
        let engine = ParkingEngine::new().with_policy(ParkingPolicy::LanePriority);
        for seed in 0..100 {
            let (lanes, arrivals, departures) = random_night(seed);
            let plan = NightPlan::run_with(&engine, lanes, &arrivals, &departures).unwrap();
            assert_eq!(
                plan.parked.parked_count() + plan.unplaceable.len(),
                arrivals.len()
            );
        }
    }
}

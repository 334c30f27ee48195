//! Parking engine.
//!
//! # Algorithm
//!
//! Arrivals are processed one at a time in arrival order, which is also the
//! priority order for contested blocks. Each vehicle goes to the first lane
//! of the highest tier that accepts its type:
//!
//! 1. Exit block of a two-block lane with room.
//! 2. Single-block lane with room.
//! 3. Entry block of a two-block lane with room.
//!
//! A vehicle no tier accepts is reported as unplaceable and the run
//! continues.
//!
//! # Complexity
//! O(a × l) where a = arrivals, l = lanes.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{Occupancy, Tier};
use crate::models::{Lane, LaneSide, VehicleId};

/// How tiers and lanes are combined when searching for a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParkingPolicy {
    /// Scan every lane for tier 1, then every lane for tier 2, then tier 3.
    #[default]
    GlobalPriority,
    /// Scan lanes once, taking the first lane that accepts the vehicle in
    /// any tier. Reproduces schedules produced before global priority was
    /// adopted.
    LanePriority,
}

/// An arrival no lane could take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnplaceableArrival {
    /// Position in the arrival sequence.
    pub position: usize,
    /// The vehicle.
    pub vehicle: VehicleId,
}

/// Result of a parking pass.
#[derive(Debug, Clone, Serialize)]
pub struct ParkingOutcome {
    /// Lanes with their occupants.
    pub occupancy: Occupancy,
    /// Arrivals that were not parked, in arrival order.
    pub unplaceable: Vec<UnplaceableArrival>,
}

impl ParkingOutcome {
    /// Whether every arrival was parked.
    pub fn is_complete(&self) -> bool {
        self.unplaceable.is_empty()
    }

    /// Lane ordinal and block of a parked vehicle.
    pub fn placement_of(&self, vehicle: &VehicleId) -> Option<(usize, LaneSide)> {
        self.occupancy.locate(vehicle)
    }
}

/// Greedy parking engine.
///
/// # Example
/// ```
/// use depot_lanes::engine::ParkingEngine;
/// use depot_lanes::models::{Lane, Pattern, VehicleId};
///
/// let lanes = vec![Lane::new(Pattern::double("A", 2, "B", 1), 0)];
/// let arrivals: Vec<VehicleId> = ["A1", "A2", "B1"]
///     .iter()
///     .map(|s| VehicleId::parse(s, 1).unwrap())
///     .collect();
///
/// let outcome = ParkingEngine::new().park(lanes, &arrivals);
/// assert!(outcome.is_complete());
/// assert_eq!(outcome.occupancy.lanes()[0].entry_occupants().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParkingEngine {
    policy: ParkingPolicy,
}

impl ParkingEngine {
    /// Creates an engine with global tier priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search policy.
    pub fn with_policy(mut self, policy: ParkingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parks `arrivals`, earliest first, into `lanes`.
    ///
    /// Lanes are scanned in list order and reported under their ordinals.
    #[instrument(
        level = "debug",
        skip_all,
        fields(lanes = lanes.len(), arrivals = arrivals.len(), policy = ?self.policy)
    )]
    pub fn park(&self, lanes: Vec<Lane>, arrivals: &[VehicleId]) -> ParkingOutcome {
        let mut occupancy = Occupancy::new(lanes);
        let mut unplaceable = Vec::new();

        for (position, vehicle) in arrivals.iter().enumerate() {
            match self.find_block(&occupancy, vehicle) {
                Some((position, tier)) => {
                    let parked = occupancy.lane_at_mut(position).map(|lane| {
                        debug!(vehicle = %vehicle, lane = lane.index, ?tier, "Parked");
                        lane.park(tier.side(), vehicle.clone())
                    });
                    debug_assert!(matches!(parked, Some(Ok(()))));
                }
                None => {
                    warn!(vehicle = %vehicle, position, "Vehicle cannot be parked in any lane");
                    unplaceable.push(UnplaceableArrival {
                        position,
                        vehicle: vehicle.clone(),
                    });
                }
            }
        }

        info!(
            parked = occupancy.parked_count(),
            unplaceable = unplaceable.len(),
            "Parking finished"
        );
        ParkingOutcome {
            occupancy,
            unplaceable,
        }
    }

    fn find_block(&self, occupancy: &Occupancy, vehicle: &VehicleId) -> Option<(usize, Tier)> {
        let vehicle_type = vehicle.vehicle_type();
        match self.policy {
            ParkingPolicy::GlobalPriority => {
                occupancy.first_eligible(|tier, lane| tier.can_park(lane, vehicle_type))
            }
            ParkingPolicy::LanePriority => {
                occupancy.lanes().iter().enumerate().find_map(|(i, lane)| {
                    Tier::ALL
                        .iter()
                        .find(|tier| tier.can_park(lane, vehicle_type))
                        .map(|&tier| (i, tier))
                })
            }
        }
    }
}

/// Parks `arrivals`, earliest first, into `lanes` with global tier priority.
pub fn park(lanes: Vec<Lane>, arrivals: &[VehicleId]) -> ParkingOutcome {
    ParkingEngine::new().park(lanes, arrivals)
}

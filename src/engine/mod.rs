//! Lane assignment engine.
//!
//! Places a night's arriving vehicles into lane blocks ([`park`]) and then
//! matches the next morning's scheduled departures against the parked
//! vehicles ([`dispatch`]). Both passes are deterministic greedy scans over
//! the fixed lane order; neither aborts when an item cannot be placed.
//!
//! # Priority tiers
//!
//! Both engines try three tiers in strict order, each a full scan of the
//! lane list:
//!
//! | Tier | Parking | Dispatching |
//! |------|---------|-------------|
//! | 1 | Two-block exit with room | Two-block exit holding the type |
//! | 2 | Single-block with room | Single-block holding the type |
//! | 3 | Two-block entry with room | Two-block entry, exit block empty |
//!
//! Within a tier the first lane in list order wins.
//!
//! # Lane identity
//!
//! Lanes are identified by their ordinal ([`Lane::index`]), not by their
//! position in the list. Placements and dispatch records are reported under
//! that ordinal, so ordinals must be unique within a night;
//! [`validate_lanes`](crate::validation::validate_lanes) checks this.
//!
//! # Ownership
//!
//! [`Occupancy`] is the only holder of live lane state. `park` returns it
//! and `dispatch` consumes it, so there is exactly one writer at a time.
//! Independent nights need independent lane lists.

mod dispatching;
mod kpi;
mod parking;
mod plan;

pub use dispatching::{dispatch, DispatchOutcome, DispatchRecord, UnmatchedDeparture};
pub use kpi::PlanKpi;
pub use parking::{park, ParkingEngine, ParkingOutcome, ParkingPolicy, UnplaceableArrival};
pub use plan::NightPlan;

use serde::Serialize;

use crate::models::{Lane, LaneSide, VehicleId, VehicleType};

/// One of the three placement/removal tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    /// Exit block of a two-block lane.
    TwoBlockExit,
    /// The only block of a single-block lane.
    SingleBlock,
    /// Entry block of a two-block lane.
    TwoBlockEntry,
}

impl Tier {
    /// Tiers in priority order.
    pub const ALL: [Tier; 3] = [Tier::TwoBlockExit, Tier::SingleBlock, Tier::TwoBlockEntry];

    /// The lane block this tier addresses.
    #[inline]
    pub fn side(self) -> LaneSide {
        match self {
            Tier::TwoBlockExit | Tier::SingleBlock => LaneSide::Exit,
            Tier::TwoBlockEntry => LaneSide::Entry,
        }
    }

    /// Whether `lane` is structurally part of this tier.
    #[inline]
    fn covers(self, lane: &Lane) -> bool {
        match self {
            Tier::SingleBlock => lane.is_single_block(),
            Tier::TwoBlockExit | Tier::TwoBlockEntry => !lane.is_single_block(),
        }
    }

    /// Whether `lane` can take a vehicle of `vehicle_type` in this tier.
    pub fn can_park(self, lane: &Lane, vehicle_type: &VehicleType) -> bool {
        self.covers(lane)
            && match self.side() {
                LaneSide::Exit => lane.exit_accepts(vehicle_type),
                LaneSide::Entry => lane.entry_accepts(vehicle_type),
            }
    }

    /// Whether `lane` can release a vehicle of `vehicle_type` in this tier.
    pub fn can_dispatch(self, lane: &Lane, vehicle_type: &VehicleType) -> bool {
        self.covers(lane)
            && match self.side() {
                LaneSide::Exit => lane.exit_can_release(vehicle_type),
                LaneSide::Entry => lane.entry_can_release(vehicle_type),
            }
    }
}

/// Live lane state for one operating night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    lanes: Vec<Lane>,
}

impl Occupancy {
    /// Takes ownership of a lane list, in its given order.
    pub fn new(lanes: Vec<Lane>) -> Self {
        Self { lanes }
    }

    /// Lanes in list order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Looks up a lane by its ordinal.
    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.index == index)
    }

    /// Position in the list of the lane with ordinal `index`.
    pub fn position(&self, index: usize) -> Option<usize> {
        self.lanes.iter().position(|l| l.index == index)
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether there are no lanes.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Vehicles currently parked.
    pub fn parked_count(&self) -> usize {
        self.lanes.iter().map(Lane::occupied).sum()
    }

    /// Total vehicles all lanes hold.
    pub fn total_capacity(&self) -> usize {
        self.lanes.iter().map(Lane::total_capacity).sum()
    }

    /// Lanes holding at least one vehicle.
    pub fn lanes_in_use(&self) -> usize {
        self.lanes.iter().filter(|l| !l.is_empty()).count()
    }

    /// Finds where a vehicle is parked: lane ordinal and block.
    pub fn locate(&self, vehicle: &VehicleId) -> Option<(usize, LaneSide)> {
        self.lanes.iter().find_map(|lane| {
            if lane.exit_occupants().contains(vehicle) {
                Some((lane.index, LaneSide::Exit))
            } else if lane.entry_occupants().contains(vehicle) {
                Some((lane.index, LaneSide::Entry))
            } else {
                None
            }
        })
    }

    /// Releases the lane list.
    pub fn into_lanes(self) -> Vec<Lane> {
        self.lanes
    }

    /// First lane position, in tier order, matching `eligible`.
    fn first_eligible<F>(&self, eligible: F) -> Option<(usize, Tier)>
    where
        F: Fn(Tier, &Lane) -> bool,
    {
        Tier::ALL.iter().find_map(|&tier| {
            self.lanes
                .iter()
                .position(|lane| eligible(tier, lane))
                .map(|i| (i, tier))
        })
    }

    fn lane_at_mut(&mut self, position: usize) -> Option<&mut Lane> {
        self.lanes.get_mut(position)
    }
}

impl From<Vec<Lane>> for Occupancy {
    fn from(lanes: Vec<Lane>) -> Self {
        Self::new(lanes)
    }
}

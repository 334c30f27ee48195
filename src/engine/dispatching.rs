//! Dispatching engine.
//!
//! # Algorithm
//!
//! Scheduled departures are processed in departure order. Each names only a
//! vehicle type: any parked vehicle of that type can drive it. The vehicle
//! is taken from the first lane of the highest tier holding one:
//!
//! 1. Front of a two-block lane's exit block.
//! 2. Front of a single-block lane.
//! 3. Front of a two-block lane's entry block, only once its exit block is
//!    empty.
//!
//! Within a block vehicles leave oldest first, so the vehicle that drives a
//! departure may not be the one the timetable nominally pairs with it
//! (vehicle rotation). A departure no tier can serve is reported as
//! unmatched and the run continues.
//!
//! # Complexity
//! O(d × l) where d = departures, l = lanes.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{Occupancy, Tier};
use crate::models::{LaneSide, VehicleId, VehicleType};

/// A departure served by a parked vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
    /// Position in the departure sequence.
    pub slot: usize,
    /// The vehicle that leaves.
    pub vehicle: VehicleId,
    /// Tier the vehicle was taken from.
    pub tier: Tier,
}

impl DispatchRecord {
    /// Block the vehicle left from.
    #[inline]
    pub fn side(&self) -> LaneSide {
        self.tier.side()
    }
}

/// A departure no parked vehicle could serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedDeparture {
    /// Position in the departure sequence.
    pub slot: usize,
    /// Requested type.
    pub vehicle_type: VehicleType,
}

/// Result of a dispatching pass.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    /// Departures served per lane ordinal, in departure order. Lanes that
    /// served nothing have no entry.
    pub dispatches: BTreeMap<usize, Vec<DispatchRecord>>,
    /// Lanes with the vehicles that did not leave.
    pub remaining: Occupancy,
    /// Departures that were not served, in departure order.
    pub unmatched: Vec<UnmatchedDeparture>,
}

impl DispatchOutcome {
    /// Departures served from the lane with ordinal `lane_index`.
    pub fn dispatches_for(&self, lane_index: usize) -> &[DispatchRecord] {
        self.dispatches
            .get(&lane_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of departures served.
    pub fn dispatched_count(&self) -> usize {
        self.dispatches.values().map(Vec::len).sum()
    }

    /// Whether every departure was served.
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// All served departures ordered by departure slot, with their lane
    /// ordinal.
    pub fn in_departure_order(&self) -> Vec<(usize, &DispatchRecord)> {
        let mut all: Vec<(usize, &DispatchRecord)> = self
            .dispatches
            .iter()
            .flat_map(|(&lane, records)| records.iter().map(move |r| (lane, r)))
            .collect();
        all.sort_by_key(|(_, r)| r.slot);
        all
    }
}

/// Serves `departures`, earliest first, from the vehicles in `occupancy`.
///
/// Takes the occupancy by value; the vehicles that remain parked are
/// returned in [`DispatchOutcome::remaining`].
///
/// # Example
/// ```
/// use depot_lanes::engine::{dispatch, park};
/// use depot_lanes::models::{Lane, Pattern, VehicleId, VehicleType};
///
/// let lanes = vec![Lane::new(Pattern::single("D", 1), 0)];
/// let parked = park(lanes, &[VehicleId::parse("D1", 1).unwrap()]);
///
/// let d = VehicleType::new("D");
/// let outcome = dispatch(parked.occupancy, &[d.clone(), d]);
/// assert_eq!(outcome.dispatches_for(0)[0].vehicle.as_str(), "D1");
/// assert_eq!(outcome.unmatched.len(), 1);
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(lanes = occupancy.len(), departures = departures.len())
)]
pub fn dispatch(mut occupancy: Occupancy, departures: &[VehicleType]) -> DispatchOutcome {
    let mut dispatches: BTreeMap<usize, Vec<DispatchRecord>> = BTreeMap::new();
    let mut unmatched = Vec::new();

    for (slot, vehicle_type) in departures.iter().enumerate() {
        let released = occupancy
            .first_eligible(|tier, lane| tier.can_dispatch(lane, vehicle_type))
            .and_then(|(position, tier)| {
                let lane = occupancy.lane_at_mut(position)?;
                let index = lane.index;
                lane.release(tier.side(), vehicle_type)
                    .map(|vehicle| (index, tier, vehicle))
            });

        match released {
            Some((lane, tier, vehicle)) => {
                debug!(slot, vehicle = %vehicle, lane, ?tier, "Dispatched");
                dispatches.entry(lane).or_default().push(DispatchRecord {
                    slot,
                    vehicle,
                    tier,
                });
            }
            None => {
                warn!(slot, vehicle_type = %vehicle_type, "No parked vehicle for departure");
                unmatched.push(UnmatchedDeparture {
                    slot,
                    vehicle_type: vehicle_type.clone(),
                });
            }
        }
    }

    let outcome = DispatchOutcome {
        dispatches,
        remaining: occupancy,
        unmatched,
    };
    info!(
        dispatched = outcome.dispatched_count(),
        unmatched = outcome.unmatched.len(),
        left_parked = outcome.remaining.parked_count(),
        "Dispatching finished"
    );
    outcome
}

//! Lane model.
//!
//! A lane is one instantiated pattern plus the vehicles currently parked in
//! it. Both blocks are FIFO queues: vehicles are appended at the back when
//! parked and leave from the front when dispatched.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::{Pattern, VehicleId, VehicleType};

/// Which block of a lane a vehicle occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneSide {
    /// The block at the depot exit.
    Exit,
    /// The block behind the exit block.
    Entry,
}

/// A physical parking lane.
///
/// Occupants are only changed through [`Lane::park`] and [`Lane::release`],
/// which keep each block within its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    /// Lane ordinal, the lane's identity in every engine output.
    pub index: usize,
    /// Index of the catalogue pattern this lane was instantiated from.
    /// Zero unless set with [`Lane::with_pattern_index`].
    pub pattern_index: usize,
    pattern: Pattern,
    exit_occupants: VecDeque<VehicleId>,
    entry_occupants: VecDeque<VehicleId>,
}

impl Lane {
    /// Creates an empty lane with ordinal `index`.
    pub fn new(pattern: Pattern, index: usize) -> Self {
        Self {
            index,
            pattern_index: 0,
            pattern,
            exit_occupants: VecDeque::new(),
            entry_occupants: VecDeque::new(),
        }
    }

    /// Sets the originating catalogue pattern index.
    pub fn with_pattern_index(mut self, pattern_index: usize) -> Self {
        self.pattern_index = pattern_index;
        self
    }

    /// The lane template.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Whether the lane has a single block.
    #[inline]
    pub fn is_single_block(&self) -> bool {
        self.pattern.is_single_block()
    }

    /// Type accepted by the exit block.
    #[inline]
    pub fn exit_type(&self) -> &VehicleType {
        &self.pattern.exit().vehicle_type
    }

    /// Capacity of the exit block.
    #[inline]
    pub fn exit_capacity(&self) -> usize {
        self.pattern.exit().capacity
    }

    /// Type accepted by the entry block (`None` for single-block lanes).
    #[inline]
    pub fn entry_type(&self) -> Option<&VehicleType> {
        self.pattern.entry().map(|s| &s.vehicle_type)
    }

    /// Capacity of the entry block (0 for single-block lanes).
    #[inline]
    pub fn entry_capacity(&self) -> usize {
        self.pattern.entry().map_or(0, |s| s.capacity)
    }

    /// Total vehicles the lane holds.
    pub fn total_capacity(&self) -> usize {
        self.pattern.total_capacity()
    }

    /// Whether this is a one-vehicle outside spot.
    pub fn is_outside_spot(&self) -> bool {
        self.total_capacity() == 1
    }

    /// Vehicles in the exit block, oldest first.
    pub fn exit_occupants(&self) -> &VecDeque<VehicleId> {
        &self.exit_occupants
    }

    /// Vehicles in the entry block, oldest first.
    pub fn entry_occupants(&self) -> &VecDeque<VehicleId> {
        &self.entry_occupants
    }

    /// Number of vehicles parked in the lane.
    pub fn occupied(&self) -> usize {
        self.exit_occupants.len() + self.entry_occupants.len()
    }

    /// Whether the lane holds no vehicles.
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Whether the exit block accepts another vehicle of `vehicle_type`.
    pub fn exit_accepts(&self, vehicle_type: &VehicleType) -> bool {
        self.exit_type() == vehicle_type && self.exit_occupants.len() < self.exit_capacity()
    }

    /// Whether the entry block accepts another vehicle of `vehicle_type`.
    pub fn entry_accepts(&self, vehicle_type: &VehicleType) -> bool {
        self.entry_type() == Some(vehicle_type)
            && self.entry_occupants.len() < self.entry_capacity()
    }

    /// Whether a vehicle of `vehicle_type` can leave from the exit block.
    pub fn exit_can_release(&self, vehicle_type: &VehicleType) -> bool {
        self.exit_type() == vehicle_type && !self.exit_occupants.is_empty()
    }

    /// Whether a vehicle of `vehicle_type` can leave from the entry block.
    ///
    /// Entry vehicles are blocked until the exit block is empty.
    pub fn entry_can_release(&self, vehicle_type: &VehicleType) -> bool {
        self.exit_occupants.is_empty()
            && self.entry_type() == Some(vehicle_type)
            && !self.entry_occupants.is_empty()
    }

    /// Parks a vehicle at the back of a block.
    ///
    /// Returns the vehicle back if the block does not accept it.
    pub fn park(&mut self, side: LaneSide, vehicle: VehicleId) -> Result<(), VehicleId> {
        let accepted = match side {
            LaneSide::Exit => self.exit_accepts(vehicle.vehicle_type()),
            LaneSide::Entry => self.entry_accepts(vehicle.vehicle_type()),
        };
        if !accepted {
            return Err(vehicle);
        }
        match side {
            LaneSide::Exit => self.exit_occupants.push_back(vehicle),
            LaneSide::Entry => self.entry_occupants.push_back(vehicle),
        }
        Ok(())
    }

    /// Removes the oldest vehicle of `vehicle_type` from a block.
    ///
    /// Returns `None` if that block cannot release such a vehicle.
    pub fn release(&mut self, side: LaneSide, vehicle_type: &VehicleType) -> Option<VehicleId> {
        match side {
            LaneSide::Exit if self.exit_can_release(vehicle_type) => {
                self.exit_occupants.pop_front()
            }
            LaneSide::Entry if self.entry_can_release(vehicle_type) => {
                self.entry_occupants.pop_front()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lane {} {} ({}/{})",
            self.index,
            self.pattern,
            self.occupied(),
            self.total_capacity()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> VehicleId {
        VehicleId::parse(raw, 1).unwrap()
    }

    #[test]
    fn test_derived_fields_double() {
        let lane = Lane::new(Pattern::double("A", 2, "B", 1), 0);
        assert!(!lane.is_single_block());
        assert_eq!(lane.exit_type().as_str(), "A");
        assert_eq!(lane.exit_capacity(), 2);
        assert_eq!(lane.entry_type().map(|t| t.as_str()), Some("B"));
        assert_eq!(lane.entry_capacity(), 1);
        assert_eq!(lane.total_capacity(), 3);
        assert!(!lane.is_outside_spot());
    }

    #[test]
    fn test_pattern_index_defaults_to_zero() {
        let lane = Lane::new(Pattern::single("D", 1), 5);
        assert_eq!(lane.index, 5);
        assert_eq!(lane.pattern_index, 0);
    }

    #[test]
    fn test_derived_fields_single() {
        let lane = Lane::new(Pattern::single("D", 1), 4).with_pattern_index(2);
        assert!(lane.is_single_block());
        assert!(lane.entry_type().is_none());
        assert_eq!(lane.entry_capacity(), 0);
        assert!(lane.is_outside_spot());
        assert_eq!(lane.index, 4);
        assert_eq!(lane.pattern_index, 2);
    }

    #[test]
    fn test_park_respects_capacity_and_type() {
        let mut lane = Lane::new(Pattern::double("A", 1, "B", 1), 0);
        assert!(lane.park(LaneSide::Exit, id("A1")).is_ok());
        assert_eq!(lane.park(LaneSide::Exit, id("A2")), Err(id("A2")));
        assert_eq!(lane.park(LaneSide::Entry, id("A2")), Err(id("A2")));
        assert!(lane.park(LaneSide::Entry, id("B1")).is_ok());
        assert_eq!(lane.occupied(), 2);
    }

    #[test]
    fn test_single_block_has_no_entry() {
        let mut lane = Lane::new(Pattern::single("D", 2), 0);
        assert!(lane.park(LaneSide::Entry, id("D1")).is_err());
        assert!(lane.entry_occupants().is_empty());
    }

    #[test]
    fn test_release_fifo_and_entry_blocked() {
        let mut lane = Lane::new(Pattern::double("A", 2, "B", 1), 0);
        lane.park(LaneSide::Exit, id("A1")).unwrap();
        lane.park(LaneSide::Exit, id("A2")).unwrap();
        lane.park(LaneSide::Entry, id("B1")).unwrap();

        let b = VehicleType::new("B");
        let a = VehicleType::new("A");
        assert!(!lane.entry_can_release(&b));
        assert_eq!(lane.release(LaneSide::Entry, &b), None);

        assert_eq!(lane.release(LaneSide::Exit, &a), Some(id("A1")));
        assert_eq!(lane.release(LaneSide::Exit, &a), Some(id("A2")));
        assert_eq!(lane.release(LaneSide::Exit, &a), None);
        assert_eq!(lane.release(LaneSide::Entry, &b), Some(id("B1")));
        assert!(lane.is_empty());
    }

    #[test]
    fn test_display() {
        let lane = Lane::new(Pattern::single("D", 1), 3);
        assert_eq!(lane.to_string(), "Lane 3 [D×1] (0/1)");
    }
}

//! Lane patterns.
//!
//! A pattern is the type/capacity template a lane is instantiated from.
//! Single-block patterns have one slot. Two-block patterns have an *exit*
//! slot (at the depot exit, filled and emptied first) and an *entry* slot
//! behind it.
//!
//! Patterns come from the external pattern oracle as a catalogue of
//! `(pattern, instances)` entries. On the wire a pattern is a JSON array of
//! one or two slots, exit first.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::VehicleType;

/// One capacity-bounded sub-position of a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Vehicle type the slot accepts.
    pub vehicle_type: VehicleType,
    /// Number of vehicles the slot holds.
    pub capacity: usize,
}

impl Slot {
    /// Creates a slot.
    pub fn new(vehicle_type: impl Into<VehicleType>, capacity: usize) -> Self {
        Self {
            vehicle_type: vehicle_type.into(),
            capacity,
        }
    }
}

/// Structural template of a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slot>", into = "Vec<Slot>")]
pub enum Pattern {
    /// A lane with a single block.
    Single(Slot),
    /// A lane with an exit block in front of an entry block.
    Double {
        /// Block at the depot exit.
        exit: Slot,
        /// Block behind the exit block.
        entry: Slot,
    },
}

/// A slot list that does not describe a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// Number of slots supplied.
    pub slots: usize,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a pattern has one or two slots, got {}", self.slots)
    }
}

impl std::error::Error for PatternError {}

impl Pattern {
    /// Creates a single-block pattern.
    pub fn single(vehicle_type: impl Into<VehicleType>, capacity: usize) -> Self {
        Self::Single(Slot::new(vehicle_type, capacity))
    }

    /// Creates a two-block pattern.
    pub fn double(
        exit_type: impl Into<VehicleType>,
        exit_capacity: usize,
        entry_type: impl Into<VehicleType>,
        entry_capacity: usize,
    ) -> Self {
        Self::Double {
            exit: Slot::new(exit_type, exit_capacity),
            entry: Slot::new(entry_type, entry_capacity),
        }
    }

    /// Builds a pattern from an exit-first slot list.
    pub fn from_slots(slots: Vec<Slot>) -> Result<Self, PatternError> {
        let n = slots.len();
        let mut iter = slots.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(exit), None, None) => Ok(Self::Single(exit)),
            (Some(exit), Some(entry), None) => Ok(Self::Double { exit, entry }),
            _ => Err(PatternError { slots: n }),
        }
    }

    /// Exit-first slot list.
    pub fn slots(&self) -> Vec<&Slot> {
        match self {
            Self::Single(exit) => vec![exit],
            Self::Double { exit, entry } => vec![exit, entry],
        }
    }

    /// Whether this is a single-block pattern.
    #[inline]
    pub fn is_single_block(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// The exit slot.
    #[inline]
    pub fn exit(&self) -> &Slot {
        match self {
            Self::Single(exit) | Self::Double { exit, .. } => exit,
        }
    }

    /// The entry slot, if any.
    #[inline]
    pub fn entry(&self) -> Option<&Slot> {
        match self {
            Self::Single(_) => None,
            Self::Double { entry, .. } => Some(entry),
        }
    }

    /// Total vehicles the pattern holds.
    pub fn total_capacity(&self) -> usize {
        self.exit().capacity + self.entry().map_or(0, |s| s.capacity)
    }
}

impl TryFrom<Vec<Slot>> for Pattern {
    type Error = PatternError;

    fn try_from(slots: Vec<Slot>) -> Result<Self, Self::Error> {
        Self::from_slots(slots)
    }
}

impl From<Pattern> for Vec<Slot> {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Single(exit) => vec![exit],
            Pattern::Double { exit, entry } => vec![exit, entry],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(exit) => write!(f, "[{}×{}]", exit.vehicle_type, exit.capacity),
            Self::Double { exit, entry } => write!(
                f,
                "[{}×{} | {}×{}]",
                exit.vehicle_type, exit.capacity, entry.vehicle_type, entry.capacity
            ),
        }
    }
}

/// One catalogue entry: a pattern and how many lanes to instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInstance {
    /// The lane template.
    pub pattern: Pattern,
    /// Number of lanes using this template.
    pub instances: usize,
}

/// Ordered pattern catalogue produced by the pattern oracle.
///
/// The position of an entry is its pattern index. Lane order, and with it
/// every tie-break in the engine, follows catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternCatalogue {
    entries: Vec<PatternInstance>,
}

impl PatternCatalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instances` lanes of `pattern`.
    pub fn with_pattern(mut self, pattern: Pattern, instances: usize) -> Self {
        self.entries.push(PatternInstance { pattern, instances });
        self
    }

    /// Parses a catalogue from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Catalogue entries in oracle order.
    pub fn entries(&self) -> &[PatternInstance] {
        &self.entries
    }

    /// Total number of lanes the catalogue instantiates.
    pub fn lane_count(&self) -> usize {
        self.entries.iter().map(|e| e.instances).sum()
    }
}

//! Input validation for a night's lane assignment.
//!
//! Checks the pattern catalogue and the arrival sequence before any vehicle
//! is parked. Detects:
//! - Zero-capacity slots
//! - Slots of a type the fleet does not operate
//! - Patterns longer than a physical lane
//! - More physical lanes than the depot has
//! - Lanes sharing an ordinal
//! - Vehicles arriving twice
//!
//! A lane that fails these checks would let the engine silently break its
//! capacity contract, so every problem here is fatal for the run.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument, warn};

use crate::config::DepotConfig;
use crate::models::{Lane, PatternCatalogue, TypeCatalogue, VehicleId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A pattern slot holds no vehicles.
    ZeroCapacity,
    /// A pattern slot references a type that is not operated.
    UnknownVehicleType,
    /// A pattern holds more vehicles than a physical lane.
    LaneTooLong,
    /// The catalogue instantiates more physical lanes than the depot has.
    TooManyLanes,
    /// Two lanes share an ordinal.
    DuplicateLane,
    /// A vehicle appears twice in the arrival sequence.
    DuplicateArrival,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a pattern catalogue against the fleet and the depot.
///
/// Checks:
/// 1. Every slot has capacity ≥ 1
/// 2. Every slot type is operated under its own code (known, not aliased)
/// 3. No pattern exceeds `config.lane_capacity`
/// 4. Lanes that are not outside spots fit in `config.lane_count`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalogue(
    catalogue: &PatternCatalogue,
    types: &TypeCatalogue,
    config: &DepotConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut physical_lanes = 0;

    for (i, entry) in catalogue.entries().iter().enumerate() {
        let pattern = &entry.pattern;

        for slot in pattern.slots() {
            if slot.capacity == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ZeroCapacity,
                    format!("Pattern {i} {pattern} has a zero-capacity slot"),
                ));
            }
            if !types.contains(&slot.vehicle_type) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownVehicleType,
                    format!(
                        "Pattern {i} references unknown vehicle type '{}'",
                        slot.vehicle_type
                    ),
                ));
            } else if types.resolve(&slot.vehicle_type) != &slot.vehicle_type {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownVehicleType,
                    format!(
                        "Pattern {i} references vehicle type '{}', which is operated as '{}'",
                        slot.vehicle_type,
                        types.resolve(&slot.vehicle_type)
                    ),
                ));
            }
        }

        let total = pattern.total_capacity();
        if total > config.lane_capacity {
            errors.push(ValidationError::new(
                ValidationErrorKind::LaneTooLong,
                format!(
                    "Pattern {i} {pattern} holds {total} vehicles, lanes hold {}",
                    config.lane_capacity
                ),
            ));
        }
        if total > 1 {
            physical_lanes += entry.instances;
        }
    }

    if physical_lanes > config.lane_count {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooManyLanes,
            format!(
                "Catalogue instantiates {physical_lanes} lanes, depot has {}",
                config.lane_count
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a lane list the engine is about to run on.
///
/// Checks that every block holds at least one vehicle and that no two lanes
/// share an ordinal. Lanes from [`build_lanes`] always pass.
pub fn validate_lanes(lanes: &[Lane]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for lane in lanes {
        if lane.pattern().slots().iter().any(|s| s.capacity == 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Lane {} {} has a zero-capacity block", lane.index, lane.pattern()),
            ));
        }
        if !seen.insert(lane.index) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateLane,
                format!("Lane ordinal {} is used more than once", lane.index),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that no vehicle arrives twice.
pub fn validate_arrivals(arrivals: &[VehicleId]) -> ValidationResult {
    let mut seen = HashSet::new();
    let errors: Vec<ValidationError> = arrivals
        .iter()
        .filter(|v| !seen.insert(v.as_str()))
        .map(|v| {
            ValidationError::new(
                ValidationErrorKind::DuplicateArrival,
                format!("Vehicle '{v}' arrives more than once"),
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a catalogue and instantiates its lanes.
///
/// Entries are expanded in catalogue order, each `instances` times. A lane's
/// ordinal is its position in the returned list; its pattern index is the
/// position of its catalogue entry.
#[instrument(level = "debug", skip_all, fields(patterns = catalogue.entries().len()))]
pub fn build_lanes(
    catalogue: &PatternCatalogue,
    types: &TypeCatalogue,
    config: &DepotConfig,
) -> Result<Vec<Lane>, Vec<ValidationError>> {
    if let Err(errors) = validate_catalogue(catalogue, types, config) {
        for e in &errors {
            warn!(kind = ?e.kind, "{}", e.message);
        }
        return Err(errors);
    }

    let mut lanes = Vec::with_capacity(catalogue.lane_count());
    for (pattern_index, entry) in catalogue.entries().iter().enumerate() {
        for _ in 0..entry.instances {
            let index = lanes.len();
            lanes.push(Lane::new(entry.pattern.clone(), index).with_pattern_index(pattern_index));
        }
    }
    debug!(lanes = lanes.len(), "Built lane list");
    Ok(lanes)
}

//! Overnight lane assignment for a bus depot.
//!
//! Assigns arriving buses to physical depot lanes and matches the next
//! morning's scheduled departures to parked buses of the right type.
//! Lanes come from an external pattern oracle; timetable consolidation and
//! output labelling live outside this crate.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `VehicleType`, `VehicleId`, `TypeCatalogue`,
//!   `Slot`, `Pattern`, `PatternCatalogue`, `Lane`
//! - **`engine`**: Greedy parking and dispatching, `NightPlan`, `PlanKpi`
//! - **`validation`**: Lane-list and arrival checks (zero capacities, unknown
//!   types, oversized patterns, duplicate arrivals)
//! - **`config`**: Physical depot parameters
//!
//! # Example
//!
//! ```
//! use depot_lanes::config::DepotConfig;
//! use depot_lanes::engine::{NightPlan, PlanKpi};
//! use depot_lanes::models::{Pattern, PatternCatalogue, TypeCatalogue};
//!
//! let types = TypeCatalogue::standard();
//! let catalogue = PatternCatalogue::new()
//!     .with_pattern(Pattern::double("SMV", 4, "STV", 2), 1)
//!     .with_pattern(Pattern::single("STS", 1), 1);
//!
//! let (arrivals, _skipped) = types.filter_known(["SMV701", "STV502", "STS301"]);
//! let departures = vec![
//!     types.parse_type("STS").unwrap(),
//!     types.parse_type("SMV").unwrap(),
//!     types.parse_type("STV").unwrap(),
//! ];
//!
//! let plan = NightPlan::from_catalogue(
//!     &catalogue,
//!     &types,
//!     &DepotConfig::default(),
//!     &arrivals,
//!     &departures,
//! )
//! .unwrap();
//! assert!(PlanKpi::calculate(&plan).is_complete());
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod validation;

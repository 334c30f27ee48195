//! Depot domain models.
//!
//! Provides the data types shared by the parking and dispatching engines:
//! vehicle identity and type, lane patterns as emitted by the pattern
//! oracle, and lanes with their live occupants.
//!
//! # Domain Mappings
//!
//! | depot-lanes | Depot operations |
//! |-------------|------------------|
//! | VehicleType | Bus class (fuel × chassis × livery) |
//! | VehicleId | Fleet number (`DMV429`) |
//! | Pattern | Lane layout template |
//! | Lane | Physical parking lane or outside spot |

mod lane;
mod pattern;
mod vehicle;

pub use lane::{Lane, LaneSide};
pub use pattern::{Pattern, PatternCatalogue, PatternError, PatternInstance, Slot};
pub use vehicle::{
    TypeCatalogue, VehicleClass, VehicleId, VehicleIdError, VehicleType, DEFAULT_TYPE_PREFIX_LEN,
};

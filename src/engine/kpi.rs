//! Night plan quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill Rate | Parked vehicles / total lane capacity |
//! | Lanes Used | Lanes holding at least one vehicle after parking |
//! | Exit / Entry Dispatches | Departures served from each block |
//! | Left Parked | Vehicles still in the depot after the last departure |

use serde::Serialize;

use super::NightPlan;
use crate::models::LaneSide;

/// Night plan performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanKpi {
    /// Number of lanes in the plan.
    pub lane_count: usize,
    /// Lanes holding at least one vehicle after parking.
    pub lanes_used: usize,
    /// Vehicles parked.
    pub parked: usize,
    /// Arrivals that could not be parked.
    pub unplaceable: usize,
    /// Parked vehicles / total lane capacity (0.0..1.0).
    pub fill_rate: f64,
    /// Departures served.
    pub dispatched: usize,
    /// Departures served from exit blocks (including single-block lanes).
    pub exit_dispatches: usize,
    /// Departures served from entry blocks.
    pub entry_dispatches: usize,
    /// Departures that could not be served.
    pub unmatched: usize,
    /// Vehicles left parked after the last departure.
    pub left_parked: usize,
}

impl PlanKpi {
    /// Computes KPIs from a finished night plan.
    pub fn calculate(plan: &NightPlan) -> Self {
        let capacity = plan.parked.total_capacity();
        let parked = plan.parked.parked_count();
        let fill_rate = if capacity == 0 {
            0.0
        } else {
            parked as f64 / capacity as f64
        };

        let (exit_dispatches, entry_dispatches) = plan
            .dispatches
            .values()
            .flatten()
            .fold((0, 0), |(exit, entry), r| match r.side() {
                LaneSide::Exit => (exit + 1, entry),
                LaneSide::Entry => (exit, entry + 1),
            });

        Self {
            lane_count: plan.parked.len(),
            lanes_used: plan.parked.lanes_in_use(),
            parked,
            unplaceable: plan.unplaceable.len(),
            fill_rate,
            dispatched: exit_dispatches + entry_dispatches,
            exit_dispatches,
            entry_dispatches,
            unmatched: plan.unmatched.len(),
            left_parked: plan.remaining.parked_count(),
        }
    }

    /// Whether nothing was left unplaced or unserved.
    pub fn is_complete(&self) -> bool {
        self.unplaceable == 0 && self.unmatched == 0
    }
}

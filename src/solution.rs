//! The result of planning: an objective value, a status, the decisions and summary metrics.
use crate::parameter_set::Dimensions;
use crate::trajectory::DecisionTrajectory;
use serde::Serialize;
use serde_string_enum::SerializeLabeledStringEnum;

/// Whether planning completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum)]
pub enum SolutionStatus {
    /// A complete plan was produced
    #[string = "optimal"]
    Optimal,
    /// Planning failed and the plan is all zeros
    #[string = "error"]
    Error,
}

/// Summary statistics for a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Emissions over all facilities and periods
    pub total_emissions: f64,
    /// Unmet demand over all facilities and periods
    pub total_unmet: f64,
    /// Cost in each period, summed over facilities.
    ///
    /// NB: Investment costs are not included here, though they are included in the objective.
    pub total_costs: Vec<f64>,
    /// Free allocations over all facilities and periods
    pub total_allocations: f64,
    /// Free allocations minus emissions (positive means a surplus)
    pub market_balance: f64,
    /// Population standard deviation of the carbon prices faced by every facility in every period
    pub price_volatility: f64,
}

impl Metrics {
    /// Metrics in which every value is zero
    pub fn zeroed(periods: usize) -> Self {
        Self {
            total_emissions: 0.0,
            total_unmet: 0.0,
            total_costs: vec![0.0; periods],
            total_allocations: 0.0,
            market_balance: 0.0,
            price_volatility: 0.0,
        }
    }
}

/// A plan for one or more facilities
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Total cost of the plan
    pub objective: f64,
    /// Whether planning completed
    pub status: SolutionStatus,
    /// The decisions for every facility, technology and period
    pub trajectory: DecisionTrajectory,
    /// Summary statistics
    pub metrics: Metrics,
    /// The plan for each individual facility (multi-facility mode only)
    pub facility_solutions: Option<Vec<Solution>>,
}

impl Solution {
    /// The solution returned when planning fails: zero objective, zero decisions and zero metrics
    pub fn degraded(dimensions: Dimensions) -> Self {
        Self {
            objective: 0.0,
            status: SolutionStatus::Error,
            trajectory: DecisionTrajectory::zeroed(dimensions),
            metrics: Metrics::zeroed(dimensions.periods),
            facility_solutions: None,
        }
    }

    /// Whether planning completed successfully
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

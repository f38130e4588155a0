//! The planning engine.
//!
//! [`solve`] is the single entry point. It never returns an error: any failure while planning is
//! logged and turned into a degraded [`Solution`] with [`SolutionStatus::Error`], so callers only
//! ever have to inspect the status.
use crate::parameter_set::{Dimensions, ParameterSet};
use crate::solution::{Metrics, Solution, SolutionStatus};
use crate::trajectory::DecisionTrajectory;
use anyhow::Result;
use log::{error, info, warn};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

pub mod allocation;
pub mod costs;
pub mod market;
pub mod scheduler;

/// How facilities are planned
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, DeserializeLabeledStringEnum, SerializeLabeledStringEnum,
)]
pub enum Mode {
    /// Plan every facility in one pass, producing a single trajectory
    #[string = "single"]
    Single,
    /// Plan each facility independently and aggregate the results
    #[string = "multi"]
    Multi,
}

/// Plan production, investment and trading for all facilities.
///
/// Facilities are planned in parallel in multi-facility mode, using as many threads as there are
/// available CPUs.
///
/// # Arguments
///
/// * `dimensions` - The number of facilities, technologies and periods
/// * `parameters` - The (validated) parameters of the problem
/// * `mode` - Whether to plan all facilities together or independently
pub fn solve(dimensions: &Dimensions, parameters: &ParameterSet, mode: Mode) -> Solution {
    solve_with_threads(dimensions, parameters, mode, 0)
}

/// Plan production, investment and trading for all facilities, using up to `num_threads` threads.
///
/// A `num_threads` of zero means use all available CPUs. The result does not depend on the number
/// of threads.
pub fn solve_with_threads(
    dimensions: &Dimensions,
    parameters: &ParameterSet,
    mode: Mode,
    num_threads: usize,
) -> Solution {
    info!("Planning {dimensions} in {mode} mode");
    let result = match mode {
        Mode::Single => {
            if dimensions.facilities != 1 {
                warn!(
                    "Single mode expects one facility, but {} were given",
                    dimensions.facilities
                );
            }
            plan(dimensions, parameters)
        }
        Mode::Multi => market::solve_market(dimensions, parameters, num_threads),
    };

    result.unwrap_or_else(|err| {
        error!("Planning failed: {err:?}");
        Solution::degraded(*dimensions)
    })
}

/// Schedule every facility into one trajectory and account for its costs
fn plan(dimensions: &Dimensions, parameters: &ParameterSet) -> Result<Solution> {
    let trajectory = scheduler::schedule(parameters, dimensions)?;
    let objective = costs::objective(&trajectory, parameters)?;
    let metrics = calculate_metrics(&trajectory, parameters)?;

    Ok(Solution {
        objective,
        status: SolutionStatus::Optimal,
        trajectory,
        metrics,
        facility_solutions: None,
    })
}

/// Calculate summary metrics for a trajectory
fn calculate_metrics(trajectory: &DecisionTrajectory, parameters: &ParameterSet) -> Result<Metrics> {
    let total_emissions = trajectory.total_emissions();
    let total_allocations = trajectory.total_allocations();

    Ok(Metrics {
        total_emissions,
        total_unmet: trajectory.total_unmet(),
        total_costs: costs::per_period_costs(trajectory, parameters)?,
        total_allocations,
        market_balance: total_allocations - total_emissions,
        price_volatility: market::price_volatility(
            parameters.iter_carbon_prices(&trajectory.dimensions()),
        ),
    })
}

//! Planning many facilities and summarising the market they form.
//!
//! Facilities do not interact: each one trades allowances at the carbon prices given in its
//! parameters, with no price discovery or matching of buyers with sellers. The "market" is purely
//! the aggregate of the individual plans.
use super::plan;
use crate::parameter_set::{Dimensions, ParameterSet};
use crate::solution::{Metrics, Solution, SolutionStatus};
use crate::trajectory::DecisionTrajectory;
use anyhow::Result;
use itertools::Itertools;
use log::{debug, error};
use serde::Serialize;
use serde_string_enum::SerializeLabeledStringEnum;
use std::num::NonZeroUsize;
use std::panic;
use std::thread;

/// Plan every facility independently and aggregate the results.
///
/// A facility which cannot be planned gets a degraded (all-zero) solution; the aggregate status is
/// then [`SolutionStatus::Error`], but the other facilities' plans are kept.
///
/// # Arguments
///
/// * `dimensions` - The number of facilities, technologies and periods
/// * `parameters` - Parameters for all facilities
/// * `num_threads` - Maximum number of threads to use (0 for all available CPUs)
pub fn solve_market(
    dimensions: &Dimensions,
    parameters: &ParameterSet,
    num_threads: usize,
) -> Result<Solution> {
    let facility_dimensions = dimensions.for_single_facility();
    let facility_solutions = map_facilities(dimensions.facilities, num_threads, |facility| {
        solve_facility(parameters, &facility_dimensions, facility)
    });

    let status = if facility_solutions.iter().all(Solution::is_optimal) {
        SolutionStatus::Optimal
    } else {
        SolutionStatus::Error
    };
    let objective = facility_solutions.iter().map(|solution| solution.objective).sum();
    let trajectory = if facility_solutions.is_empty() {
        DecisionTrajectory::zeroed(*dimensions)
    } else {
        DecisionTrajectory::merge(
            facility_solutions
                .iter()
                .map(|solution| solution.trajectory.clone()),
        )?
    };
    let metrics = merge_metrics(&facility_solutions, parameters, dimensions);

    Ok(Solution {
        objective,
        status,
        trajectory,
        metrics,
        facility_solutions: Some(facility_solutions),
    })
}

/// Plan one facility on its own
fn solve_facility(parameters: &ParameterSet, dimensions: &Dimensions, facility: usize) -> Solution {
    debug!("Planning facility {facility}");
    let result = parameters
        .facility_view(facility)
        .and_then(|view| plan(dimensions, &view));

    result.unwrap_or_else(|err| {
        error!("Planning failed for facility {facility}: {err:?}");
        Solution::degraded(*dimensions)
    })
}

/// Apply `solve` to every facility index, returning the results in facility order.
///
/// The facilities are split into contiguous chunks, one per thread.
fn map_facilities<F>(facilities: usize, num_threads: usize, solve: F) -> Vec<Solution>
where
    F: Fn(usize) -> Solution + Sync,
{
    let num_threads = if num_threads == 0 {
        thread::available_parallelism().map_or(1, NonZeroUsize::get)
    } else {
        num_threads
    }
    .min(facilities);

    if num_threads <= 1 {
        return (0..facilities).map(solve).collect();
    }

    let chunk_size = facilities.div_ceil(num_threads);
    debug!("Planning {facilities} facilities on {num_threads} threads");
    thread::scope(|scope| {
        let solve = &solve;
        let handles = (0..facilities)
            .step_by(chunk_size)
            .map(|start| {
                let end = (start + chunk_size).min(facilities);
                scope.spawn(move || (start..end).map(solve).collect_vec())
            })
            .collect_vec();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}

/// Combine per-facility metrics into market-wide metrics
fn merge_metrics(
    facility_solutions: &[Solution],
    parameters: &ParameterSet,
    dimensions: &Dimensions,
) -> Metrics {
    let mut metrics = Metrics::zeroed(dimensions.periods);
    for solution in facility_solutions {
        metrics.total_emissions += solution.metrics.total_emissions;
        metrics.total_unmet += solution.metrics.total_unmet;
        metrics.total_allocations += solution.metrics.total_allocations;
        for (total, cost) in metrics
            .total_costs
            .iter_mut()
            .zip(&solution.metrics.total_costs)
        {
            *total += cost;
        }
    }
    metrics.market_balance = metrics.total_allocations - metrics.total_emissions;
    metrics.price_volatility = price_volatility(parameters.iter_carbon_prices(dimensions));

    metrics
}

/// The population standard deviation of a set of prices (0 if there are none)
pub fn price_volatility<I>(prices: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let prices = prices.into_iter().collect_vec();
    if prices.is_empty() {
        return 0.0;
    }

    let count = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / count;
    let variance = prices.iter().map(|price| (price - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt()
}

/// Whether the market as a whole has more free allowances than emissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum)]
pub enum MarketPosition {
    /// Allocations exceed emissions
    #[string = "surplus"]
    Surplus,
    /// Emissions exceed allocations
    #[string = "short"]
    Short,
    /// Allocations equal emissions
    #[string = "balanced"]
    Balanced,
}

impl MarketPosition {
    fn from_balance(balance: f64) -> Self {
        if balance > 0.0 {
            Self::Surplus
        } else if balance < 0.0 {
            Self::Short
        } else {
            Self::Balanced
        }
    }
}

/// Aggregate statistics describing the plan for a whole market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    /// Number of facilities planned
    pub facilities: usize,
    /// Emissions per unit of output across all facilities
    pub average_emissions_intensity: f64,
    /// Total spend on building new capacity
    pub total_investment: f64,
    /// Total production with each technology, summed over facilities and periods
    pub technology_mix: Vec<f64>,
    /// Proportion of demand which was met
    pub service_level: f64,
    /// Whether the market is in surplus or short of allowances
    pub position: MarketPosition,
}

impl MarketSummary {
    /// Summarise a solution.
    ///
    /// Investment is costed with each facility's own investment costs. Facilities whose parameters
    /// are incomplete contribute no investment.
    pub fn new(solution: &Solution, parameters: &ParameterSet) -> Self {
        let trajectory = &solution.trajectory;
        let dimensions = trajectory.dimensions();
        let total_output = trajectory.total_output();
        let total_unmet = trajectory.total_unmet();

        let mut technology_mix = vec![0.0; dimensions.technologies];
        for (_, k, _, quantity) in trajectory.iter_production() {
            technology_mix[k] += quantity;
        }

        let total_investment = trajectory
            .build
            .iter()
            .zip(&parameters.investment_cost)
            .flat_map(|(builds, costs)| builds.iter().zip(costs))
            .map(|(units, cost)| cost * units.iter().map(|&u| f64::from(u)).sum::<f64>())
            .sum();

        let average_emissions_intensity = if total_output > 0.0 {
            trajectory.total_emissions() / total_output
        } else {
            0.0
        };
        let demand = total_output + total_unmet;
        let service_level = if demand > 0.0 {
            total_output / demand
        } else {
            1.0
        };

        Self {
            facilities: dimensions.facilities,
            average_emissions_intensity,
            total_investment,
            technology_mix,
            service_level,
            position: MarketPosition::from_balance(solution.metrics.market_balance),
        }
    }
}

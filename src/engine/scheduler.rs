//! Period-by-period scheduling of a facility's investment, production and trading.
//!
//! Each facility is scheduled independently. Periods are processed strictly in order, because each
//! period depends on the capacity, allowance bank and investment spend left by the one before.
use super::allocation::compute_allocation;
use crate::parameter_set::{Dimensions, FacilityParameters, ParameterSet, StrategicOrientation};
use crate::trajectory::DecisionTrajectory;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;

/// State carried from one period to the next
#[derive(Debug, Clone, PartialEq)]
struct FacilityState {
    /// Usable capacity of each technology
    capacity: Vec<f64>,
    /// Allowance balance banked at the end of the previous period
    banked: f64,
    /// Investment committed so far
    investment_spend: f64,
}

impl FacilityState {
    fn new(technologies: usize) -> Self {
        Self {
            capacity: vec![0.0; technologies],
            banked: 0.0,
            investment_spend: 0.0,
        }
    }
}

/// Outcome of the trading decision for one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradingDecision {
    /// Allowances bought
    pub buy: f64,
    /// Allowances sold
    pub sell: f64,
    /// Allowances banked for the next period
    pub banked: f64,
}

/// Schedule every facility, producing one trajectory covering them all.
///
/// # Arguments
///
/// * `parameters` - The problem parameters
/// * `dimensions` - The number of facilities, technologies and periods
///
/// # Returns
///
/// The decisions for every facility, or an error if any facility's parameters are incomplete or a
/// free allocation cannot be calculated.
pub fn schedule(parameters: &ParameterSet, dimensions: &Dimensions) -> Result<DecisionTrajectory> {
    let trajectories: Vec<_> = (0..dimensions.facilities)
        .map(|facility| -> Result<_> {
            let inputs = parameters.facility(dimensions, facility)?;
            schedule_facility(&inputs, dimensions)
                .with_context(|| format!("Failed to schedule facility {facility}"))
        })
        .try_collect()?;

    if trajectories.is_empty() {
        return Ok(DecisionTrajectory::zeroed(*dimensions));
    }

    DecisionTrajectory::merge(trajectories)
}

/// Schedule a single facility over all periods.
///
/// The returned trajectory has a facility count of 1.
pub fn schedule_facility(
    inputs: &FacilityParameters,
    dimensions: &Dimensions,
) -> Result<DecisionTrajectory> {
    let technologies = dimensions.technologies;
    let mut trajectory = DecisionTrajectory::zeroed(dimensions.for_single_facility());
    let mut state = FacilityState::new(technologies);

    for t in 0..dimensions.periods {
        let demand = inputs.demand[t];
        trajectory.operating[0][t] = demand > 0.0;

        // Investment: each buildable technology is sized against the whole period's demand
        for k in 0..technologies {
            if !inputs.can_build(k, t) {
                continue;
            }

            let capacity_per_unit = inputs.capacity_per_unit[k];
            let desired_capacity = demand.min(capacity_per_unit);
            if desired_capacity <= 0.0 {
                continue;
            }

            // Decisions clamped to the same build period replace each other
            let build_period = (t + 1).saturating_sub(inputs.gestation[k] as usize);
            let units = (desired_capacity / capacity_per_unit).ceil() as u32;
            let recorded = trajectory.build[0][k][build_period];
            let cost = f64::from(units.saturating_sub(recorded)) * inputs.investment_cost[k];
            if state.investment_spend + cost > inputs.investment_cap {
                debug!(
                    "Period {t}: building {units} unit(s) of technology {k} would exceed the \
                     investment cap of {}",
                    inputs.investment_cap
                );
                continue;
            }

            trajectory.build[0][k][build_period] = units;
            state.investment_spend += cost;
        }

        // Capacity comes online `gestation` periods after construction starts
        for k in 0..technologies {
            let gestation = inputs.gestation[k] as usize;
            if t >= gestation {
                let built = trajectory.build[0][k][t - gestation];
                state.capacity[k] += inputs.capacity_per_unit[k] * f64::from(built);
            }
            trajectory.capacity[0][k][t] = state.capacity[k];
        }

        // Production: technologies are used in order of the facility's priorities
        let mut remaining_demand = demand;
        for k in production_order(
            inputs.strategic_orientation,
            inputs.variable_cost,
            inputs.emissions_intensity,
            inputs.carbon_price[t],
        ) {
            if remaining_demand <= 0.0 {
                break;
            }

            let quantity = remaining_demand.min(state.capacity[k]);
            trajectory.production[0][k][t] = quantity;
            remaining_demand -= quantity;
        }
        trajectory.unmet[0][t] = remaining_demand.max(0.0);

        let (emissions, output) = (0..technologies).fold((0.0, 0.0), |(emissions, output), k| {
            let quantity = trajectory.production[0][k][t];
            (
                emissions + inputs.emissions_intensity[k] * quantity,
                output + quantity,
            )
        });
        trajectory.emissions[0][t] = emissions;
        trajectory.output[0][t] = output;

        let allocation = compute_allocation(
            inputs.baseline_intensity,
            inputs.target_intensity[t],
            inputs.benchmark_intensity[t],
            output,
        )
        .with_context(|| format!("Could not calculate free allocation for period {t}"))?;
        trajectory.allocations[0][t] = allocation;

        let allowed = inputs.benchmark_intensity[t] * output + allocation;
        let trade = decide_trading(
            emissions,
            allowed,
            state.banked,
            inputs.buy_cap[t],
            inputs.sell_cap[t],
        );
        trajectory.buy[0][t] = trade.buy;
        trajectory.sell[0][t] = trade.sell;
        trajectory.banked[0][t] = trade.banked;
        state.banked = trade.banked;
    }

    Ok(trajectory)
}

/// The order in which a facility uses its technologies.
///
/// Technologies are sorted by ascending emissions intensity for green leaders, ascending variable
/// cost for cost minimisers and ascending variable cost plus the cost of the emissions at
/// `carbon_price` for balanced facilities. Ties keep technology index order.
pub fn production_order(
    orientation: StrategicOrientation,
    variable_cost: &[f64],
    emissions_intensity: &[f64],
    carbon_price: f64,
) -> Vec<usize> {
    let priority = |k: usize| match orientation {
        StrategicOrientation::GreenLeader => emissions_intensity[k],
        StrategicOrientation::CostMinimizer => variable_cost[k],
        StrategicOrientation::Balanced => variable_cost[k] + emissions_intensity[k] * carbon_price,
    };

    (0..variable_cost.len())
        .sorted_by(|&a, &b| priority(a).total_cmp(&priority(b)))
        .collect()
}

/// Decide how many allowances to buy, sell and bank in a period.
///
/// A shortfall is bought up to `buy_cap`; anything beyond the cap is simply not covered. A surplus
/// is sold up to `sell_cap` and the rest is banked.
pub fn decide_trading(
    emissions: f64,
    allowed: f64,
    previously_banked: f64,
    buy_cap: f64,
    sell_cap: f64,
) -> TradingDecision {
    let net = emissions - allowed - previously_banked;
    if net > 0.0 {
        TradingDecision {
            buy: net.min(buy_cap),
            sell: 0.0,
            banked: 0.0,
        }
    } else {
        let sell = (-net).min(sell_cap);
        TradingDecision {
            buy: 0.0,
            sell,
            banked: -net - sell,
        }
    }
}

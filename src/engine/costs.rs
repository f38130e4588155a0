//! Costs of a plan.
//!
//! A plan's objective is the sum of operating, production, trading, holding and unmet-demand
//! penalty costs in every period, plus the cost of all investment. The per-period breakdown leaves
//! investment out, so the objective equals the per-period total plus [`investment_cost`].
use crate::parameter_set::{FacilityParameters, ParameterSet};
use crate::trajectory::DecisionTrajectory;
use anyhow::Result;

/// The objective value (total cost) of a trajectory
pub fn objective(trajectory: &DecisionTrajectory, parameters: &ParameterSet) -> Result<f64> {
    let dimensions = trajectory.dimensions();
    let mut objective = 0.0;
    for f in 0..dimensions.facilities {
        let inputs = parameters.facility(&dimensions, f)?;
        for t in 0..dimensions.periods {
            objective += period_cost(trajectory, &inputs, f, t);
        }
        objective += facility_investment_cost(trajectory, &inputs, f);
    }

    Ok(objective)
}

/// The cost incurred in each period, summed over facilities.
///
/// NB: This does not include investment costs.
pub fn per_period_costs(
    trajectory: &DecisionTrajectory,
    parameters: &ParameterSet,
) -> Result<Vec<f64>> {
    let dimensions = trajectory.dimensions();
    let mut costs = vec![0.0; dimensions.periods];
    for f in 0..dimensions.facilities {
        let inputs = parameters.facility(&dimensions, f)?;
        for (t, cost) in costs.iter_mut().enumerate() {
            *cost += period_cost(trajectory, &inputs, f, t);
        }
    }

    Ok(costs)
}

/// The total cost of all investment in a trajectory
pub fn investment_cost(trajectory: &DecisionTrajectory, parameters: &ParameterSet) -> Result<f64> {
    let dimensions = trajectory.dimensions();
    let mut total = 0.0;
    for f in 0..dimensions.facilities {
        let inputs = parameters.facility(&dimensions, f)?;
        total += facility_investment_cost(trajectory, &inputs, f);
    }

    Ok(total)
}

/// Cost of one facility's operation in one period, excluding investment
fn period_cost(
    trajectory: &DecisionTrajectory,
    inputs: &FacilityParameters,
    f: usize,
    t: usize,
) -> f64 {
    let fixed = if trajectory.operating[f][t] {
        inputs.fixed_operating_cost
    } else {
        0.0
    };
    let variable: f64 = inputs
        .variable_cost
        .iter()
        .zip(&trajectory.production[f])
        .map(|(cost, production)| cost * production[t])
        .sum();
    let trading = inputs.carbon_price[t] * (trajectory.buy[f][t] - trajectory.sell[f][t]);
    let holding = inputs.holding_cost[t] * trajectory.banked[f][t];
    let penalty = inputs.unmet_demand_penalty * trajectory.unmet[f][t];

    fixed + variable + trading + holding + penalty
}

/// Cost of every unit a facility builds, whether or not it comes online within the horizon
fn facility_investment_cost(
    trajectory: &DecisionTrajectory,
    inputs: &FacilityParameters,
    f: usize,
) -> f64 {
    inputs
        .investment_cost
        .iter()
        .zip(&trajectory.build[f])
        .map(|(cost, builds)| builds.iter().map(|&units| cost * f64::from(units)).sum::<f64>())
        .sum()
}

//! Properties every plan should have, checked against the bundled examples.
use ccts_planner::engine::{Mode, costs, solve, solve_with_threads};
use ccts_planner::example::Example;
use ccts_planner::parameter_set::{Dimensions, ParameterSet};
use ccts_planner::solution::Solution;
use float_cmp::approx_eq;
use itertools::iproduct;
use rstest::rstest;

/// Load an example and plan it in the example's own mode
fn solve_example(name: &str, mode: Mode) -> (Dimensions, ParameterSet, Solution) {
    let example = Example::from_name(name).unwrap();
    let dimensions = example.dimensions();
    let parameters = example.parameter_set();
    let solution = solve(&dimensions, &parameters, mode);
    assert!(solution.is_optimal());

    (dimensions, parameters, solution)
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("default", Mode::Single)]
#[case("single_facility", Mode::Single)]
#[case("market", Mode::Multi)]
fn capacity_never_decreases(#[case] name: &str, #[case] mode: Mode) {
    let (dims, _, solution) = solve_example(name, mode);
    let capacity = &solution.trajectory.capacity;
    for (f, k, t) in iproduct!(0..dims.facilities, 0..dims.technologies, 1..dims.periods) {
        assert!(capacity[f][k][t] >= capacity[f][k][t - 1]);
    }
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("single_facility", Mode::Single)]
#[case("market", Mode::Multi)]
fn production_within_capacity(#[case] name: &str, #[case] mode: Mode) {
    let (dims, _, solution) = solve_example(name, mode);
    let trajectory = &solution.trajectory;
    for (f, k, t) in iproduct!(0..dims.facilities, 0..dims.technologies, 0..dims.periods) {
        let production = trajectory.production[f][k][t];
        assert!(production >= 0.0);
        assert!(production <= trajectory.capacity[f][k][t] + 1e-9);
    }
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("single_facility", Mode::Single)]
#[case("market", Mode::Multi)]
fn demand_is_met_or_unmet(#[case] name: &str, #[case] mode: Mode) {
    let (dims, parameters, solution) = solve_example(name, mode);
    let trajectory = &solution.trajectory;
    for (f, t) in iproduct!(0..dims.facilities, 0..dims.periods) {
        let produced: f64 = (0..dims.technologies)
            .map(|k| trajectory.production[f][k][t])
            .sum();
        assert!(approx_eq!(
            f64,
            produced + trajectory.unmet[f][t],
            parameters.demand[f][t],
            epsilon = 1e-9
        ));
    }
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("market", Mode::Multi)]
fn never_buys_and_sells_together(#[case] name: &str, #[case] mode: Mode) {
    let (dims, parameters, solution) = solve_example(name, mode);
    let trajectory = &solution.trajectory;
    for (f, t) in iproduct!(0..dims.facilities, 0..dims.periods) {
        let (buy, sell) = (trajectory.buy[f][t], trajectory.sell[f][t]);
        assert!(buy == 0.0 || sell == 0.0);
        assert!(buy <= parameters.buy_cap[f][t]);
        assert!(sell <= parameters.sell_cap[f][t]);
        assert!(trajectory.banked[f][t] >= 0.0);
    }
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("market", Mode::Multi)]
fn investment_within_cap(#[case] name: &str, #[case] mode: Mode) {
    let (dims, parameters, solution) = solve_example(name, mode);
    for f in 0..dims.facilities {
        let spend: f64 = iproduct!(0..dims.technologies, 0..dims.periods)
            .map(|(k, t)| {
                f64::from(solution.trajectory.build[f][k][t]) * parameters.investment_cost[f][k]
            })
            .sum();
        assert!(spend <= parameters.investment_cap[f]);
    }
}

#[rstest]
#[case("default", Mode::Multi)]
#[case("default", Mode::Single)]
#[case("market", Mode::Multi)]
fn objective_is_period_costs_plus_investment(#[case] name: &str, #[case] mode: Mode) {
    let (_, parameters, solution) = solve_example(name, mode);
    let investment = costs::investment_cost(&solution.trajectory, &parameters).unwrap();
    let period_costs: f64 = solution.metrics.total_costs.iter().sum();
    assert!(approx_eq!(
        f64,
        solution.objective,
        period_costs + investment,
        epsilon = 1e-6
    ));
}

#[rstest]
#[case("default")]
#[case("market")]
fn solving_is_repeatable(#[case] name: &str) {
    let example = Example::from_name(name).unwrap();
    let dimensions = example.dimensions();
    let parameters = example.parameter_set();
    let first = solve_with_threads(&dimensions, &parameters, Mode::Multi, 1);
    let second = solve_with_threads(&dimensions, &parameters, Mode::Multi, 3);
    assert_eq!(first, second);
}

#[test]
fn market_objective_is_sum_of_facilities() {
    let (dims, _, solution) = solve_example("market", Mode::Multi);
    let facility_solutions = solution.facility_solutions.as_ref().unwrap();
    assert_eq!(facility_solutions.len(), dims.facilities);

    let total: f64 = facility_solutions.iter().map(|s| s.objective).sum();
    assert!(approx_eq!(f64, solution.objective, total, epsilon = 1e-6));
}

#[test]
fn single_mode_matches_multi_mode_for_one_facility() {
    let (_, _, single) = solve_example("single_facility", Mode::Single);
    let (_, _, multi) = solve_example("single_facility", Mode::Multi);
    assert_eq!(single.trajectory, multi.trajectory);
    assert!(approx_eq!(f64, single.objective, multi.objective, epsilon = 1e-9));
}

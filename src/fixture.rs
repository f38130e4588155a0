//! Fixtures for tests

use crate::parameter_set::{Dimensions, ParameterSet, StrategicOrientation};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn dimensions() -> Dimensions {
    Dimensions::new(2, 3, 4)
}

#[fixture]
pub fn default_parameters(dimensions: Dimensions) -> ParameterSet {
    ParameterSet::with_defaults(&dimensions)
}

/// One cost-minimising facility with a cheap dirty technology and an expensive clean one, over two
/// periods
#[fixture]
pub fn two_technology_parameters() -> ParameterSet {
    ParameterSet {
        fixed_operating_cost: vec![100.0],
        investment_cap: vec![1_000_000.0],
        baseline_intensity: vec![1.0],
        strategic_orientation: vec![StrategicOrientation::CostMinimizer],
        variable_cost: vec![vec![50.0, 80.0]],
        emissions_intensity: vec![vec![2.0, 0.5]],
        capacity_per_unit: vec![vec![1000.0, 1000.0]],
        gestation: vec![vec![1, 1]],
        investment_cost: vec![vec![10000.0, 20000.0]],
        earliest_build: vec![vec![1, 1]],
        scrap_use: vec![vec![0.0, 0.0]],
        ccus_use: vec![vec![0.0, 0.0]],
        demand: vec![vec![100.0, 100.0]],
        buy_cap: vec![vec![1000.0, 1000.0]],
        sell_cap: vec![vec![1000.0, 1000.0]],
        operating_budget: vec![vec![50000.0, 50000.0]],
        carbon_price: vec![vec![30.0, 30.0]],
        benchmark_intensity: vec![2.0, 2.0],
        holding_cost: vec![1.0, 1.0],
        target_intensity: vec![1.0, 1.0],
        scrap_capacity: vec![1000.0, 1000.0],
        ccus_capacity: vec![1000.0, 1000.0],
        unmet_demand_penalty: 1000.0,
        big_m: 1_000_000.0,
    }
}

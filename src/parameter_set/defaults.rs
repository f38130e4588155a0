//! Default parameters for a steel-sector planning problem of any size.
//!
//! The base values describe two facilities choosing between three technologies over four periods.
//! Larger problems cycle through the base values by facility, technology and period index.
use super::{Dimensions, ParameterSet, StrategicOrientation};

/// Names of the technologies the default parameters describe, in technology index order
pub const TECHNOLOGY_NAMES: [&str; 3] = [
    "Coal-based Blast Furnace",
    "Electric Arc Furnace with Scrap",
    "Green Hydrogen with CCUS",
];

const FIXED_OPERATING_COST: [f64; 2] = [10000.0, 12000.0];
const INVESTMENT_CAP: [f64; 2] = [150_000.0, 120_000.0];
const BASELINE_INTENSITY: [f64; 2] = [2.2, 2.0];
const STRATEGIC_ORIENTATION: [StrategicOrientation; 3] = [
    StrategicOrientation::CostMinimizer,
    StrategicOrientation::GreenLeader,
    StrategicOrientation::Balanced,
];

const VARIABLE_COST: [[f64; 3]; 2] = [[50.0, 60.0, 80.0], [55.0, 65.0, 85.0]];
const EMISSIONS_INTENSITY: [[f64; 3]; 2] = [[2.2, 1.0, 0.5], [2.2, 1.0, 0.5]];
const CAPACITY_PER_UNIT: f64 = 1000.0;
const GESTATION: [u32; 3] = [1, 2, 3];
const INVESTMENT_COST: [[f64; 3]; 2] = [[10000.0, 15000.0, 20000.0], [11000.0, 16000.0, 21000.0]];
const EARLIEST_BUILD: [u32; 3] = [1, 2, 3];
const SCRAP_USE: [f64; 3] = [0.0, 1.0, 0.5];
const CCUS_USE: [f64; 3] = [0.0, 0.0, 1.0];

const DEMAND: [f64; 4] = [500.0, 600.0, 700.0, 800.0];
const BUY_CAP: f64 = 10000.0;
const SELL_CAP: f64 = 10000.0;
const OPERATING_BUDGET: [f64; 4] = [50000.0, 55000.0, 60000.0, 65000.0];
const CARBON_PRICE: [f64; 4] = [30.0, 32.0, 35.0, 38.0];

const BENCHMARK_INTENSITY: [f64; 4] = [2.0, 1.9, 1.8, 1.7];
const HOLDING_COST: [f64; 4] = [1.0, 1.1, 1.2, 1.3];
const TARGET_INTENSITY: [f64; 4] = [1.8, 1.6, 1.4, 1.2];
const SCRAP_CAPACITY: [f64; 4] = [2000.0, 2200.0, 2400.0, 2600.0];
const CCUS_CAPACITY: [f64; 4] = [1500.0, 1600.0, 1700.0, 1800.0];

const UNMET_DEMAND_PENALTY: f64 = 1000.0;
const BIG_M: f64 = 1_000_000.0;

/// Pick a value from `base`, wrapping around if `index` is out of range
fn cycle<T: Copy>(base: &[T], index: usize) -> T {
    base[index % base.len()]
}

/// One value per facility
fn per_facility<T: Copy>(dimensions: &Dimensions, base: &[T]) -> Vec<T> {
    (0..dimensions.facilities).map(|i| cycle(base, i)).collect()
}

/// One row per facility with one value per technology
fn per_facility_technology<T: Copy>(dimensions: &Dimensions, base: &[[T; 3]]) -> Vec<Vec<T>> {
    (0..dimensions.facilities)
        .map(|i| {
            let row = cycle(base, i);
            (0..dimensions.technologies).map(|k| cycle(&row, k)).collect()
        })
        .collect()
}

/// One row per facility with one value per period
fn per_facility_period(dimensions: &Dimensions, base: &[f64]) -> Vec<Vec<f64>> {
    (0..dimensions.facilities)
        .map(|_| per_period(dimensions, base))
        .collect()
}

/// One value per period
fn per_period(dimensions: &Dimensions, base: &[f64]) -> Vec<f64> {
    (0..dimensions.periods).map(|t| cycle(base, t)).collect()
}

impl ParameterSet {
    /// Create the default parameters for a problem of the given size
    pub fn with_defaults(dimensions: &Dimensions) -> Self {
        let technology_values = |base: &[f64; 3]| per_facility_technology(dimensions, &[*base]);
        let technology_counts = |base: &[u32; 3]| per_facility_technology(dimensions, &[*base]);

        Self {
            fixed_operating_cost: per_facility(dimensions, &FIXED_OPERATING_COST),
            investment_cap: per_facility(dimensions, &INVESTMENT_CAP),
            baseline_intensity: per_facility(dimensions, &BASELINE_INTENSITY),
            strategic_orientation: per_facility(dimensions, &STRATEGIC_ORIENTATION),
            variable_cost: per_facility_technology(dimensions, &VARIABLE_COST),
            emissions_intensity: per_facility_technology(dimensions, &EMISSIONS_INTENSITY),
            capacity_per_unit: technology_values(&[CAPACITY_PER_UNIT; 3]),
            gestation: technology_counts(&GESTATION),
            investment_cost: per_facility_technology(dimensions, &INVESTMENT_COST),
            earliest_build: technology_counts(&EARLIEST_BUILD),
            scrap_use: technology_values(&SCRAP_USE),
            ccus_use: technology_values(&CCUS_USE),
            demand: per_facility_period(dimensions, &DEMAND),
            buy_cap: per_facility_period(dimensions, &[BUY_CAP]),
            sell_cap: per_facility_period(dimensions, &[SELL_CAP]),
            operating_budget: per_facility_period(dimensions, &OPERATING_BUDGET),
            carbon_price: per_facility_period(dimensions, &CARBON_PRICE),
            benchmark_intensity: per_period(dimensions, &BENCHMARK_INTENSITY),
            holding_cost: per_period(dimensions, &HOLDING_COST),
            target_intensity: per_period(dimensions, &TARGET_INTENSITY),
            scrap_capacity: per_period(dimensions, &SCRAP_CAPACITY),
            ccus_capacity: per_period(dimensions, &CCUS_CAPACITY),
            unmet_demand_penalty: UNMET_DEMAND_PENALTY,
            big_m: BIG_M,
        }
    }
}

/// A human-readable name for a technology index
pub fn technology_name(technology: usize) -> String {
    if technology < TECHNOLOGY_NAMES.len() {
        TECHNOLOGY_NAMES[technology].to_string()
    } else {
        format!("Technology {}", technology + 1)
    }
}

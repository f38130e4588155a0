//! The parameters describing a planning problem.
//!
//! A [`ParameterSet`] holds every cost, emissions, capacity and market parameter for all facilities,
//! technologies and periods of a problem. Values are stored as plain nested vectors indexed by
//! facility, then technology or period, so that they can be checked against [`Dimensions`] before a
//! run (see [`crate::validation`]).
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::fmt;

pub mod defaults;

/// The size of a planning problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of facilities (E)
    pub facilities: usize,
    /// Number of technologies (K)
    pub technologies: usize,
    /// Number of periods (T)
    pub periods: usize,
}

impl Dimensions {
    /// Create a new [`Dimensions`]
    pub fn new(facilities: usize, technologies: usize, periods: usize) -> Self {
        Self {
            facilities,
            technologies,
            periods,
        }
    }

    /// The same problem restricted to a single facility
    pub fn for_single_facility(&self) -> Self {
        Self {
            facilities: 1,
            ..*self
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}F x {}T x {}P",
            self.facilities, self.technologies, self.periods
        )
    }
}

/// The policy a facility follows when choosing which technologies to produce with
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, DeserializeLabeledStringEnum, SerializeLabeledStringEnum,
)]
pub enum StrategicOrientation {
    /// Prefer the technologies with the lowest variable cost
    #[string = "cost-minimizer"]
    CostMinimizer,
    /// Prefer the technologies with the lowest emissions intensity
    #[string = "green-leader"]
    GreenLeader,
    /// Prefer the technologies with the lowest variable cost once emissions are priced
    #[string = "balanced"]
    Balanced,
}

/// All the parameters of a planning problem.
///
/// Per-facility values are indexed `[facility]`, per-facility-per-technology values
/// `[facility][technology]`, per-facility-per-period values `[facility][period]` and per-period
/// values `[period]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    /// Fixed cost incurred in each period in which a facility operates
    pub fixed_operating_cost: Vec<f64>,
    /// Maximum total investment spend for each facility
    pub investment_cap: Vec<f64>,
    /// Baseline emissions intensity for each facility, used for free allocation
    pub baseline_intensity: Vec<f64>,
    /// Strategic orientation of each facility
    pub strategic_orientation: Vec<StrategicOrientation>,

    /// Cost per unit of production
    pub variable_cost: Vec<Vec<f64>>,
    /// Emissions per unit of production
    pub emissions_intensity: Vec<Vec<f64>>,
    /// Production capacity added by each built unit
    pub capacity_per_unit: Vec<Vec<f64>>,
    /// Number of periods between starting construction and the capacity coming online
    pub gestation: Vec<Vec<u32>>,
    /// Cost of building one unit
    pub investment_cost: Vec<Vec<f64>>,
    /// The first period (numbered from 1) in which a technology may be built
    pub earliest_build: Vec<Vec<u32>>,
    /// Scrap consumed per unit of production (reported but not constrained)
    pub scrap_use: Vec<Vec<f64>>,
    /// CCUS capacity used per unit of production (reported but not constrained)
    pub ccus_use: Vec<Vec<f64>>,

    /// Demand for each facility's output
    pub demand: Vec<Vec<f64>>,
    /// Maximum allowance purchase
    pub buy_cap: Vec<Vec<f64>>,
    /// Maximum allowance sale
    pub sell_cap: Vec<Vec<f64>>,
    /// Operating budget (reported but not constrained)
    pub operating_budget: Vec<Vec<f64>>,
    /// Carbon price faced by each facility
    pub carbon_price: Vec<Vec<f64>>,

    /// Benchmark emissions intensity set by the regulator
    pub benchmark_intensity: Vec<f64>,
    /// Cost of holding one banked allowance for a period
    pub holding_cost: Vec<f64>,
    /// Target emissions intensity
    pub target_intensity: Vec<f64>,
    /// System-wide scrap availability (not enforced)
    pub scrap_capacity: Vec<f64>,
    /// System-wide CCUS capacity (not enforced)
    pub ccus_capacity: Vec<f64>,

    /// Penalty per unit of unmet demand
    pub unmet_demand_penalty: f64,
    /// Large constant bounding the problem (validated but otherwise unused)
    pub big_m: f64,
}

/// Take the row for one facility out of a per-facility table
fn facility_entry<T: Clone>(values: &[T], facility: usize, name: &str) -> Result<Vec<T>> {
    let value = values
        .get(facility)
        .with_context(|| format!("`{name}` has no entry for facility {facility}"))?;

    Ok(vec![value.clone()])
}

/// Get a facility's row of a table, checking it has at least `len` values
fn facility_row<'a, T>(rows: &'a [Vec<T>], facility: usize, len: usize, name: &str) -> Result<&'a [T]> {
    let row = rows
        .get(facility)
        .with_context(|| format!("`{name}` has no entry for facility {facility}"))?;
    ensure!(
        row.len() >= len,
        "`{name}` for facility {facility} has {} values, expected {len}",
        row.len()
    );

    Ok(&row[..len])
}

/// Get a per-period table, checking it has at least `len` values
fn period_values<'a>(values: &'a [f64], len: usize, name: &str) -> Result<&'a [f64]> {
    ensure!(
        values.len() >= len,
        "`{name}` has {} values, expected {len}",
        values.len()
    );

    Ok(&values[..len])
}

impl ParameterSet {
    /// Get a view of the parameters for one facility, with every array checked against `dimensions`.
    ///
    /// # Returns
    ///
    /// A [`FacilityParameters`] or an error if any table is missing the facility or is too short.
    pub fn facility(
        &self,
        dimensions: &Dimensions,
        facility: usize,
    ) -> Result<FacilityParameters<'_>> {
        let Dimensions {
            technologies: k,
            periods: t,
            ..
        } = *dimensions;
        let scalar = |values: &[f64], name: &str| -> Result<f64> {
            values
                .get(facility)
                .copied()
                .with_context(|| format!("`{name}` has no entry for facility {facility}"))
        };

        let gestation = facility_row(&self.gestation, facility, k, "gestation")?;
        ensure!(
            gestation.iter().all(|&g| g >= 1),
            "Gestation periods for facility {facility} must be at least 1"
        );

        Ok(FacilityParameters {
            fixed_operating_cost: scalar(&self.fixed_operating_cost, "fixed_operating_cost")?,
            investment_cap: scalar(&self.investment_cap, "investment_cap")?,
            baseline_intensity: scalar(&self.baseline_intensity, "baseline_intensity")?,
            strategic_orientation: self
                .strategic_orientation
                .get(facility)
                .copied()
                .with_context(|| {
                    format!("`strategic_orientation` has no entry for facility {facility}")
                })?,
            variable_cost: facility_row(&self.variable_cost, facility, k, "variable_cost")?,
            emissions_intensity: facility_row(
                &self.emissions_intensity,
                facility,
                k,
                "emissions_intensity",
            )?,
            capacity_per_unit: facility_row(
                &self.capacity_per_unit,
                facility,
                k,
                "capacity_per_unit",
            )?,
            gestation,
            investment_cost: facility_row(&self.investment_cost, facility, k, "investment_cost")?,
            earliest_build: facility_row(&self.earliest_build, facility, k, "earliest_build")?,
            demand: facility_row(&self.demand, facility, t, "demand")?,
            buy_cap: facility_row(&self.buy_cap, facility, t, "buy_cap")?,
            sell_cap: facility_row(&self.sell_cap, facility, t, "sell_cap")?,
            carbon_price: facility_row(&self.carbon_price, facility, t, "carbon_price")?,
            benchmark_intensity: period_values(&self.benchmark_intensity, t, "benchmark_intensity")?,
            holding_cost: period_values(&self.holding_cost, t, "holding_cost")?,
            target_intensity: period_values(&self.target_intensity, t, "target_intensity")?,
            unmet_demand_penalty: self.unmet_demand_penalty,
        })
    }

    /// Create a copy of the parameters containing only the given facility.
    ///
    /// Every per-facility table is sliced down to the one facility; per-period and global values are
    /// copied unchanged. The result describes a problem with a facility count of 1.
    pub fn facility_view(&self, facility: usize) -> Result<ParameterSet> {
        Ok(ParameterSet {
            fixed_operating_cost: facility_entry(
                &self.fixed_operating_cost,
                facility,
                "fixed_operating_cost",
            )?,
            investment_cap: facility_entry(&self.investment_cap, facility, "investment_cap")?,
            baseline_intensity: facility_entry(
                &self.baseline_intensity,
                facility,
                "baseline_intensity",
            )?,
            strategic_orientation: facility_entry(
                &self.strategic_orientation,
                facility,
                "strategic_orientation",
            )?,
            variable_cost: facility_entry(&self.variable_cost, facility, "variable_cost")?,
            emissions_intensity: facility_entry(
                &self.emissions_intensity,
                facility,
                "emissions_intensity",
            )?,
            capacity_per_unit: facility_entry(
                &self.capacity_per_unit,
                facility,
                "capacity_per_unit",
            )?,
            gestation: facility_entry(&self.gestation, facility, "gestation")?,
            investment_cost: facility_entry(&self.investment_cost, facility, "investment_cost")?,
            earliest_build: facility_entry(&self.earliest_build, facility, "earliest_build")?,
            scrap_use: facility_entry(&self.scrap_use, facility, "scrap_use")?,
            ccus_use: facility_entry(&self.ccus_use, facility, "ccus_use")?,
            demand: facility_entry(&self.demand, facility, "demand")?,
            buy_cap: facility_entry(&self.buy_cap, facility, "buy_cap")?,
            sell_cap: facility_entry(&self.sell_cap, facility, "sell_cap")?,
            operating_budget: facility_entry(&self.operating_budget, facility, "operating_budget")?,
            carbon_price: facility_entry(&self.carbon_price, facility, "carbon_price")?,
            benchmark_intensity: self.benchmark_intensity.clone(),
            holding_cost: self.holding_cost.clone(),
            target_intensity: self.target_intensity.clone(),
            scrap_capacity: self.scrap_capacity.clone(),
            ccus_capacity: self.ccus_capacity.clone(),
            unmet_demand_penalty: self.unmet_demand_penalty,
            big_m: self.big_m,
        })
    }

    /// Iterate over every facility's carbon price in every period
    pub fn iter_carbon_prices(&self, dimensions: &Dimensions) -> impl Iterator<Item = f64> + '_ {
        let periods = dimensions.periods;
        self.carbon_price
            .iter()
            .take(dimensions.facilities)
            .flat_map(move |prices| prices.iter().take(periods).copied())
    }
}

/// The parameters for a single facility, borrowed from a [`ParameterSet`].
///
/// Per-technology slices have exactly K values and per-period slices exactly T values.
#[derive(Debug, Clone, Copy)]
pub struct FacilityParameters<'a> {
    /// Fixed cost per operating period
    pub fixed_operating_cost: f64,
    /// Maximum total investment spend
    pub investment_cap: f64,
    /// Baseline emissions intensity
    pub baseline_intensity: f64,
    /// Strategic orientation
    pub strategic_orientation: StrategicOrientation,
    /// Variable cost per technology
    pub variable_cost: &'a [f64],
    /// Emissions intensity per technology
    pub emissions_intensity: &'a [f64],
    /// Capacity per built unit per technology
    pub capacity_per_unit: &'a [f64],
    /// Gestation per technology (always at least 1)
    pub gestation: &'a [u32],
    /// Investment cost per unit per technology
    pub investment_cost: &'a [f64],
    /// Earliest build period (numbered from 1) per technology
    pub earliest_build: &'a [u32],
    /// Demand per period
    pub demand: &'a [f64],
    /// Buy cap per period
    pub buy_cap: &'a [f64],
    /// Sell cap per period
    pub sell_cap: &'a [f64],
    /// Carbon price per period
    pub carbon_price: &'a [f64],
    /// Benchmark intensity per period
    pub benchmark_intensity: &'a [f64],
    /// Holding cost per period
    pub holding_cost: &'a [f64],
    /// Target intensity per period
    pub target_intensity: &'a [f64],
    /// Penalty per unit of unmet demand
    pub unmet_demand_penalty: f64,
}

impl FacilityParameters<'_> {
    /// Whether `technology` may be built in (zero-based) `period`
    pub fn can_build(&self, technology: usize, period: usize) -> bool {
        period + 1 >= self.earliest_build[technology] as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, default_parameters, dimensions};
    use rstest::rstest;

    #[rstest]
    #[case("cost-minimizer", StrategicOrientation::CostMinimizer)]
    #[case("green-leader", StrategicOrientation::GreenLeader)]
    #[case("balanced", StrategicOrientation::Balanced)]
    fn strategic_orientation_labels(#[case] label: &str, #[case] expected: StrategicOrientation) {
        assert_eq!(label.parse::<StrategicOrientation>().unwrap(), expected);
        assert_eq!(expected.to_string(), label);
    }

    #[rstest]
    fn facility_view_slices_per_facility_tables(
        dimensions: Dimensions,
        default_parameters: ParameterSet,
    ) {
        let view = default_parameters.facility_view(1).unwrap();
        assert_eq!(view.fixed_operating_cost, [default_parameters.fixed_operating_cost[1]]);
        assert_eq!(view.variable_cost, [default_parameters.variable_cost[1].clone()]);
        assert_eq!(view.demand, [default_parameters.demand[1].clone()]);
        assert_eq!(view.benchmark_intensity, default_parameters.benchmark_intensity);
        view.facility(&dimensions.for_single_facility(), 0).unwrap();
    }

    #[rstest]
    fn facility_view_missing_facility(default_parameters: ParameterSet) {
        assert_error!(
            default_parameters.facility_view(5),
            "`fixed_operating_cost` has no entry for facility 5"
        );
    }

    #[rstest]
    fn facility_short_demand(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.demand[0].pop();
        assert_error!(
            default_parameters.facility(&dimensions, 0),
            "`demand` for facility 0 has 3 values, expected 4"
        );
    }

    #[rstest]
    fn facility_zero_gestation(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.gestation[0][1] = 0;
        assert_error!(
            default_parameters.facility(&dimensions, 0),
            "Gestation periods for facility 0 must be at least 1"
        );
    }

    #[rstest]
    #[case(1, 0, true)]
    #[case(2, 0, false)]
    #[case(2, 1, true)]
    #[case(3, 5, true)]
    fn can_build(
        dimensions: Dimensions,
        mut default_parameters: ParameterSet,
        #[case] earliest_build: u32,
        #[case] period: usize,
        #[case] expected: bool,
    ) {
        default_parameters.earliest_build[0][0] = earliest_build;
        let facility = default_parameters.facility(&dimensions, 0).unwrap();
        assert_eq!(facility.can_build(0, period), expected);
    }

    #[rstest]
    fn iter_carbon_prices(dimensions: Dimensions, default_parameters: ParameterSet) {
        let prices: Vec<_> = default_parameters.iter_carbon_prices(&dimensions).collect();
        assert_eq!(prices, [30.0, 32.0, 35.0, 38.0, 30.0, 32.0, 35.0, 38.0]);
    }

    #[test]
    fn orientation_display() {
        assert_eq!(StrategicOrientation::GreenLeader.to_string(), "green-leader");
        assert_eq!(
            Dimensions::new(2, 3, 4).to_string(),
            "2F x 3T x 4P".to_string()
        );
    }
}

//! Code for reading per-facility, per-period parameters (demand and market conditions) from a CSV
//! file.
use super::{IndexedRow, index_rows, input_err_msg, read_csv};
use crate::parameter_set::{Dimensions, ParameterSet};
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The name of the facility periods file in a model directory
pub const FACILITY_PERIODS_FILE_NAME: &str = "facility_periods.csv";

/// A row of the facility periods file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityPeriodRaw {
    facility: usize,
    period: usize,
    demand: f64,
    buy_cap: f64,
    sell_cap: f64,
    #[serde(default)]
    operating_budget: f64,
    carbon_price: f64,
}

impl IndexedRow for FacilityPeriodRaw {
    type Key = (usize, usize);

    fn key(&self) -> (usize, usize) {
        (self.facility, self.period)
    }

    fn expected_keys(dimensions: &Dimensions) -> Vec<(usize, usize)> {
        (0..dimensions.facilities)
            .cartesian_product(0..dimensions.periods)
            .collect()
    }

    fn describe((facility, period): (usize, usize)) -> String {
        format!("facility {facility}, period {period}")
    }
}

/// Read demand and market parameters from the specified model directory into `parameters`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `dimensions` - The size of the model
/// * `parameters` - The parameter set being read
pub fn read_facility_periods(
    model_dir: &Path,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()> {
    let file_path = model_dir.join(FACILITY_PERIODS_FILE_NAME);
    let facility_periods_csv = read_csv(&file_path)?;
    read_facility_periods_from_iter(facility_periods_csv, dimensions, parameters)
        .with_context(|| input_err_msg(&file_path))
}

fn read_facility_periods_from_iter<I>(
    iter: I,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()>
where
    I: Iterator<Item = FacilityPeriodRaw>,
{
    let rows = index_rows(iter, dimensions)?;
    for facility_rows in &rows.iter().chunks(dimensions.periods) {
        let facility_rows = facility_rows.collect_vec();
        let column = |value: fn(&FacilityPeriodRaw) -> f64| -> Vec<f64> {
            facility_rows.iter().map(|row| value(row)).collect()
        };

        parameters.demand.push(column(|row| row.demand));
        parameters.buy_cap.push(column(|row| row.buy_cap));
        parameters.sell_cap.push(column(|row| row.sell_cap));
        parameters
            .operating_budget
            .push(column(|row| row.operating_budget));
        parameters.carbon_price.push(column(|row| row.carbon_price));
    }

    Ok(())
}

/// The rows of the facility periods file describing `parameters`
pub fn facility_period_rows(
    parameters: &ParameterSet,
    dimensions: &Dimensions,
) -> Vec<FacilityPeriodRaw> {
    FacilityPeriodRaw::expected_keys(dimensions)
        .into_iter()
        .map(|(f, t)| FacilityPeriodRaw {
            facility: f,
            period: t,
            demand: parameters.demand[f][t],
            buy_cap: parameters.buy_cap[f][t],
            sell_cap: parameters.sell_cap[f][t],
            operating_budget: parameters.operating_budget[f][t],
            carbon_price: parameters.carbon_price[f][t],
        })
        .collect()
}

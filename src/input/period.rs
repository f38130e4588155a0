//! Code for reading system-wide per-period parameters from a CSV file.
use super::{IndexedRow, index_rows, input_err_msg, read_csv};
use crate::parameter_set::{Dimensions, ParameterSet};
use anyhow::{Context, Result};
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The name of the periods file in a model directory
pub const PERIODS_FILE_NAME: &str = "periods.csv";

/// A row of the periods file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRaw {
    period: usize,
    benchmark_intensity: f64,
    holding_cost: f64,
    target_intensity: f64,
    #[serde(default)]
    scrap_capacity: f64,
    #[serde(default)]
    ccus_capacity: f64,
}

impl IndexedRow for PeriodRaw {
    type Key = usize;

    fn key(&self) -> usize {
        self.period
    }

    fn expected_keys(dimensions: &Dimensions) -> Vec<usize> {
        (0..dimensions.periods).collect()
    }

    fn describe(key: usize) -> String {
        format!("period {key}")
    }
}

/// Read per-period parameters from the specified model directory into `parameters`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `dimensions` - The size of the model
/// * `parameters` - The parameter set being read
pub fn read_periods(
    model_dir: &Path,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()> {
    let file_path = model_dir.join(PERIODS_FILE_NAME);
    let periods_csv = read_csv(&file_path)?;
    read_periods_from_iter(periods_csv, dimensions, parameters)
        .with_context(|| input_err_msg(&file_path))
}

fn read_periods_from_iter<I>(
    iter: I,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()>
where
    I: Iterator<Item = PeriodRaw>,
{
    for row in index_rows(iter, dimensions)? {
        parameters
            .benchmark_intensity
            .push(row.benchmark_intensity);
        parameters.holding_cost.push(row.holding_cost);
        parameters.target_intensity.push(row.target_intensity);
        parameters.scrap_capacity.push(row.scrap_capacity);
        parameters.ccus_capacity.push(row.ccus_capacity);
    }

    Ok(())
}

/// The rows of the periods file describing `parameters`
pub fn period_rows(parameters: &ParameterSet) -> Vec<PeriodRaw> {
    izip!(
        &parameters.benchmark_intensity,
        &parameters.holding_cost,
        &parameters.target_intensity,
        &parameters.scrap_capacity,
        &parameters.ccus_capacity
    )
    .enumerate()
    .map(|(period, (&benchmark, &holding, &target, &scrap, &ccus))| PeriodRaw {
        period,
        benchmark_intensity: benchmark,
        holding_cost: holding,
        target_intensity: target,
        scrap_capacity: scrap,
        ccus_capacity: ccus,
    })
    .collect()
}

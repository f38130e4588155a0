//! Code for reading per-facility parameters from a CSV file.
use super::{IndexedRow, index_rows, input_err_msg, read_csv};
use crate::parameter_set::{Dimensions, ParameterSet, StrategicOrientation};
use anyhow::{Context, Result};
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The name of the facilities file in a model directory
pub const FACILITIES_FILE_NAME: &str = "facilities.csv";

/// A row of the facilities file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRaw {
    facility: usize,
    fixed_operating_cost: f64,
    investment_cap: f64,
    baseline_intensity: f64,
    strategic_orientation: StrategicOrientation,
}

impl IndexedRow for FacilityRaw {
    type Key = usize;

    fn key(&self) -> usize {
        self.facility
    }

    fn expected_keys(dimensions: &Dimensions) -> Vec<usize> {
        (0..dimensions.facilities).collect()
    }

    fn describe(key: usize) -> String {
        format!("facility {key}")
    }
}

/// Read per-facility parameters from the specified model directory into `parameters`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `dimensions` - The size of the model
/// * `parameters` - The parameter set being read
pub fn read_facilities(
    model_dir: &Path,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()> {
    let file_path = model_dir.join(FACILITIES_FILE_NAME);
    let facilities_csv = read_csv(&file_path)?;
    read_facilities_from_iter(facilities_csv, dimensions, parameters)
        .with_context(|| input_err_msg(&file_path))
}

fn read_facilities_from_iter<I>(
    iter: I,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()>
where
    I: Iterator<Item = FacilityRaw>,
{
    for row in index_rows(iter, dimensions)? {
        parameters
            .fixed_operating_cost
            .push(row.fixed_operating_cost);
        parameters.investment_cap.push(row.investment_cap);
        parameters.baseline_intensity.push(row.baseline_intensity);
        parameters
            .strategic_orientation
            .push(row.strategic_orientation);
    }

    Ok(())
}

/// The rows of the facilities file describing `parameters`
pub fn facility_rows(parameters: &ParameterSet) -> Vec<FacilityRaw> {
    izip!(
        &parameters.fixed_operating_cost,
        &parameters.investment_cap,
        &parameters.baseline_intensity,
        &parameters.strategic_orientation
    )
    .enumerate()
    .map(
        |(facility, (&fixed_operating_cost, &investment_cap, &baseline_intensity, &orientation))| {
            FacilityRaw {
                facility,
                fixed_operating_cost,
                investment_cap,
                baseline_intensity,
                strategic_orientation: orientation,
            }
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, default_parameters, dimensions};
    use rstest::rstest;

    #[rstest]
    fn read_facilities_from_iter_works(dimensions: Dimensions, default_parameters: ParameterSet) {
        let mut rows = facility_rows(&default_parameters);
        rows.reverse();

        let mut parameters = ParameterSet::default();
        read_facilities_from_iter(rows.into_iter(), &dimensions, &mut parameters).unwrap();
        assert_eq!(
            parameters.fixed_operating_cost,
            default_parameters.fixed_operating_cost
        );
        assert_eq!(
            parameters.strategic_orientation,
            [
                StrategicOrientation::CostMinimizer,
                StrategicOrientation::GreenLeader
            ]
        );
    }

    #[rstest]
    fn read_facilities_from_iter_missing(dimensions: Dimensions, default_parameters: ParameterSet) {
        let rows = facility_rows(&default_parameters);
        let mut parameters = ParameterSet::default();
        assert_error!(
            read_facilities_from_iter(rows.into_iter().take(1), &dimensions, &mut parameters),
            "Missing entry for facility 1"
        );
    }
}

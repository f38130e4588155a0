//! Code for reading per-facility technology parameters from a CSV file.
use super::{IndexedRow, index_rows, input_err_msg, read_csv};
use crate::parameter_set::{Dimensions, ParameterSet};
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The name of the technologies file in a model directory
pub const TECHNOLOGIES_FILE_NAME: &str = "technologies.csv";

/// A row of the technologies file: the parameters of one technology at one facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyRaw {
    facility: usize,
    technology: usize,
    variable_cost: f64,
    emissions_intensity: f64,
    capacity_per_unit: f64,
    gestation: u32,
    investment_cost: f64,
    earliest_build: u32,
    #[serde(default)]
    scrap_use: f64,
    #[serde(default)]
    ccus_use: f64,
}

impl IndexedRow for TechnologyRaw {
    type Key = (usize, usize);

    fn key(&self) -> (usize, usize) {
        (self.facility, self.technology)
    }

    fn expected_keys(dimensions: &Dimensions) -> Vec<(usize, usize)> {
        (0..dimensions.facilities)
            .cartesian_product(0..dimensions.technologies)
            .collect()
    }

    fn describe((facility, technology): (usize, usize)) -> String {
        format!("facility {facility}, technology {technology}")
    }
}

/// Read technology parameters from the specified model directory into `parameters`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `dimensions` - The size of the model
/// * `parameters` - The parameter set being read
pub fn read_technologies(
    model_dir: &Path,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()> {
    let file_path = model_dir.join(TECHNOLOGIES_FILE_NAME);
    let technologies_csv = read_csv(&file_path)?;
    read_technologies_from_iter(technologies_csv, dimensions, parameters)
        .with_context(|| input_err_msg(&file_path))
}

fn read_technologies_from_iter<I>(
    iter: I,
    dimensions: &Dimensions,
    parameters: &mut ParameterSet,
) -> Result<()>
where
    I: Iterator<Item = TechnologyRaw>,
{
    let rows = index_rows(iter, dimensions)?;
    for facility_rows in &rows.iter().chunks(dimensions.technologies) {
        let facility_rows = facility_rows.collect_vec();
        let column = |value: fn(&TechnologyRaw) -> f64| -> Vec<f64> {
            facility_rows.iter().map(|row| value(row)).collect()
        };
        let counts = |value: fn(&TechnologyRaw) -> u32| -> Vec<u32> {
            facility_rows.iter().map(|row| value(row)).collect()
        };

        parameters.variable_cost.push(column(|row| row.variable_cost));
        parameters
            .emissions_intensity
            .push(column(|row| row.emissions_intensity));
        parameters
            .capacity_per_unit
            .push(column(|row| row.capacity_per_unit));
        parameters.gestation.push(counts(|row| row.gestation));
        parameters
            .investment_cost
            .push(column(|row| row.investment_cost));
        parameters
            .earliest_build
            .push(counts(|row| row.earliest_build));
        parameters.scrap_use.push(column(|row| row.scrap_use));
        parameters.ccus_use.push(column(|row| row.ccus_use));
    }

    Ok(())
}

/// The rows of the technologies file describing `parameters`
pub fn technology_rows(parameters: &ParameterSet, dimensions: &Dimensions) -> Vec<TechnologyRaw> {
    TechnologyRaw::expected_keys(dimensions)
        .into_iter()
        .map(|(f, k)| TechnologyRaw {
            facility: f,
            technology: k,
            variable_cost: parameters.variable_cost[f][k],
            emissions_intensity: parameters.emissions_intensity[f][k],
            capacity_per_unit: parameters.capacity_per_unit[f][k],
            gestation: parameters.gestation[f][k],
            investment_cost: parameters.investment_cost[f][k],
            earliest_build: parameters.earliest_build[f][k],
            scrap_use: parameters.scrap_use[f][k],
            ccus_use: parameters.ccus_use[f][k],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, default_parameters, dimensions};
    use rstest::rstest;

    #[rstest]
    fn read_technologies_from_iter_works(
        dimensions: Dimensions,
        default_parameters: ParameterSet,
    ) {
        let mut rows = technology_rows(&default_parameters, &dimensions);
        rows.reverse();

        let mut parameters = ParameterSet::default();
        read_technologies_from_iter(rows.into_iter(), &dimensions, &mut parameters).unwrap();
        assert_eq!(parameters.variable_cost, default_parameters.variable_cost);
        assert_eq!(parameters.gestation, default_parameters.gestation);
        assert_eq!(parameters.earliest_build, default_parameters.earliest_build);
        assert_eq!(parameters.ccus_use, default_parameters.ccus_use);
    }

    #[rstest]
    fn read_technologies_from_iter_duplicate(
        dimensions: Dimensions,
        default_parameters: ParameterSet,
    ) {
        let mut rows = technology_rows(&default_parameters, &dimensions);
        rows.push(rows[4].clone());

        let mut parameters = ParameterSet::default();
        assert_error!(
            read_technologies_from_iter(rows.into_iter(), &dimensions, &mut parameters),
            "Duplicate entry for facility 1, technology 1"
        );
    }

    #[rstest]
    fn read_technologies_from_iter_out_of_range(
        dimensions: Dimensions,
        default_parameters: ParameterSet,
    ) {
        let mut rows = technology_rows(&default_parameters, &dimensions);
        rows[0].technology = 3;

        let mut parameters = ParameterSet::default();
        assert_error!(
            read_technologies_from_iter(rows.into_iter(), &dimensions, &mut parameters),
            "Index out of range: facility 0, technology 3 (model has 2F x 3T x 4P)"
        );
    }
}

//! Functionality for running a planning model and saving the results.
use crate::engine::{Mode, solve_with_threads};
use crate::model::Model;
use crate::output::DataWriter;
use crate::solution::Solution;
use anyhow::Result;
use log::{error, info};
use std::path::Path;

/// Plan every facility in a model and write the results.
///
/// A run whose planning fails still writes its (degraded) results, so that the failure is visible
/// in the output files as well as the log.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `mode` - Whether to plan the facilities together or independently
/// * `num_threads` - Maximum number of threads to use in multi mode (0 for all CPUs)
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, mode: Mode, num_threads: usize, output_path: &Path) -> Result<Solution> {
    let mut writer = DataWriter::create(output_path, &model.model_path)?;

    let solution = solve_with_threads(
        &model.dimensions(),
        &model.parameter_set,
        mode,
        num_threads,
    );
    if solution.is_optimal() {
        info!("Objective value: {}", solution.objective);
        info!(
            "Total emissions: {}; total unmet demand: {}",
            solution.metrics.total_emissions, solution.metrics.total_unmet
        );
    } else {
        error!("Planning did not complete; the results written are all zero");
    }

    writer.write_solution(&solution, &model.parameter_set, mode)?;
    writer.flush()?;

    Ok(solution)
}

//! The module responsible for writing output data to disk.
use crate::engine::Mode;
use crate::engine::market::MarketSummary;
use crate::parameter_set::{Dimensions, ParameterSet};
use crate::solution::{Metrics, Solution, SolutionStatus};
use crate::trajectory::DecisionTrajectory;
use anyhow::{Context, Result, ensure};
use itertools::iproduct;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The output file name for production by facility, technology and period
const PRODUCTION_FILE_NAME: &str = "production.csv";

/// The output file name for per-technology decisions
const TECHNOLOGY_PERIODS_FILE_NAME: &str = "technology_periods.csv";

/// The output file name for per-facility decisions
const FACILITY_PERIODS_FILE_NAME: &str = "facility_periods.csv";

/// The output file name for costs in each period
const PERIOD_COSTS_FILE_NAME: &str = "period_costs.csv";

/// The output file name for the results of each facility in multi-facility mode
const FACILITY_SUMMARIES_FILE_NAME: &str = "facility_summaries.csv";

/// The output file name for the objective, status and metrics
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Get the default output directory for the model
pub fn get_output_dir(model_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([results_root, model_name.into()].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
             Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the production CSV file
#[derive(Debug, PartialEq, Serialize)]
struct ProductionRow {
    facility: usize,
    technology: usize,
    period: usize,
    value: f64,
}

/// Represents a row in the technology periods CSV file
#[derive(Debug, PartialEq, Serialize)]
struct TechnologyPeriodRow {
    facility: usize,
    technology: usize,
    period: usize,
    production: f64,
    build: u32,
    capacity: f64,
}

/// Represents a row in the facility periods CSV file
#[derive(Debug, PartialEq, Serialize)]
struct FacilityPeriodRow {
    facility: usize,
    period: usize,
    operating: bool,
    buy: f64,
    sell: f64,
    banked: f64,
    unmet: f64,
    emissions: f64,
    output: f64,
    allocations: f64,
}

/// Represents a row in the period costs CSV file
#[derive(Debug, PartialEq, Serialize)]
struct PeriodCostRow {
    period: usize,
    total_cost: f64,
}

/// Represents a row in the facility summaries CSV file
#[derive(Debug, PartialEq, Serialize)]
struct FacilitySummaryRow {
    facility: usize,
    status: SolutionStatus,
    objective: f64,
    total_emissions: f64,
    total_unmet: f64,
}

/// The contents of the summary file
#[derive(Serialize)]
struct Summary<'a> {
    objective: f64,
    status: SolutionStatus,
    mode: Mode,
    dimensions: Dimensions,
    metrics: &'a Metrics,
    market: MarketSummary,
}

/// An object for writing the results of a run to file
pub struct DataWriter {
    output_path: PathBuf,
    production_writer: csv::Writer<File>,
    technology_periods_writer: csv::Writer<File>,
    facility_periods_writer: csv::Writer<File>,
    period_costs_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to and write the run's metadata
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model_path` - Path to input model
    pub fn create(output_path: &Path, model_path: &Path) -> Result<Self> {
        write_metadata(output_path, model_path).context("Failed to save metadata")?;

        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(&file_path)
                .with_context(|| format!("Could not create {}", file_path.display()))
        };

        Ok(Self {
            output_path: output_path.to_path_buf(),
            production_writer: new_writer(PRODUCTION_FILE_NAME)?,
            technology_periods_writer: new_writer(TECHNOLOGY_PERIODS_FILE_NAME)?,
            facility_periods_writer: new_writer(FACILITY_PERIODS_FILE_NAME)?,
            period_costs_writer: new_writer(PERIOD_COSTS_FILE_NAME)?,
        })
    }

    /// Write every output file for a solution
    pub fn write_solution(
        &mut self,
        solution: &Solution,
        parameters: &ParameterSet,
        mode: Mode,
    ) -> Result<()> {
        self.write_trajectory(&solution.trajectory)?;
        self.write_period_costs(&solution.metrics.total_costs)?;
        if let Some(facility_solutions) = &solution.facility_solutions {
            self.write_facility_summaries(facility_solutions)?;
        }
        self.write_summary(solution, parameters, mode)
    }

    /// Write the decisions for every facility, technology and period
    pub fn write_trajectory(&mut self, trajectory: &DecisionTrajectory) -> Result<()> {
        for (facility, technology, period, value) in trajectory.iter_production() {
            self.production_writer.serialize(ProductionRow {
                facility,
                technology,
                period,
                value,
            })?;
        }

        let Dimensions {
            facilities,
            technologies,
            periods,
        } = trajectory.dimensions();
        for (f, k, t) in iproduct!(0..facilities, 0..technologies, 0..periods) {
            self.technology_periods_writer
                .serialize(TechnologyPeriodRow {
                    facility: f,
                    technology: k,
                    period: t,
                    production: trajectory.production[f][k][t],
                    build: trajectory.build[f][k][t],
                    capacity: trajectory.capacity[f][k][t],
                })?;
        }

        for (f, t) in iproduct!(0..facilities, 0..periods) {
            self.facility_periods_writer.serialize(FacilityPeriodRow {
                facility: f,
                period: t,
                operating: trajectory.operating[f][t],
                buy: trajectory.buy[f][t],
                sell: trajectory.sell[f][t],
                banked: trajectory.banked[f][t],
                unmet: trajectory.unmet[f][t],
                emissions: trajectory.emissions[f][t],
                output: trajectory.output[f][t],
                allocations: trajectory.allocations[f][t],
            })?;
        }

        Ok(())
    }

    /// Write the cost incurred in each period (excluding investment)
    pub fn write_period_costs(&mut self, costs: &[f64]) -> Result<()> {
        for (period, &total_cost) in costs.iter().enumerate() {
            self.period_costs_writer
                .serialize(PeriodCostRow { period, total_cost })?;
        }

        Ok(())
    }

    /// Write one row for each facility planned independently
    fn write_facility_summaries(&self, facility_solutions: &[Solution]) -> Result<()> {
        let file_path = self.output_path.join(FACILITY_SUMMARIES_FILE_NAME);
        let mut writer = csv::Writer::from_path(&file_path)
            .with_context(|| format!("Could not create {}", file_path.display()))?;
        for (facility, solution) in facility_solutions.iter().enumerate() {
            writer.serialize(FacilitySummaryRow {
                facility,
                status: solution.status,
                objective: solution.objective,
                total_emissions: solution.metrics.total_emissions,
                total_unmet: solution.metrics.total_unmet,
            })?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Write the objective, status, metrics and market summary as TOML
    fn write_summary(&self, solution: &Solution, parameters: &ParameterSet, mode: Mode) -> Result<()> {
        let summary = Summary {
            objective: solution.objective,
            status: solution.status,
            mode,
            dimensions: solution.trajectory.dimensions(),
            metrics: &solution.metrics,
            market: MarketSummary::new(solution, parameters),
        };
        let file_path = self.output_path.join(SUMMARY_FILE_NAME);
        fs::write(&file_path, toml::to_string(&summary)?)
            .with_context(|| format!("Could not write {}", file_path.display()))?;

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.production_writer.flush()?;
        self.technology_periods_writer.flush()?;
        self.facility_periods_writer.flush()?;
        self.period_costs_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::solve;
    use crate::fixture::{default_parameters, dimensions, two_technology_parameters};
    use itertools::Itertools;
    use rstest::rstest;
    use std::io::{BufRead, BufReader};
    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<String> {
        let file = File::open(path).unwrap();
        BufReader::new(file).lines().map(Result::unwrap).collect_vec()
    }

    #[rstest]
    fn write_solution_single(two_technology_parameters: ParameterSet) {
        let dimensions = Dimensions::new(1, 2, 2);
        let solution = solve(&dimensions, &two_technology_parameters, Mode::Single);
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), dir.path()).unwrap();
            writer
                .write_solution(&solution, &two_technology_parameters, Mode::Single)
                .unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(
            read_lines(&dir.path().join(PRODUCTION_FILE_NAME)),
            [
                "facility,technology,period,value",
                "0,0,0,0.0",
                "0,0,1,100.0",
                "0,1,0,0.0",
                "0,1,1,0.0"
            ]
        );
        assert_eq!(
            read_lines(&dir.path().join(TECHNOLOGY_PERIODS_FILE_NAME))[1],
            "0,0,0,0.0,1,0.0"
        );
        assert_eq!(
            read_lines(&dir.path().join(FACILITY_PERIODS_FILE_NAME))[0],
            "facility,period,operating,buy,sell,banked,unmet,emissions,output,allocations"
        );
        assert_eq!(read_lines(&dir.path().join(PERIOD_COSTS_FILE_NAME)).len(), 3);
        assert!(!dir.path().join(FACILITY_SUMMARIES_FILE_NAME).exists());
        assert!(dir.path().join(metadata::METADATA_FILE_NAME).exists());

        let summary: toml::Table =
            toml::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(summary["status"].as_str(), Some("optimal"));
        assert_eq!(summary["mode"].as_str(), Some("single"));
        assert_eq!(summary["objective"].as_float(), Some(solution.objective));
        // Emissions of 200 against allocations of 50
        assert_eq!(summary["market"]["position"].as_str(), Some("short"));
    }

    #[rstest]
    fn write_solution_multi(dimensions: Dimensions, default_parameters: ParameterSet) {
        let solution = solve(&dimensions, &default_parameters, Mode::Multi);
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), dir.path()).unwrap();
            writer
                .write_solution(&solution, &default_parameters, Mode::Multi)
                .unwrap();
            writer.flush().unwrap();
        }

        let summaries = read_lines(&dir.path().join(FACILITY_SUMMARIES_FILE_NAME));
        assert_eq!(summaries.len(), 3);
        assert!(summaries[1].starts_with("0,optimal,"));
        assert_eq!(
            read_lines(&dir.path().join(TECHNOLOGY_PERIODS_FILE_NAME)).len(),
            1 + 2 * 3 * 4
        );
    }

    #[test]
    fn create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("new_output");

        // Create a new directory should succeed and return false (no overwrite)
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.exists());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("empty_output");
        fs::create_dir(&output_dir).unwrap();

        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.exists());
    }

    #[test]
    fn create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output_with_files");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("existing_file.txt"), "some content").unwrap();

        // Without overwrite this fails and the file is left alone
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("existing_file.txt").exists());

        // With overwrite the folder is emptied
        let result = create_output_directory(&output_dir, true).unwrap();
        assert!(result);
        assert!(output_dir.exists());
        assert!(!output_dir.join("existing_file.txt").exists());
    }

    #[test]
    fn get_output_dir_uses_model_name() {
        let temp_dir = tempdir().unwrap();
        let model_dir = temp_dir.path().join("my_model");
        fs::create_dir(&model_dir).unwrap();

        let output_dir = get_output_dir(&model_dir, PathBuf::from("ccts_results")).unwrap();
        assert_eq!(output_dir, PathBuf::from("ccts_results/my_model"));
    }
}

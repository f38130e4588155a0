//! Read and validate model parameters from `model.toml`.
//!
//! This module defines the `ModelParameters` struct and helpers for loading and validating the
//! `model.toml` file at the top of every model directory. It gives the size of the problem and
//! the global parameters which apply to every facility.
use crate::engine::Mode;
use crate::input::{input_err_msg, read_toml};
use crate::parameter_set::Dimensions;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The name of the model parameters file in a model directory
pub const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_unmet_demand_penalty, f64, 1000.0);
define_param_default!(default_big_m, f64, 1e6);

/// Model parameters as defined in the `model.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Number of facilities
    pub facilities: usize,
    /// Number of technologies available to each facility
    pub technologies: usize,
    /// Number of planning periods
    pub periods: usize,
    /// How to plan the facilities.
    ///
    /// Defaults to `multi` for models with more than one facility and `single` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// The penalty per unit of demand left unmet
    #[serde(default = "default_unmet_demand_penalty")]
    pub unmet_demand_penalty: f64,
    /// A large constant bounding the problem.
    ///
    /// It is only checked, not used in planning.
    #[serde(default = "default_big_m")]
    pub big_m: f64,
}

/// Check that each dimension is at least one
fn check_dimensions(dimensions: &Dimensions) -> Result<()> {
    ensure!(dimensions.facilities > 0, "`facilities` must be at least 1");
    ensure!(
        dimensions.technologies > 0,
        "`technologies` must be at least 1"
    );
    ensure!(dimensions.periods > 0, "`periods` must be at least 1");

    Ok(())
}

/// Check that the `unmet_demand_penalty` parameter is valid
fn check_unmet_demand_penalty(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "unmet_demand_penalty must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that the `big_m` parameter is valid
fn check_big_m(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "big_m must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Create parameters for a model of the given size with default global parameters
    pub fn new(dimensions: &Dimensions, mode: Option<Mode>) -> Self {
        Self {
            facilities: dimensions.facilities,
            technologies: dimensions.technologies,
            periods: dimensions.periods,
            mode,
            unmet_demand_penalty: default_unmet_demand_penalty(),
            big_m: default_big_m(),
        }
    }

    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// The size of the problem
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.facilities, self.technologies, self.periods)
    }

    /// The planning mode, falling back to the default for the number of facilities
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or(if self.facilities > 1 {
            Mode::Multi
        } else {
            Mode::Single
        })
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_dimensions(&self.dimensions())?;
        check_unmet_demand_penalty(self.unmet_demand_penalty)?;
        check_big_m(self.big_m)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "facilities = 2\ntechnologies = 3\nperiods = 4").unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params.dimensions(), Dimensions::new(2, 3, 4));
        assert_eq!(model_params.mode, None);
        assert_eq!(model_params.unmet_demand_penalty, 1000.0);
        assert_eq!(model_params.big_m, 1e6);
    }

    #[test]
    fn model_params_from_path_with_mode() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "facilities = 2\ntechnologies = 3\nperiods = 4\nmode = \"single\"\n\
                 unmet_demand_penalty = 500.0"
            )
            .unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params.mode(), Mode::Single);
        assert_eq!(model_params.unmet_demand_penalty, 500.0);
    }

    #[test]
    fn model_params_from_path_invalid() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "facilities = 0\ntechnologies = 3\nperiods = 4").unwrap();
        }

        assert!(ModelParameters::from_path(dir.path()).is_err());
    }

    #[rstest]
    #[case(1, None, Mode::Single)]
    #[case(3, None, Mode::Multi)]
    #[case(3, Some(Mode::Single), Mode::Single)]
    #[case(1, Some(Mode::Multi), Mode::Multi)]
    fn mode_default(
        #[case] facilities: usize,
        #[case] mode: Option<Mode>,
        #[case] expected: Mode,
    ) {
        let params = ModelParameters::new(&Dimensions::new(facilities, 3, 4), mode);
        assert_eq!(params.mode(), expected);
    }

    #[rstest]
    #[case(Dimensions::new(0, 1, 1), "`facilities` must be at least 1")]
    #[case(Dimensions::new(1, 0, 1), "`technologies` must be at least 1")]
    #[case(Dimensions::new(1, 1, 0), "`periods` must be at least 1")]
    fn check_dimensions_invalid(#[case] dimensions: Dimensions, #[case] msg: &str) {
        assert_error!(check_dimensions(&dimensions), msg);
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(1000.0, true)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn check_unmet_demand_penalty_works(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(check_unmet_demand_penalty(value).is_ok(), expected_valid);
    }

    #[rstest]
    #[case(1e6, true)]
    #[case(1.0, true)]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    fn check_big_m_works(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(check_big_m(value).is_ok(), expected_valid);
    }
}

//! The model represents the static input data provided by the user.
use crate::engine::Mode;
use crate::parameter_set::{Dimensions, ParameterSet};
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Cost, emissions, capacity and market parameters for every facility
    pub parameter_set: ParameterSet,
}

impl Model {
    /// The number of facilities, technologies and periods in the model
    pub fn dimensions(&self) -> Dimensions {
        self.parameters.dimensions()
    }

    /// The planning mode requested by the model file (or the default for its size)
    pub fn mode(&self) -> Mode {
        self.parameters.mode()
    }
}

//! Code for working with example models.
//!
//! Examples are generated from the default parameters rather than stored as files, so every
//! example can be written out as a model directory of any size.
use crate::engine::Mode;
use crate::input::facility::{FACILITIES_FILE_NAME, facility_rows};
use crate::input::facility_period::{FACILITY_PERIODS_FILE_NAME, facility_period_rows};
use crate::input::period::{PERIODS_FILE_NAME, period_rows};
use crate::input::technology::{TECHNOLOGIES_FILE_NAME, technology_rows};
use crate::model::ModelParameters;
use crate::model::parameters::MODEL_PARAMETERS_FILE_NAME;
use crate::parameter_set::defaults::technology_name;
use crate::parameter_set::{Dimensions, ParameterSet};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// The name of the file describing an extracted example
const README_FILE_NAME: &str = "README.txt";

/// The bundled example models
const EXAMPLES: [Example; 3] = [
    Example {
        name: "default",
        description: "Two steel plants choosing between three technologies over four periods, \
                      planned independently.",
        dimensions: Dimensions {
            facilities: 2,
            technologies: 3,
            periods: 4,
        },
        mode: Mode::Multi,
    },
    Example {
        name: "single_facility",
        description: "One steel plant choosing between three technologies over four periods.",
        dimensions: Dimensions {
            facilities: 1,
            technologies: 3,
            periods: 4,
        },
        mode: Mode::Single,
    },
    Example {
        name: "market",
        description: "A market of twelve steel plants with a mix of strategies, planned in \
                      parallel over eight periods.",
        dimensions: Dimensions {
            facilities: 12,
            technologies: 3,
            periods: 8,
        },
        mode: Mode::Multi,
    },
];

/// Get the names of all examples
pub fn get_example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES.iter().map(|example| example.name)
}

/// A bundled example model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Example {
    name: &'static str,
    description: &'static str,
    dimensions: Dimensions,
    mode: Mode,
}

impl Example {
    /// Get the example with the specified name
    pub fn from_name(name: &str) -> Result<Self> {
        EXAMPLES
            .iter()
            .find(|example| example.name == name)
            .copied()
            .with_context(|| format!("Example '{name}' not found"))
    }

    /// The name of the example
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The size of the example model
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The parameters of the example model
    pub fn parameter_set(&self) -> ParameterSet {
        ParameterSet::with_defaults(&self.dimensions)
    }

    /// A description of this example
    pub fn get_readme(&self) -> String {
        let Dimensions {
            facilities,
            technologies,
            periods,
        } = self.dimensions;
        let mut readme = format!(
            "{}\n\n{} facilities, {} technologies, {} periods ({} mode)\n\nTechnologies:\n",
            self.description, facilities, technologies, periods, self.mode
        );
        for k in 0..technologies {
            writeln!(&mut readme, "  {k}: {}", technology_name(k)).unwrap();
        }

        readme
    }

    /// Extract this example to a new directory, which must not already exist
    pub fn extract(&self, new_path: &Path) -> Result<()> {
        ensure!(
            !new_path.exists(),
            "Destination {} already exists",
            new_path.display()
        );
        fs::create_dir_all(new_path)?;
        self.write_to(new_path)
    }

    /// Write the model files for this example into an existing directory
    pub fn write_to(&self, model_dir: &Path) -> Result<()> {
        let parameters = self.parameter_set();
        let model_parameters = ModelParameters {
            unmet_demand_penalty: parameters.unmet_demand_penalty,
            big_m: parameters.big_m,
            ..ModelParameters::new(&self.dimensions, Some(self.mode))
        };

        fs::write(
            model_dir.join(MODEL_PARAMETERS_FILE_NAME),
            toml::to_string(&model_parameters)?,
        )?;
        fs::write(model_dir.join(README_FILE_NAME), self.get_readme())?;
        write_csv(
            &model_dir.join(FACILITIES_FILE_NAME),
            facility_rows(&parameters),
        )?;
        write_csv(
            &model_dir.join(TECHNOLOGIES_FILE_NAME),
            technology_rows(&parameters, &self.dimensions),
        )?;
        write_csv(
            &model_dir.join(FACILITY_PERIODS_FILE_NAME),
            facility_period_rows(&parameters, &self.dimensions),
        )?;
        write_csv(&model_dir.join(PERIODS_FILE_NAME), period_rows(&parameters))
    }
}

/// Write rows to a new CSV file
fn write_csv<T, I>(file_path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

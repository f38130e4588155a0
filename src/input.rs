//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use crate::parameter_set::{Dimensions, ParameterSet};
use crate::validation::check_parameters;
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::fs;
use std::hash::Hash;
use std::path::Path;

pub mod facility;
use facility::read_facilities;
pub mod facility_period;
use facility_period::read_facility_periods;
pub mod period;
use period::read_periods;
pub mod technology;
use technology::read_technologies;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

fn read_csv_internal<'a, T: DeserializeOwned + 'a>(file_path: &'a Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// A row of an input table which is identified by one or more indices
pub trait IndexedRow {
    /// The indices identifying a row
    type Key: Copy + Eq + Hash;

    /// The indices of this row
    fn key(&self) -> Self::Key;

    /// Every key a complete table must contain, in order
    fn expected_keys(dimensions: &Dimensions) -> Vec<Self::Key>;

    /// A description of a key for error messages
    fn describe(key: Self::Key) -> String;
}

/// Collect rows by their indices, checking that the table is complete.
///
/// Every key in [`IndexedRow::expected_keys`] must appear exactly once and no other keys may
/// appear.
///
/// # Returns
///
/// The rows in the order of [`IndexedRow::expected_keys`].
pub fn index_rows<R, I>(iter: I, dimensions: &Dimensions) -> Result<Vec<R>>
where
    R: IndexedRow,
    I: IntoIterator<Item = R>,
{
    let expected = R::expected_keys(dimensions);
    let mut rows = IndexMap::new();
    for row in iter {
        let key = row.key();
        ensure!(
            expected.contains(&key),
            "Index out of range: {} (model has {dimensions})",
            R::describe(key)
        );
        ensure!(
            rows.insert(key, row).is_none(),
            "Duplicate entry for {}",
            R::describe(key)
        );
    }

    expected
        .into_iter()
        .map(|key| {
            rows.swap_remove(&key)
                .with_context(|| format!("Missing entry for {}", R::describe(key)))
        })
        .collect()
}

/// Read a model from the specified directory.
///
/// The parameters are checked with [`check_parameters`] once they have been read, so a successfully
/// loaded model can be planned.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data ([`Model`]) or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let dimensions = parameters.dimensions();

    let mut parameter_set = ParameterSet {
        unmet_demand_penalty: parameters.unmet_demand_penalty,
        big_m: parameters.big_m,
        ..ParameterSet::default()
    };
    read_facilities(model_dir, &dimensions, &mut parameter_set)?;
    read_technologies(model_dir, &dimensions, &mut parameter_set)?;
    read_facility_periods(model_dir, &dimensions, &mut parameter_set)?;
    read_periods(model_dir, &dimensions, &mut parameter_set)?;
    check_parameters(&parameter_set, &dimensions)?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        parameter_set,
    })
}

//! Write run and program metadata to a TOML file.
//!
//! This module collects information about the current run (model path and start time) and the
//! program which produced it. The aggregated metadata is written as `metadata.toml` in the output
//! directory.
use anyhow::Result;
use chrono::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output filename used for metadata.
pub const METADATA_FILE_NAME: &str = "metadata.toml";

/// Top-level metadata structure serialized to TOML.
///
/// This is written to `metadata.toml` by `write_metadata`.
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata<'a>,
}

/// Information about the model run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run
    model_path: &'a Path,
    /// The date and time on which the run started
    datetime: String,
}

impl<'a> RunMetadata<'a> {
    fn new(model_path: &'a Path) -> Self {
        let dt = Local::now();
        Self {
            model_path,
            datetime: dt.to_rfc2822(),
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The target operating system
    os: &'a str,
    /// The target architecture
    arch: &'a str,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            is_debug: cfg!(debug_assertions),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Write metadata to `metadata.toml` in the given output directory.
///
/// # Arguments
///
/// * `output_path` - Directory where `metadata.toml` will be written.
/// * `model_path` - Path to the model that was executed (recorded in the metadata).
///
/// # Errors
///
/// Returns an error if serializing the metadata or writing the file fails.
pub fn write_metadata(output_path: &Path, model_path: &Path) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata::new(model_path),
        program: ProgramMetadata::default(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_metadata_works() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), Path::new("some/model")).unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let metadata: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(metadata["run"]["model_path"].as_str(), Some("some/model"));
        assert_eq!(
            metadata["program"]["name"].as_str(),
            Some(env!("CARGO_PKG_NAME"))
        );
        assert_eq!(
            metadata["program"]["version"].as_str(),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }
}

//! Plan production, technology investment and emissions allowance trading for facilities covered by
//! a carbon credit trading scheme.
//!
//! The core of the crate is the [`engine`]: a deterministic, greedy, multi-period scheduler which
//! turns a facility's cost, emissions and capacity parameters into a production, investment and
//! trading trajectory, along with an aggregator which does this for many facilities at once.
#![warn(missing_docs)]
use std::env;
use std::path::PathBuf;

pub mod cli;
pub mod engine;
pub mod example;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod parameter_set;
pub mod planning;
pub mod settings;
pub mod solution;
pub mod trajectory;
pub mod validation;

#[cfg(test)]
mod fixture;

/// Environment variable which, if set, overrides the location of the config directory
const CONFIG_DIR_ENV_VAR: &str = "CCTS_CONFIG_DIR";

/// Get the directory in which the program's config files are stored.
///
/// This is `$CCTS_CONFIG_DIR` if that is set, otherwise a `ccts-planner` subfolder of the
/// platform's config directory.
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV_VAR) {
        return dir.into();
    }

    let mut path = dirs::config_dir().expect("Could not determine user config directory");
    path.push("ccts-planner");
    path
}

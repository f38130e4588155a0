//! Logging for the program.
//!
//! Messages are written to the terminal with coloured levels: warnings and errors go to stderr and
//! everything else to stdout. If an output directory is given, messages are also written to
//! `ccts_info.log` (info and below) and `ccts_error.log` (warnings and errors) in that directory.
//!
//! The log level is taken from the `CCTS_LOG_LEVEL` environment variable if set, otherwise from the
//! program settings.
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `CCTS_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level
const LOG_LEVEL_ENV_VAR: &str = "CCTS_LOG_LEVEL";

/// The file name for the log file containing informational messages
const LOG_INFO_FILE_NAME: &str = "ccts_info.log";

/// The file name for the log file containing warnings and errors
const LOG_ERROR_FILE_NAME: &str = "ccts_error.log";

/// Set once the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a log level name, as used in the settings file
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    match LevelFilter::from_str(level) {
        Ok(filter) => Ok(filter),
        Err(_) => bail!(
            "Invalid log level '{level}'. Valid options are: off, error, warn, info, debug, trace"
        ),
    }
}

/// Initialise the program logger using the `fern` logging library.
///
/// # Arguments
///
/// * `log_level_from_settings` - The log level specified in the settings file
/// * `log_file_path` - The folder in which to write log files (if any)
///
/// The logger can only be set once per process, so calls after the first are ignored.
///
/// # Returns
///
/// An error if the log level is invalid or a log file cannot be created.
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    // The environment variable takes precedence over the settings file
    let log_level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| log_level_from_settings.into());
    let log_level = parse_log_level(&log_level)?;

    let use_colour = std::io::stdout().is_terminal();
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let format_terminal = move |out: FormatCallback, message: &Arguments, record: &Record| {
        if use_colour {
            write_log_colour(out, message, record, colours);
        } else {
            write_log_plain(out, message, record);
        }
    };

    let mut dispatch = Dispatch::new()
        // Info and below to stdout
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > Level::Warn)
                .format(format_terminal)
                .level(log_level)
                .chain(std::io::stdout()),
        )
        // Warnings and errors to stderr
        .chain(
            Dispatch::new()
                .format(format_terminal)
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    if let Some(log_file_path) = log_file_path {
        let info_path = log_file_path.join(LOG_INFO_FILE_NAME);
        let error_path = log_file_path.join(LOG_ERROR_FILE_NAME);
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .filter(|metadata| metadata.level() > Level::Warn)
                    .format(write_log_plain)
                    .level(log_level.max(LevelFilter::Info))
                    .chain(
                        fern::log_file(&info_path)
                            .with_context(|| format!("Could not create {}", info_path.display()))?,
                    ),
            )
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Warn)
                    .chain(
                        fern::log_file(&error_path)
                            .with_context(|| format!("Could not create {}", error_path.display()))?,
                    ),
            );
    }

    // Fails only if another thread got there first
    if dispatch.apply().is_ok() {
        LOGGER_INIT.set(()).ok();
    }

    Ok(())
}

/// Write a log message without colours
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "[{} {} {}] {}",
        Local::now().format("%H:%M:%S"),
        record.level(),
        record.target(),
        message
    ));
}

/// Write a log message with the level in colour
fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: ColoredLevelConfig,
) {
    out.finish(format_args!(
        "[{} {} {}] {}",
        Local::now().format("%H:%M:%S"),
        colours.color(record.level()),
        record.target(),
        message
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("error", LevelFilter::Error)]
    #[case("warn", LevelFilter::Warn)]
    #[case("info", LevelFilter::Info)]
    #[case("DEBUG", LevelFilter::Debug)]
    #[case("trace", LevelFilter::Trace)]
    fn parse_log_level_works(#[case] level: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(level).unwrap(), expected);
    }

    #[test]
    fn parse_log_level_invalid() {
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn default_log_level_is_valid() {
        parse_log_level(DEFAULT_LOG_LEVEL).unwrap();
    }
}

//! The CLI commands for working with the program settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;

/// The subcommands for managing the settings file.
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show the contents of the settings file, or the defaults if there isn't one.
    Show,
    /// Show the default settings file contents.
    ShowDefault,
    /// Print the path to the settings file.
    Path,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Show => handle_show_command()?,
            Self::ShowDefault => print!("{}", Settings::default_file_contents()),
            Self::Path => println!("{}", get_settings_file_path().display()),
        }

        Ok(())
    }
}

/// Handle the `settings show` command.
fn handle_show_command() -> Result<()> {
    let file_path = get_settings_file_path();
    if file_path.is_file() {
        let contents = fs::read_to_string(&file_path)
            .with_context(|| format!("Could not read {}", file_path.display()))?;
        print!("{contents}");
    } else {
        eprintln!(
            "No settings file at {}; the defaults are:\n",
            file_path.display()
        );
        print!("{}", Settings::default_file_contents());
    }

    Ok(())
}

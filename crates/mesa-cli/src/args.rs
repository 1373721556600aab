//! Command-line argument definitions

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// History columns exported when no selection is given
pub const DEFAULT_HISTORY_COLUMNS: &[&str] = &[
    "model_number",
    "star_age",
    "star_mass",
    "log_L",
    "log_R",
    "log_Teff",
    "log_center_Rho",
    "log_center_P",
    "center_h1",
    "center_he3",
    "center_he4",
    "star_mdot",
];

/// Extract MESA history and profile data to CSV
#[derive(Debug, Parser)]
#[command(name = "mesa-extract", version, about)]
pub struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export columns of a history file to CSV
    History {
        /// Path to history.data
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Locate a profile by model number and export it to CSV
    Profile {
        /// Path to profiles.index
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Model number to look up
        #[arg(short, long, allow_negative_numbers = true)]
        model: i64,

        /// Use the closest model number when there is no exact match
        #[arg(long)]
        nearest: bool,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Print header fields and column names of a file
    Info {
        /// Path to a history or profile file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Reverse body rows (profile files)
        #[arg(long)]
        reversed: bool,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ExportArgs {
    /// Comma-separated columns to export
    #[arg(short, long, value_delimiter = ',', conflicts_with = "all")]
    pub columns: Vec<String>,

    /// Export every column in file order
    #[arg(long)]
    pub all: bool,

    /// Output CSV path
    #[arg(short, long, default_value = "data.csv")]
    pub output: PathBuf,
}

impl ExportArgs {
    /// Column selection to pass to the writer; empty means every column
    pub fn selection<'a>(&'a self, defaults: &[&'a str]) -> Vec<&'a str> {
        if self.all {
            Vec::new()
        } else if self.columns.is_empty() {
            defaults.to_vec()
        } else {
            self.columns.iter().map(String::as_str).collect()
        }
    }
}

//! `mesa-extract`: export MESA history and profile data to CSV

mod args;

use anyhow::{Context, Result};
use args::{Args, Command, ExportArgs, DEFAULT_HISTORY_COLUMNS};
use clap::Parser;
use mesa_core::{Field, MatchPolicy, MesaData, RowOrder};
use std::path::Path;
use std::process;
use tracing::{debug, info};

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    if let Err(error) = run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Install a stderr subscriber; `RUST_LOG` takes precedence over `--verbose`
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mesa_core={level},mesa_extract={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", level);
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::History { file, export } => {
            let data = mesa_core::read_history(&file)
                .with_context(|| format!("failed to read history file {}", file.display()))?;
            export_csv(&data, &export, DEFAULT_HISTORY_COLUMNS)
        }
        Command::Profile {
            index,
            model,
            nearest,
            export,
        } => {
            let policy = MatchPolicy::from_nearest(nearest);
            let data = mesa_core::find_read_profile(&index, model, policy).with_context(|| {
                format!("failed to load profile for model {} via {}", model, index.display())
            })?;
            // No default subset for profiles
            export_csv(&data, &export, &[])
        }
        Command::Info { file, reversed } => {
            let data = mesa_core::read(&file, RowOrder::from_reversed(reversed))
                .with_context(|| format!("failed to read {}", file.display()))?;
            print_info(&file, &data);
            Ok(())
        }
    }
}

fn export_csv(data: &MesaData, export: &ExportArgs, defaults: &[&str]) -> Result<()> {
    let selection = export.selection(defaults);
    mesa_core::write_csv_file(data, &selection, &export.output)
        .with_context(|| format!("failed to write {}", export.output.display()))?;

    info!(
        rows = data.len(),
        output = %export.output.display(),
        "Export complete"
    );
    println!("Wrote {} rows to {}", data.len(), export.output.display());
    Ok(())
}

fn print_info(file: &Path, data: &MesaData) {
    println!("File: {}", file.display());
    println!("Header:");
    for (name, value) in data.header() {
        // Flag header entries hidden by a column of the same name
        let shadowed = matches!(data.get(name), Some(Field::Column(_)));
        let note = if shadowed { "  (shadowed by column)" } else { "" };
        println!("  {:<24} {}{}", name, value, note);
    }
    println!("Columns ({} rows):", data.len());
    for column in data.columns() {
        println!("  {}", column.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HISTORY: &str = "\
  1  2
  version_number  compiler
  15140  \"gfortran\"

  1  2  3
  model_number  star_age  log_L
  1  1.0D-05  0.5
  2  2.0D-05  0.6
";

    const PROFILE: &str = "\
  1
  model_number
  5

  1  2
  zone  logT
  1  7.1
  2  7.9
";

    fn run_with(argv: &[&str]) -> Result<()> {
        let mut full = vec!["mesa-extract"];
        full.extend_from_slice(argv);
        run(Args::try_parse_from(full)?)
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_history_export_selected_columns() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("history.data");
        let output = dir.path().join("out.csv");
        fs::write(&history, HISTORY).unwrap();

        run_with(&[
            "history",
            path_str(&history),
            "-c",
            "log_L,model_number",
            "-o",
            path_str(&output),
        ])
        .unwrap();

        let csv = fs::read_to_string(&output).unwrap();
        assert_eq!(csv, "log_L,model_number\n0.5,1\n0.6,2\n");
    }

    #[test]
    fn test_profile_export_nearest_all_columns() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("profiles.index");
        let output = dir.path().join("profile.csv");
        fs::write(&index, "2 models\n5 1 1\n").unwrap();
        fs::write(dir.path().join("profile1.data"), PROFILE).unwrap();

        run_with(&[
            "profile",
            path_str(&index),
            "-m",
            "7",
            "--nearest",
            "--all",
            "-o",
            path_str(&output),
        ])
        .unwrap();

        // Profiles are read center-first
        let csv = fs::read_to_string(&output).unwrap();
        assert_eq!(csv, "zone,logT\n2,7.9\n1,7.1\n");
    }

    #[test]
    fn test_missing_default_columns_fail_without_output() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("history.data");
        let output = dir.path().join("out.csv");
        fs::write(&history, HISTORY).unwrap();

        let err = run_with(&["history", path_str(&history), "-o", path_str(&output)]).unwrap_err();
        assert!(format!("{:#}", err).contains("star_mass"));
        assert!(!output.exists());
    }
}

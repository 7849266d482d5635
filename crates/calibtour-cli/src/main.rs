//! Calibtour CLI
//!
//! Orders calibration targets offline and checks run configurations.
//!
//! Usage:
//!     calibtour order --pregrasps data/pregrasps.csv --contacts data/contacts.csv --handles data/handles.txt -o out/
//!     calibtour order --config calib.toml --json
//!     calibtour check-config calib.toml

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use thiserror::Error;

use calibtour_config::{CalibrationConfig, ConfigError, TourConfig};
use calibtour_core::{CalibrationError, DataError, HandleId, TargetSet, Tour};
use calibtour_solver::{EuclideanDistance, TourBuilder, TourSolver};

/// Calibtour - order calibration targets into a short tour
#[derive(Parser)]
#[command(name = "calibtour")]
#[command(version)]
#[command(about = "Orders calibration targets and checks run configurations", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reorder targets along a short tour using the local Euclidean oracle
    Order {
        /// Pre-grasp configurations, one comma-separated line each
        #[arg(long)]
        pregrasps: Option<PathBuf>,

        /// Contact configurations, aligned with the pre-grasps
        #[arg(long)]
        contacts: Option<PathBuf>,

        /// Handle identifiers, one per line
        #[arg(long)]
        handles: Option<PathBuf>,

        /// Run configuration (TOML, or YAML by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory receiving the reordered files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Configuration file (TOML, or YAML by extension)
        file: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("cannot create {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.verbose {
        0 => calibtour_console::init(),
        1 => calibtour_console::init_with("calibtour=debug"),
        _ => calibtour_console::init_with("calibtour=trace"),
    }

    let result = match cli.command {
        Commands::Order {
            pregrasps,
            contacts,
            handles,
            config,
            output_dir,
            json,
        } => load_config(config.as_deref()).and_then(|config| {
            let files = TargetFiles::resolve(&config, pregrasps, contacts, handles);
            let report = order(&config, &files, output_dir.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }),
        Commands::CheckConfig { file } => load_config(Some(&file)).map(|config| {
            println!("{} {}", "ok".bright_green().bold(), file.display());
            print_config_summary(&config);
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Loads and validates a configuration; defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<CalibrationConfig> {
    let Some(path) = path else {
        return Ok(CalibrationConfig::default());
    };
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => CalibrationConfig::from_yaml_file(path)?,
        _ => CalibrationConfig::load(path)?,
    };
    config.validate()?;
    Ok(config)
}

/// The three companion files of a target set.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetFiles {
    pregrasps: PathBuf,
    contacts: PathBuf,
    handles: PathBuf,
}

impl TargetFiles {
    /// Command-line paths win over the configuration's data section.
    fn resolve(
        config: &CalibrationConfig,
        pregrasps: Option<PathBuf>,
        contacts: Option<PathBuf>,
        handles: Option<PathBuf>,
    ) -> Self {
        Self {
            pregrasps: pregrasps.unwrap_or_else(|| config.data.pregrasps.clone()),
            contacts: contacts.unwrap_or_else(|| config.data.contacts.clone()),
            handles: handles.unwrap_or_else(|| config.data.handles.clone()),
        }
    }

    /// Same file names, placed in `dir`.
    fn relocated(&self, dir: &Path) -> Self {
        Self {
            pregrasps: relocate(dir, &self.pregrasps, "pregrasps.csv"),
            contacts: relocate(dir, &self.contacts, "contacts.csv"),
            handles: relocate(dir, &self.handles, "handles.txt"),
        }
    }
}

fn relocate(dir: &Path, file: &Path, fallback: &str) -> PathBuf {
    match file.file_name() {
        Some(name) => dir.join(name),
        None => dir.join(fallback),
    }
}

#[derive(Debug, Serialize)]
struct OrderReport {
    tour: Tour,
    handles: Vec<HandleId>,
    input_order_cost: f64,
    tour_cost: f64,
    savings: f64,
    strategy: &'static str,
    oracle_calls: u64,
    written_to: Option<PathBuf>,
}

/// Loads targets, orders them and optionally writes the reordered files.
fn order(
    config: &CalibrationConfig,
    files: &TargetFiles,
    output_dir: Option<&Path>,
) -> Result<OrderReport> {
    let targets = TargetSet::load(&files.pregrasps, &files.contacts, &files.handles)?;

    let builder = TourBuilder::from_config(config);
    let mut solver = TourSolver::new(EuclideanDistance, builder);
    let solution = solver.solve(&targets.pregrasp_set())?;
    let reordered = targets.reordered(&solution.tour)?;

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir).map_err(|source| CliError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let out = files.relocated(dir);
        reordered.save(&out.pregrasps, &out.contacts, &out.handles)?;
    }

    let statistics = &solution.statistics;
    Ok(OrderReport {
        handles: reordered.handles().cloned().collect(),
        input_order_cost: statistics.input_order_cost,
        tour_cost: statistics.tour_cost,
        savings: statistics.savings(),
        strategy: builder.strategy(),
        oracle_calls: statistics.oracle_calls,
        written_to: output_dir.map(Path::to_path_buf),
        tour: solution.tour,
    })
}

fn print_report(report: &OrderReport) {
    println!();
    println!("{}", "Tour".bright_cyan().bold());
    for (position, (index, handle)) in report.tour.iter().zip(&report.handles).enumerate() {
        println!(
            "  {:>4}  {} {}",
            position.to_string().bright_black(),
            format!("#{index}").white(),
            handle.as_str().bright_white()
        );
    }
    println!();
    println!(
        "  {} {:.4}  (input order {:.4}, saved {:.4})",
        "cost".bright_cyan(),
        report.tour_cost.bright_green().bold(),
        report.input_order_cost,
        report.savings
    );
    println!(
        "  {} {}  ({} oracle calls)",
        "strategy".bright_cyan(),
        report.strategy,
        report.oracle_calls
    );
    if let Some(dir) = &report.written_to {
        println!("  {} {}", "written to".bright_cyan(), dir.display());
    }
}

fn print_config_summary(config: &CalibrationConfig) {
    let strategy = match config.tour {
        TourConfig::NearestNeighbor => "nearest_neighbor".to_string(),
        TourConfig::TwoOpt {
            max_passes: Some(n),
        } => format!("two_opt (max {n} passes)"),
        TourConfig::TwoOpt { max_passes: None } => "two_opt".to_string(),
    };
    println!("  {:<22} {}", "tour", strategy);
    println!("  {:<22} {}", "start_index", config.start_index);
    println!("  {:<22} {}", "return_to_start", config.return_to_start);
    println!("  {:<22} {}", "artifacts_per_solve", config.artifacts_per_solve);
    println!(
        "  {:<22} {}",
        "planner.optimizers",
        config.planner.optimizers.join(", ")
    );
    println!(
        "  {:<22} {}",
        "segment.optimizers",
        config.segment.optimizers.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_targets(dir: &Path) -> TargetFiles {
        let files = TargetFiles {
            pregrasps: dir.join("pregrasps.csv"),
            contacts: dir.join("contacts.csv"),
            handles: dir.join("handles.txt"),
        };
        fs::write(&files.pregrasps, "0,0\n3,0\n1,0\n2,0\n").unwrap();
        fs::write(&files.contacts, "0,1\n3,1\n1,1\n2,1\n").unwrap();
        fs::write(&files.handles, "h0\nh3\nh1\nh2\n").unwrap();
        files
    }

    #[test]
    fn test_cli_parses_order() {
        let cli = Cli::try_parse_from([
            "calibtour",
            "order",
            "--pregrasps",
            "p.csv",
            "--contacts",
            "c.csv",
            "--handles",
            "h.txt",
            "-o",
            "out",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Order {
                pregrasps,
                output_dir,
                json,
                config,
                ..
            } => {
                assert_eq!(pregrasps, Some(PathBuf::from("p.csv")));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(json);
                assert!(config.is_none());
            }
            Commands::CheckConfig { .. } => panic!("expected order"),
        }
    }

    #[test]
    fn test_resolve_falls_back_to_config_data() {
        let config = CalibrationConfig::default();
        let files = TargetFiles::resolve(&config, Some(PathBuf::from("mine.csv")), None, None);
        assert_eq!(files.pregrasps, PathBuf::from("mine.csv"));
        assert_eq!(files.contacts, config.data.contacts);
        assert_eq!(files.handles, config.data.handles);
    }

    #[test]
    fn test_relocated_keeps_file_names() {
        let files = TargetFiles {
            pregrasps: PathBuf::from("data/a.csv"),
            contacts: PathBuf::from("data/b.csv"),
            handles: PathBuf::from(".."),
        };
        let out = files.relocated(Path::new("out"));
        assert_eq!(out.pregrasps, PathBuf::from("out/a.csv"));
        assert_eq!(out.contacts, PathBuf::from("out/b.csv"));
        assert_eq!(out.handles, PathBuf::from("out/handles.txt"));
    }

    #[test]
    fn test_order_writes_reordered_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_targets(dir.path());
        let out_dir = dir.path().join("out");

        let report = order(&CalibrationConfig::default(), &files, Some(&out_dir)).unwrap();
        assert_eq!(report.tour.as_slice(), &[0, 2, 3, 1]);
        assert_eq!(report.input_order_cost, 6.0);
        assert_eq!(report.tour_cost, 3.0);
        assert_eq!(report.oracle_calls, 6);

        let handles = fs::read_to_string(out_dir.join("handles.txt")).unwrap();
        assert_eq!(handles, "h0\nh1\nh2\nh3\n");
        let contacts = fs::read_to_string(out_dir.join("contacts.csv")).unwrap();
        assert_eq!(contacts, "0,1\n1,1\n2,1\n3,1\n");
    }

    #[test]
    fn test_order_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_targets(dir.path());
        let report = order(&CalibrationConfig::default(), &files, None).unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tour"], serde_json::json!([0, 2, 3, 1]));
        assert_eq!(json["strategy"], "nearest_neighbor");
        assert!(json["written_to"].is_null());
    }

    #[test]
    fn test_order_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles {
            pregrasps: dir.path().join("absent.csv"),
            contacts: dir.path().join("absent.csv"),
            handles: dir.path().join("absent.txt"),
        };
        let err = order(&CalibrationConfig::default(), &files, None).unwrap_err();
        assert!(matches!(err, CliError::Data(DataError::Io { .. })));
    }

    #[test]
    fn test_load_config_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("run.yaml");
        fs::write(&yaml, "start_index: 2\ntour:\n  type: two_opt\n").unwrap();
        let config = load_config(Some(&yaml)).unwrap();
        assert_eq!(config.start_index, 2);
        assert_eq!(config.tour, TourConfig::TwoOpt { max_passes: None });

        let toml = dir.path().join("run.toml");
        fs::write(&toml, "return_to_start = false\n").unwrap();
        assert!(!load_config(Some(&toml)).unwrap().return_to_start);

        assert_eq!(load_config(None).unwrap().start_index, 0);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let toml = dir.path().join("bad.toml");
        fs::write(&toml, "[generation]\nmax_attempts = 0\n").unwrap();
        assert!(matches!(
            load_config(Some(&toml)).unwrap_err(),
            CliError::Config(_)
        ));
    }
}

//! GeoMarker CLI - Command-line interface
//!
//! Replays recorded position tracks against a marker configuration, checks
//! configuration files, and computes distances.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geomarker::logging::{init_logging, LogConfig};

use commands::check::CheckArgs;
use commands::distance::DistanceArgs;
use commands::run::RunArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "geomarker", version, about = "Geofenced marker visibility engine")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a position track against a marker configuration
    Run {
        /// Marker configuration file (defaults to the user config directory)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Position track to replay (JSON lines)
        #[arg(short, long, value_name = "FILE")]
        track: PathBuf,

        /// Report per-marker distances and gate results
        #[arg(long)]
        debug: bool,
    },

    /// Validate a marker configuration and list its markers
    Check {
        /// Marker configuration file (defaults to the user config directory)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the great-circle distance between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        /// Latitude of the first point in degrees
        lat1: f64,
        /// Longitude of the first point in degrees
        lon1: f64,
        /// Latitude of the second point in degrees
        lat2: f64,
        /// Longitude of the second point in degrees
        lon2: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}

/// Debug level comes from `--verbose`, `run --debug` or `settings.debug`
/// in the configuration file.
fn log_config(cli: &Cli) -> LogConfig {
    let config_debug = match &cli.command {
        Commands::Run { config, .. } | Commands::Check { config } => {
            commands::common::config_requests_debug(config.clone())
        }
        Commands::Distance { .. } => false,
    };
    let run_debug = matches!(cli.command, Commands::Run { debug: true, .. });

    LogConfig::new(cli.verbose || run_debug || config_debug).with_file(cli.log_file.clone())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _log_guard = init_logging(&log_config(&cli))?;

    tracing::debug!(version = geomarker::VERSION, "Starting geomarker");

    match cli.command {
        Commands::Run {
            config,
            track,
            debug,
        } => commands::run::run(RunArgs {
            config,
            track,
            debug,
        }),
        Commands::Check { config } => commands::check::run(CheckArgs { config }),
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => commands::distance::run(DistanceArgs {
            from: (lat1, lon1),
            to: (lat2, lon2),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "geomarker",
            "run",
            "--config",
            "markers.json",
            "--track",
            "walk.jsonl",
            "--debug",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                config,
                track,
                debug,
            } => {
                assert_eq!(config, Some(PathBuf::from("markers.json")));
                assert_eq!(track, PathBuf::from("walk.jsonl"));
                assert!(debug);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_track() {
        assert!(Cli::try_parse_from(["geomarker", "run"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "geomarker",
            "check",
            "--verbose",
            "--log-file",
            "out.log",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("out.log")));
        assert!(matches!(cli.command, Commands::Check { config: None }));
    }

    #[test]
    fn test_config_debug_raises_log_level() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "markers": [], "settings": { "debug": true } }"#)
            .unwrap();
        let path = file.path().to_str().unwrap();

        let cli =
            Cli::try_parse_from(["geomarker", "run", "--config", path, "--track", "walk.jsonl"])
                .unwrap();
        assert!(log_config(&cli).verbose);

        let cli = Cli::try_parse_from(["geomarker", "check", "--config", path]).unwrap();
        assert!(log_config(&cli).verbose);
    }

    #[test]
    fn test_default_log_level_without_debug() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "settings": { "debug": false } }"#).unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["geomarker", "check", "--config", path]).unwrap();
        assert!(!log_config(&cli).verbose);

        let cli = Cli::try_parse_from(["geomarker", "distance", "0", "0", "0", "1"]).unwrap();
        assert_eq!(log_config(&cli).default_directive(), "info");

        let cli = Cli::try_parse_from([
            "geomarker", "run", "--config", path, "--track", "walk.jsonl", "--debug",
        ])
        .unwrap();
        assert!(log_config(&cli).verbose);
    }

    #[test]
    fn test_parse_distance_with_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["geomarker", "distance", "-33.8688", "151.2093", "0", "-0.5"])
                .unwrap();

        match cli.command {
            Commands::Distance {
                lat1,
                lon1,
                lat2,
                lon2,
            } => {
                assert_eq!(lat1, -33.8688);
                assert_eq!(lon1, 151.2093);
                assert_eq!(lat2, 0.0);
                assert_eq!(lon2, -0.5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

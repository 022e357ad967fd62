use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trip_builder::airports::{AirportDatabase, AirportError};
use trip_builder::domain::PbsDurationParser;
use trip_builder::template::{TemplateError, load_template};
use trip_builder::translate::{
    MissingLayoverPolicy, ReconstructConfig, TranslateError, translate_template,
};

/// Rebuild dated trips from a trip template.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Template JSON file, any supported schema
    template: PathBuf,

    /// Airport database JSON file
    airports: PathBuf,

    /// Directory the trip files are written to
    out_dir: PathBuf,

    /// Replace trip files that already exist
    #[arg(long)]
    overwrite: bool,

    /// What to do when a duty period without a layover is followed by another
    /// (`reject` or `follow`)
    #[arg(
        long,
        env = "TRIP_BUILDER_MISSING_LAYOVER",
        default_value = "reject"
    )]
    missing_layover: MissingLayoverPolicy,

    /// Allowed difference, in minutes, between a reported block total and
    /// the sum of the flights
    #[arg(long, default_value_t = 0)]
    total_tolerance_mins: i64,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Airports(#[from] AirportError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize trip: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trip_builder=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn write_json(path: &Path, json: &str) -> Result<(), CliError> {
    std::fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: Args) -> Result<usize, CliError> {
    let config = ReconstructConfig::new(args.missing_layover, args.total_tolerance_mins);
    let template = load_template(&args.template)?;
    let airports = AirportDatabase::load(&args.airports)?;

    let translation = translate_template(&template, &airports, &PbsDurationParser, &config)?;
    for failure in &translation.failures {
        warn!("{}", failure);
    }

    std::fs::create_dir_all(&args.out_dir).map_err(|source| CliError::Write {
        path: args.out_dir.clone(),
        source,
    })?;

    let mut written = 0;
    for reconstruction in &translation.trips {
        let trip = &reconstruction.trip;
        let path = args
            .out_dir
            .join(format!("{}.json", trip.default_file_name()));
        if path.exists() && !args.overwrite {
            warn!(path = %path.display(), "exists, skipping (pass --overwrite to replace)");
            continue;
        }
        write_json(&path, &serde_json::to_string_pretty(trip)?)?;
        written += 1;
    }

    info!(
        trip = %template.uuid,
        written,
        failed = translation.failures.len(),
        "done"
    );
    Ok(written)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger();

    match run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn positional_paths_and_flags() {
        let args = Args::try_parse_from([
            "trip-builder",
            "trip.json",
            "airports.json",
            "out",
            "--overwrite",
            "--missing-layover",
            "follow",
            "--total-tolerance-mins",
            "5",
        ])
        .unwrap();

        assert_eq!(args.template, PathBuf::from("trip.json"));
        assert_eq!(args.airports, PathBuf::from("airports.json"));
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert!(args.overwrite);
        assert_eq!(args.missing_layover, MissingLayoverPolicy::FollowsRelease);
        assert_eq!(args.total_tolerance_mins, 5);
    }

    #[test]
    fn missing_positional_is_rejected() {
        let err = Args::try_parse_from(["trip-builder", "trip.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Args::try_parse_from([
            "trip-builder",
            "trip.json",
            "airports.json",
            "out",
            "--missing-layover",
            "ignore",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}

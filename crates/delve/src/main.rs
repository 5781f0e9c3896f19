//! delve: BSP dungeon generator
//!
//! Generates one dungeon and prints its map, debug summary and validation
//! report. With `--json` the full result is written as JSON instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delve_core::dungeon::{
    ConnectionReport, DungeonData, DungeonGenerator, DungeonValidator, GenerationPhase,
    ValidationResult,
};
use delve_core::{ConfigError, EdgePreference, GameRng, GenerationSettings};

/// Exit status for `--strict` runs whose dungeon fails validation
const STRICT_FAILURE: u8 = 2;

#[derive(Error, Debug)]
enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid settings file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// BSP dungeon generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Generate a connected BSP dungeon", long_about = None)]
struct Args {
    /// JSON settings file; flags below override its values
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short = 's', long = "seed", conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Pick a fresh random seed
    #[arg(short = 'r', long = "random-seed")]
    random_seed: bool,

    /// Grid width in tiles
    #[arg(short = 'W', long = "width")]
    width: Option<usize>,

    /// Grid height in tiles
    #[arg(short = 'H', long = "height")]
    height: Option<usize>,

    /// Smallest room side
    #[arg(long = "min-room")]
    min_room: Option<usize>,

    /// Largest room side
    #[arg(long = "max-room")]
    max_room: Option<usize>,

    #[arg(long = "corridor-width")]
    corridor_width: Option<usize>,

    /// Maximum BSP recursion depth
    #[arg(short = 'd', long = "depth")]
    depth: Option<usize>,

    /// Preferred map edge for the starting room (any, north, south, east, west, northsouth, eastwest)
    #[arg(short = 'e', long = "edge")]
    edge: Option<EdgePreference>,

    /// Do not carve an exterior entrance
    #[arg(long = "no-entrance")]
    no_entrance: bool,

    /// Assign boss, guard, treasure and laboratory rooms
    #[arg(long = "specialize")]
    specialize: bool,

    /// Print the result as JSON
    #[arg(long = "json")]
    json: bool,

    /// Exit with status 2 when validation reports errors
    #[arg(long = "strict")]
    strict: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Args {
    /// Settings from the config file (or defaults) with flag overrides applied
    fn settings(&self) -> Result<GenerationSettings, CliError> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => GenerationSettings::default(),
        };
        if let Some(seed) = self.seed {
            settings.seed = seed;
        } else if self.random_seed {
            settings.seed = GameRng::from_entropy().seed();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(min) = self.min_room {
            settings.min_room_size = min;
        }
        if let Some(max) = self.max_room {
            settings.max_room_size = max;
        }
        if let Some(width) = self.corridor_width {
            settings.corridor_width = width;
        }
        if let Some(depth) = self.depth {
            settings.max_bsp_depth = depth;
        }
        if let Some(edge) = self.edge {
            settings.starting_point.preferred_edge = edge;
        }
        if self.no_entrance {
            settings.starting_point.create_exterior_entrance = false;
        }
        if self.specialize {
            settings.assign_special_rooms = true;
        }
        Ok(settings)
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    dungeon: &'a DungeonData,
    connection: &'a ConnectionReport,
    validation: &'a ValidationResult,
}

fn load_settings(path: &Path) -> Result<GenerationSettings, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "delve=debug,delve_core=debug"
    } else {
        "delve=info,delve_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: &Args) -> Result<ExitCode, CliError> {
    let settings = args.settings()?;
    let mut generator = DungeonGenerator::new(settings)?;
    let mut on_phase = |phase: GenerationPhase, data: &DungeonData| {
        tracing::debug!(%phase, rooms = data.rooms.len(), doors = data.doors.len(), "phase complete");
    };
    let dungeon = generator.generate_with(&mut on_phase)?;
    let validation = DungeonValidator.validate(&dungeon.data);

    info!(
        seed = dungeon.data.seed,
        rooms = dungeon.data.rooms.len(),
        valid = validation.is_valid,
        "generated dungeon"
    );
    if !dungeon.connection.is_connected() {
        warn!(
            components = dungeon.connection.residual_components,
            "dungeon is not fully connected"
        );
    }

    if args.json {
        let output = JsonOutput {
            dungeon: &dungeon.data,
            connection: &dungeon.connection,
            validation: &validation,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", dungeon.data.render_ascii());
        println!();
        print!("{}", dungeon.data.summary());
        println!();
        print!("{}", validation.report());
    }

    if args.strict && !validation.is_valid {
        return Ok(ExitCode::from(STRICT_FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("delve: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "delve",
            "--seed",
            "9",
            "--width",
            "80",
            "--edge",
            "north",
            "--no-entrance",
            "--specialize",
        ])
        .unwrap();
        let settings = args.settings().unwrap();
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.width, 80);
        assert_eq!(settings.height, GenerationSettings::default().height);
        assert_eq!(settings.starting_point.preferred_edge, EdgePreference::North);
        assert!(!settings.starting_point.create_exterior_entrance);
        assert!(settings.assign_special_rooms);
    }

    #[test]
    fn test_seed_conflicts_with_random_seed() {
        assert!(Args::try_parse_from(["delve", "--seed", "1", "--random-seed"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_edge() {
        assert!(Args::try_parse_from(["delve", "--edge", "up"]).is_err());
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let args = Args::try_parse_from(["delve", "--config", "/nonexistent/delve.json"]).unwrap();
        assert!(matches!(args.settings(), Err(CliError::Io { .. })));
    }

    #[test]
    fn test_partial_json_settings_use_defaults() {
        let settings: GenerationSettings =
            serde_json::from_str(r#"{ "width": 64, "seed": 5 }"#).unwrap();
        assert_eq!(settings.width, 64);
        assert_eq!(settings.seed, 5);
        assert_eq!(settings.starting_point, Default::default());
    }
}

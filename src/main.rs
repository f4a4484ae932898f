//! Sprinkler planner CLI.
//!
//! Plans a watering schedule from a settings file and a zone file, or
//! replays a previously saved schedule.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sprinkler_plan::models::Schedule;
use sprinkler_plan::planner::plan_schedule;
use sprinkler_plan::program::{build_programs, StationMap};
use sprinkler_plan::report::ScheduleReport;
use sprinkler_plan::scheduler::verify_schedule;
use sprinkler_plan::settings::Settings;
use sprinkler_plan::zones::load_zones;

#[derive(Parser)]
#[command(name = "sprinkler-plan")]
#[command(about = "Plan periodic irrigation schedules for sprinkler zones")]
struct Cli {
    /// Settings file (INI or TOML)
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// Zone file (JSON array or TOML [[zone]] tables)
    #[arg(short, long)]
    zones: Option<PathBuf>,

    /// Save the planned schedule to this JSON file
    #[arg(short, long)]
    write_file: Option<PathBuf>,

    /// Load a saved schedule instead of planning
    #[arg(short, long, conflicts_with = "zones")]
    read_file: Option<PathBuf>,

    /// Print the day and zone plans
    #[arg(short, long)]
    print: bool,

    /// Print controller program payloads as JSON
    #[arg(long, requires = "stations")]
    programs: bool,

    /// JSON map of zone name to controller station index
    #[arg(long)]
    stations: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let schedule = match (&cli.read_file, &cli.zones) {
        (Some(path), _) => {
            info!(path = %path.display(), "reading schedule");
            Schedule::load_json(path)
                .with_context(|| format!("reading schedule from {}", path.display()))?
        }
        (None, Some(path)) => {
            let zones = load_zones(path)
                .with_context(|| format!("loading zones from {}", path.display()))?;
            match plan_schedule(&zones, &settings.planner)?.into_schedule() {
                Some(schedule) => schedule,
                None => {
                    println!("No schedule found.");
                    return Ok(());
                }
            }
        }
        (None, None) => bail!("either --zones or --read-file is required"),
    };

    for violation in verify_schedule(&schedule, settings.planner.slot_minutes) {
        warn!(
            kind = ?violation.violation_type,
            entity = %violation.entity_id,
            "{}",
            violation.message
        );
    }

    if let Some(path) = &cli.write_file {
        schedule
            .save_json(path)
            .with_context(|| format!("writing schedule to {}", path.display()))?;
        info!(path = %path.display(), "schedule saved");
    }

    if cli.print {
        print!(
            "{}",
            ScheduleReport::new(&schedule, settings.planner.slot_minutes)
        );
    }

    if cli.programs {
        let Some(path) = &cli.stations else {
            bail!("--programs needs --stations");
        };
        let map: BTreeMap<String, usize> =
            serde_json::from_reader(BufReader::new(File::open(path)?))
                .with_context(|| format!("reading stations from {}", path.display()))?;
        let stations = StationMap::from_pairs(map);
        let programs = build_programs(&schedule, &settings.programs, &stations)?;
        for program in &programs {
            println!("{} {}", program.name, program.payload());
        }
    }

    Ok(())
}

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mc_core::carpet::Priority;
use mc_core::job::{JobFile, JobOptions};
use mc_nesting::{NestingConfig, schedule_with_progress, validate_inputs};
use report::PlanReport;

#[derive(Parser)]
#[command(name = "mat-cutter", version, about = "Arrange EVA mat polygons onto stock sheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a cutting layout from a TOML job file
    Plan {
        /// Path to the job TOML file
        job_file: PathBuf,
        /// Directory for layouts.json and placements.json (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
        /// Report scheduling progress on stderr
        #[arg(long)]
        progress: bool,
    },
    /// Validate a job file and report totals without scheduling
    Check {
        /// Path to the job TOML file
        job_file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan {
            job_file,
            output,
            pretty,
            progress,
        } => run_plan(&job_file, output.as_deref(), pretty, progress),
        Commands::Check { job_file } => run_check(&job_file),
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn nesting_config(options: &JobOptions) -> NestingConfig {
    let mut config = NestingConfig::default();
    if let Some(gap) = options.min_gap_mm {
        config.min_gap_mm = gap;
    }
    config.max_sheet_range_per_order = options.max_sheet_range_per_order;
    config.verbose = options.verbose;
    config
}

fn run_plan(
    job_file: &Path,
    output: Option<&Path>,
    pretty: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(job_file)?;
    let job = JobFile::from_toml(&text)?;
    let (carpets, mut inventory, options) = job.into_inputs()?;
    let config = nesting_config(&options);

    let mut report_progress = |percent: u32, status: &str| {
        eprintln!("[{percent:3}%] {status}");
    };
    let progress_cb: Option<&mut dyn FnMut(u32, &str)> = if progress {
        Some(&mut report_progress)
    } else {
        None
    };
    let outcome = schedule_with_progress(carpets, &mut inventory, &config, progress_cb)?;

    let plan = PlanReport::from_outcome(&outcome);

    match output {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::write(dir.join("layouts.json"), to_json(&plan.layouts, pretty)?)?;
            fs::write(dir.join("placements.json"), to_json(&plan.placements, pretty)?)?;
            fs::write(dir.join("summary.json"), to_json(&plan.summary, pretty)?)?;
            eprintln!(
                "{} sheets, {} placed, {} unplaced, {:.1}% overall usage -> {}",
                plan.summary.sheets_used,
                plan.summary.placed_count,
                plan.summary.unplaced_count,
                plan.summary.overall_usage_percent,
                dir.display()
            );
        }
        None => {
            println!("{}", to_json(&plan, pretty)?);
        }
    }

    let must_unplaced = outcome
        .unplaced
        .iter()
        .filter(|c| c.priority == Priority::Must)
        .count();
    if must_unplaced > 0 {
        eprintln!("{must_unplaced} must-place carpet(s) could not be placed");
        std::process::exit(2);
    }
    Ok(())
}

fn run_check(job_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(job_file)?;
    let job = JobFile::from_toml(&text)?;
    let (carpets, inventory, _) = job.into_inputs()?;
    validate_inputs(&carpets, &inventory)?;

    let total_carpet_area_m2: f64 = carpets.iter().map(|c| c.area()).sum::<f64>() / 1e6;
    let total_sheet_area_m2: f64 = inventory
        .iter()
        .map(|s| s.width_mm() * s.height_mm() * f64::from(s.count))
        .sum::<f64>()
        / 1e6;
    let must_count = carpets
        .iter()
        .filter(|c| c.priority == Priority::Must)
        .count();

    println!("job file OK");
    println!(
        "carpets: {} ({} must-place, {:.2} m2 total)",
        carpets.len(),
        must_count,
        total_carpet_area_m2
    );
    println!(
        "sheets:  {} spec(s), {} piece(s), {:.2} m2 capacity",
        inventory.len(),
        inventory.iter().map(|s| s.count).sum::<u32>(),
        total_sheet_area_m2
    );
    Ok(())
}

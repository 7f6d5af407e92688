mod reports;
mod simulation;
mod world;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use expert_missions::{ExpertMissions, GeneratorConfig};
use simulation::{SimulationParams, SimulationReport};
use world::{SaveFile, SimWorld, WorldSpec};

#[derive(Debug, Parser)]
#[command(name = "expert-missions-harness", version = "0.1.0")]
#[command(about = "Simulated host for exercising expert mission generation and persistence")]
struct Args {
    /// Base seed; defaults to the save file's seed, or the clock
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,

    /// Number of in-game days to simulate
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// First in-game day
    #[arg(long, default_value_t = 1)]
    start_day: u32,

    /// Offers accepted per port visit
    #[arg(long, default_value_t = 1)]
    accept_per_port: usize,

    /// Abandon every n-th accepted mission (0 disables)
    #[arg(long, default_value_t = 5)]
    abandon_every: usize,

    /// World description (JSON); defaults to the built-in archipelago
    #[arg(long)]
    world: Option<PathBuf>,

    /// Generator tuning overlay (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save file to resume from and write back to
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start_time = Instant::now();
    let config = load_config(&args)?;
    let spec = match &args.world {
        Some(path) => WorldSpec::from_path(path)?,
        None => WorldSpec::default_archipelago(),
    };
    let mut world = SimWorld::from_spec(&spec)?;
    let mut save = match &args.save {
        Some(path) => SaveFile::open(path)
            .with_context(|| format!("opening save file {}", path.display()))?,
        None => SaveFile::in_memory(),
    };

    let mut session = match args.seed {
        Some(seed) => {
            info!("using seed {seed} from the command line");
            ExpertMissions::new(config, seed)
        }
        None => {
            let mut session = ExpertMissions::with_clock_seed(config);
            session.on_load(&save);
            info!("resuming with seed {}", session.base_seed());
            session
        }
    };

    if args.verbose {
        eprintln!(
            "{} seed {} over {} days from day {}",
            "🚢 Expert mission harness".bright_green().bold(),
            session.base_seed(),
            args.days,
            args.start_day
        );
    }

    let params = SimulationParams {
        start_day: args.start_day,
        days: args.days,
        accept_per_port: args.accept_per_port,
        abandon_every: args.abandon_every,
        ..SimulationParams::default()
    };
    let report = simulation::run(&mut session, &mut world, &mut save, params)?;

    if args.save.is_some() {
        session
            .on_save(&mut save, &report.expert_mission_indices)
            .context("writing final save state")?;
    }

    write_report(&args, &report, start_time)?;

    if !report.passed() {
        bail!("{} simulation checks failed", report.failures.len());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let Some(path) = &args.config else {
        return Ok(GeneratorConfig::default_config());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    GeneratorConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn write_report(args: &Args, report: &SimulationReport, start_time: Instant) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout()),
    };
    match args.report.as_str() {
        "json" => reports::write_json_report(&mut out, report)?,
        "markdown" => reports::write_markdown_report(&mut out, report)?,
        _ => reports::write_console_report(&mut out, report, start_time.elapsed())?,
    }
    out.flush()?;
    Ok(())
}

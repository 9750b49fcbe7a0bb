use anyhow::{Context, Result};
use beans_core::config::AppConfig;
use beans_core::init_logging;
use beans_lib::app::App;
use beans_lib::report::{ConsoleSimulationReport, SimulationReport};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (.toml or .json); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many rounds; runs until extinction when omitted
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Seed for a reproducible run, overriding the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log filter directive, e.g. "debug" or "beans_core=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Print the final world state as JSON after the report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if args.seed.is_some() {
        config.world.seed = args.seed;
    }

    let mut app = App::new(config).context("Failed to set up simulation")?;
    app.run(args.rounds)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ConsoleSimulationReport.generate(&app.world, &mut out)?;

    if args.json {
        let state = app.last_state().cloned().unwrap_or_default();
        writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
    }
    Ok(())
}

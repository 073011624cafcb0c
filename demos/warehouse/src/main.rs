//! warehouse: command-line runner for the AGV simulator.
//!
//! Loads an optional TOML run configuration and a map (a built-in preset or
//! a `.json`/`.csv` map file), runs to completion and prints the run summary.
//! With `--out`, per-tick summaries, agent snapshots and the event log are
//! written as CSV.
//!
//! ```text
//! warehouse run --config scenario.toml --map warehouse --out output/run1
//! warehouse run --scenario fault-response --inject 120:breakdown:AGV-002
//! warehouse export-map --map factory --out factory.json
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use agv_core::Tick;
use agv_grid::{Algorithm, GridMap, MapDocument, presets};
use agv_output::{CsvWriter, SimOutputObserver};
use agv_schedule::Policy;
use agv_sim::{
    EventTarget, PerturbationKind, RunState, RunSummary, ScenarioPreset, Sim, SimBuilder, SimConfig,
    SimObserver, Snapshot, TickReport,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a simulation.
    Run(RunArgs),

    /// Write a map to a `.json` or `.csv` file.
    ExportMap {
        /// Preset name or map file.
        #[arg(long, default_value = "simulation")]
        map: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// List the scenario presets.
    Scenarios,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset name (simulation, default, warehouse, factory) or map file.
    #[arg(long, default_value = "simulation")]
    map: String,

    /// Scenario preset applied over the configuration.
    #[arg(long)]
    scenario: Option<ScenarioPreset>,

    #[arg(long)]
    policy: Option<Policy>,

    #[arg(long)]
    algorithm: Option<Algorithm>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    agents: Option<usize>,

    #[arg(long)]
    tasks: Option<usize>,

    #[arg(long)]
    max_ticks: Option<u64>,

    /// Events to inject, as `TICK:KIND[:TARGET]` (e.g. `120:breakdown:AGV-002`).
    #[arg(long)]
    inject: Vec<Injection>,

    /// Directory for CSV output.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the run summary as JSON.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Sleep between ticks according to the configured speed.
    #[arg(long)]
    paced: bool,

    /// Log a progress line every N ticks.
    #[arg(long, default_value_t = 100)]
    progress_every: u64,
}

// ── Injected events ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Injection {
    at:     u64,
    kind:   PerturbationKind,
    target: EventTarget,
}

impl FromStr for Injection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let at = parts
            .next()
            .and_then(|t| t.trim().parse::<u64>().ok())
            .filter(|&t| t > 0)
            .ok_or_else(|| format!("{s:?}: expected a positive tick before the first ':'"))?;
        let kind = parts
            .next()
            .ok_or_else(|| format!("{s:?}: missing event kind"))?
            .parse::<PerturbationKind>()
            .map_err(|e| e.to_string())?;
        let target = match parts.next() {
            Some(t) => t.parse::<EventTarget>().map_err(|e| e.to_string())?,
            None => EventTarget::Random,
        };
        Ok(Self { at, kind, target })
    }
}

// ── Console observer ──────────────────────────────────────────────────────────

/// Logs periodic progress and forwards to the CSV observer when one is set.
struct Console {
    output: Option<SimOutputObserver<CsvWriter>>,
    every:  u64,
    rows:   usize,
}

impl SimObserver for Console {
    fn on_tick_start(&mut self, tick: Tick) {
        if let Some(out) = &mut self.output {
            out.on_tick_start(tick);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        if self.every > 0 && tick.is_multiple_of(self.every) {
            log::info!(
                "{tick}: {} active, {} charging, {} down | tasks {} pending, {} in progress, {} done | battery {:.1}%",
                report.active,
                report.charging,
                report.maintenance,
                report.tasks.pending,
                report.tasks.in_progress,
                report.tasks.completed,
                report.mean_battery,
            );
        }
        if let Some(out) = &mut self.output {
            out.on_tick_end(tick, report);
        }
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.rows += snapshot.agents.len();
        if let Some(out) = &mut self.output {
            out.on_snapshot(snapshot);
        }
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        if let Some(out) = &mut self.output {
            out.on_sim_end(summary);
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    log::debug!("{cli:#?}");

    match cli.command {
        Command::Run(args) => run(args),
        Command::ExportMap { map, out } => {
            let grid = load_map(&map)?;
            let name = out.file_stem().and_then(|s| s.to_str()).unwrap_or("map");
            grid.to_document(name)
                .save(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            log::info!("wrote {}x{} map to {}", grid.width(), grid.height(), out.display());
            Ok(())
        }
        Command::Scenarios => {
            for preset in ScenarioPreset::ALL {
                let s = preset.scenario();
                println!(
                    "{:<15} {} AGVs, {} tasks, {} policy, {}% failure rate",
                    preset.as_str(),
                    s.agent_count,
                    s.task_count,
                    s.policy,
                    s.failure_rate
                );
            }
            Ok(())
        }
    }
}

fn load_map(map: &str) -> Result<GridMap> {
    let path = Path::new(map);
    if path.extension().is_some() {
        let doc = MapDocument::load(path).with_context(|| format!("failed to load map {map}"))?;
        return GridMap::from_document(&doc).with_context(|| format!("invalid map {map}"));
    }
    match presets::by_name(map) {
        Some(grid) => Ok(grid),
        None => bail!("unknown map preset {map:?} (expected simulation, default, warehouse or factory)"),
    }
}

fn load_config(args: &RunArgs) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<SimConfig>(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(preset) = args.scenario {
        config.apply(&preset.scenario());
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n) = args.agents {
        config.agent_count = n;
    }
    if let Some(n) = args.tasks {
        config.task_count = n;
    }
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }
    config.validate().context("invalid run configuration")?;
    Ok(config)
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let grid = load_map(&args.map)?;
    log::info!(
        "map {}x{}, seed {}, {} policy, {} search",
        grid.width(),
        grid.height(),
        config.seed,
        config.policy,
        config.algorithm
    );

    let mut sim = SimBuilder::new(config, grid).build().context("failed to build simulation")?;

    let output = match &args.out {
        Some(dir) => {
            let writer = CsvWriter::new(dir).with_context(|| format!("failed to open {}", dir.display()))?;
            Some(SimOutputObserver::new(writer))
        }
        None => None,
    };
    let mut console = Console { output, every: args.progress_every, rows: 0 };

    let mut injections = args.inject.clone();
    injections.sort_by_key(|i| i.at);

    let t0 = Instant::now();
    let summary = drive(&mut sim, &mut console, &injections, args.paced)?;
    let elapsed = t0.elapsed();

    if let Some(e) = console.output.as_mut().and_then(SimOutputObserver::take_error) {
        log::error!("output error: {e}");
    }

    println!("Simulation finished in {:.3} s", elapsed.as_secs_f64());
    println!("  {summary}");
    if let Some(reason) = summary.end_reason {
        println!("  ended: {reason}");
    }
    println!("  warnings: {}, errors: {}", summary.warnings, summary.errors);
    if let Some(dir) = &args.out {
        println!("  {} snapshot rows written to {}", console.rows, dir.display());
    }

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Run to the end, stopping at each injection tick to fire its event.
fn drive(sim: &mut Sim, console: &mut Console, injections: &[Injection], paced: bool) -> Result<RunSummary> {
    sim.start()?;
    for inj in injections {
        let now = sim.now().0;
        if inj.at > now {
            sim.run_ticks(inj.at - now, console)?;
        }
        if sim.state() != RunState::Running {
            log::warn!("run ended before tick {}; skipping {}", inj.at, inj.kind);
            break;
        }
        if let Err(e) = sim.inject_event(inj.kind, inj.target) {
            log::warn!("could not inject {} on {}: {e}", inj.kind, inj.target);
        }
    }
    if sim.state() == RunState::Stopped {
        return Ok(sim.summary());
    }
    let summary = if paced { sim.run_paced(console)? } else { sim.run(console)? };
    Ok(summary)
}

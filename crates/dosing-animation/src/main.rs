//! Runs one dosing scenario through the dose sweep and writes the report the
//! renderer consumes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dose_sweep::{load_config, load_scenario, CommandEngine, DosingReport, Simulator, SweepConfig};
use prometheus::Registry;
use prometheus_bridge::{encode_text, InstrumentedEngine, SweepMetrics};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn cli() -> Command {
    Command::new("dosing-animation")
        .about("Sweep candidate bolus sizes through a forecast engine and emit an animation report")
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .required(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Scenario JSON file"),
        )
        .arg(
            Arg::new("engine")
                .long("engine")
                .required(true)
                .value_name("PROGRAM")
                .help("Forecast engine executable (JSON on stdin, JSON on stdout)"),
        )
        .arg(
            Arg::new("engine-arg")
                .long("engine-arg")
                .value_name("ARG")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .help("Argument passed to the engine; repeatable"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Sweep config JSON"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write the report here instead of stdout"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Forecast candidate doses concurrently"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Per-call engine timeout"),
        )
        .arg(
            Arg::new("metrics-out")
                .long("metrics-out")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write Prometheus text metrics here after the run"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
}

/// `RUST_LOG` overrides the default filter. Logs go to stderr so the report
/// can be piped from stdout.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dose_sweep=info,dosing_animation=debug"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn sweep_config(matches: &ArgMatches) -> Result<SweepConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => load_config(path)
            .with_context(|| format!("loading sweep config {}", path.display()))?,
        None => SweepConfig::default(),
    };
    if matches.get_flag("parallel") {
        config.parallel = true;
    }
    if let Some(ms) = matches.get_one::<u64>("timeout-ms") {
        config.call_timeout_ms = Some(*ms);
    }
    config.validate()?;
    Ok(config)
}

fn write_metrics(registry: &Registry, path: &Path) -> Result<()> {
    let text = encode_text(registry)?;
    fs::write(path, text).with_context(|| format!("writing metrics to {}", path.display()))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    let config = sweep_config(&matches)?;
    let scenario_path = matches
        .get_one::<PathBuf>("scenario")
        .context("--scenario is required")?;
    let program = matches
        .get_one::<String>("engine")
        .context("--engine is required")?;
    let engine_args = matches
        .get_many::<String>("engine-arg")
        .map(|args| args.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    let engine = CommandEngine::new(program)
        .args(engine_args)
        .with_config(&config);
    let registry = Registry::new();
    let metrics = SweepMetrics::new(&registry)?;
    let engine = InstrumentedEngine::new(engine, &metrics);

    let scenario = load_scenario(scenario_path)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;
    let result = Simulator::new(&engine, &config).simulate(&scenario.state);
    metrics.observe_sweep(&result);
    if let Some(path) = matches.get_one::<PathBuf>("metrics-out") {
        write_metrics(&registry, path)?;
    }
    let simulation = result.map_err(|err| {
        error!(scenario = %scenario.name, error = %err, "dose sweep failed");
        err
    })?;

    let report = DosingReport::assemble(scenario.name, &config, simulation)?;
    let encoded = serde_json::to_string_pretty(&report)?;
    match matches.get_one::<PathBuf>("out") {
        Some(path) => {
            fs::write(path, encoded)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{encoded}"),
    }
    Ok(())
}

//! `connector-lint`: validate a connector registry the way the extension
//! test suite does: properties, js files on disk, id uniqueness.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use scrobble_proto::config::Config;
use scrobble_proto::connectors::{load_registry, validate_registry, RegistryReport};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "connector-lint", version, about = "Validate a connector registry")]
struct Cli {
    /// Registry file (JSON array or TOML [[connector]] list).
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Directory that connector js paths are relative to.
    #[arg(long)]
    src_root: Option<PathBuf>,

    /// Config file to read defaults from; written with defaults if missing.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only print failing checks.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,connector_lint=debug")),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_or_init(path),
        None => {
            let default_path = Config::config_path();
            if default_path.exists() {
                Config::load_from(&default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn print_report(report: &RegistryReport, quiet: bool) {
    for result in &report.results {
        let name = result.check.describe(&result.label);
        match &result.outcome {
            Ok(()) if !quiet => println!("  ok    {}", name),
            Ok(()) => {}
            Err(e) => println!("  FAIL  {}: {}", name, e),
        }
    }
    let failing = report.results.len() - report.passed();
    println!();
    println!("{} passing, {} failing", report.passed(), failing);
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    let registry = cli.registry.unwrap_or(config.connectors.registry);
    let src_root = cli.src_root.unwrap_or(config.connectors.src_root);
    debug!("Registry {:?}, source root {:?}", registry, src_root);

    let entries = load_registry(&registry)?;
    info!("Validating {} connectors", entries.len());

    let report = validate_registry(&entries, &src_root);
    print_report(&report, cli.quiet);
    Ok(report.is_ok())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("connector-lint: {:#}", e);
            ExitCode::from(2)
        }
    }
}

//! `costclear` – serve costmap clear requests over stdin/stdout.
//!
//! ```text
//! costclear [--config <path>] [--write-config]
//! ```
//!
//! Reads `~/.costclear/config.toml` (or `--config`), builds the layer stack
//! it describes and answers one JSON command per line; see [`session`].
//! `--write-config` saves the effective configuration and exits.

mod config;
mod session;
mod stack;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use costclear_kernel::{ClearOrchestrator, LayerFilter, SharedPose};
use costclear_runtime::{ClearCostmapService, CostmapEventBus, init_tracing};
use tokio::sync::broadcast::error::RecvError;

use crate::config::Config;
use crate::session::Session;

/// Serve costmap clear requests over stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "costclear")]
#[command(version)]
#[command(long_about = None)]
struct Args {
    /// Config file (default `~/.costclear/config.toml`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective configuration and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> ExitCode {
    let telemetry = init_tracing("costclear");
    if telemetry.exporting() {
        tracing::info!("exporting spans over OTLP");
    }

    let args = Args::parse();

    let path = args.config.unwrap_or_else(config::config_path);
    let cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.write_config {
        return match config::save_to(&cfg, &path) {
            Ok(()) => {
                eprintln!("{} {}", "✓ Config written to".green(), path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "Error saving config".red(), e);
                ExitCode::FAILURE
            }
        };
    }

    let costmap = match stack::build(&cfg) {
        Ok(costmap) => costmap,
        Err(e) => {
            eprintln!("{}: {}", "Invalid grid".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let pose = Arc::new(SharedPose::new(cfg.pose));
    let orchestrator = ClearOrchestrator::new(
        costmap,
        pose.clone(),
        LayerFilter::new(cfg.clearable_layers.clone()),
    );

    let bus = CostmapEventBus::default();
    let watcher = spawn_event_printer(&bus);
    let service = ClearCostmapService::new(orchestrator, bus);

    eprintln!(
        "{} {} ({} layers, clearable: {})",
        "costclear".bold().cyan(),
        cfg.costmap_name.bold(),
        cfg.layers.len(),
        cfg.clearable_layers.join(", ")
    );
    for name in service.service_names() {
        eprintln!("  • {name}");
    }

    let session = Session::new(service, pose);
    let served = session.run(io::stdin().lock(), io::stdout().lock());

    // Dropping the session drops the last bus sender, which ends the printer.
    drop(session);
    if watcher.join().is_err() {
        tracing::warn!("event printer panicked");
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Read error".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Echo every [`CostmapEvent`][costclear_types::CostmapEvent] on stderr.
fn spawn_event_printer(bus: &CostmapEventBus) -> std::thread::JoinHandle<()> {
    let mut rx = bus.subscribe();
    std::thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(event) => {
                    eprintln!(
                        "{} {} on {}: cleared {}, skipped {}",
                        "✓".green(),
                        event.report.operation.to_string().bold(),
                        event.costmap,
                        event.report.cleared.len(),
                        event.report.skipped.len()
                    );
                    for skip in &event.report.skipped {
                        eprintln!("    {} {} ({:?})", "skipped".yellow(), skip.layer, skip.reason);
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "event printer lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

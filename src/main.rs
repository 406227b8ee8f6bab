//! portsweep binary entry point.
//!
//! Wires the CLI surface to the scan engine: parse and validate arguments,
//! resolve the host once, run the concurrent scan, and stream open ports to
//! stdout. Exits 0 on a completed scan regardless of how many ports were
//! open; non-zero on argument or pre-scan failures.

use anyhow::Context;
use clap::Parser;
use portsweep::cli::Args;
use portsweep::config::AppSettings;
use portsweep::engine::ScanEngine;
use portsweep::output::{self, stdout_reporter};
use portsweep::types::{PortRange, Target};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            output::print_warning(&format!("ignoring settings file: {e}"));
            AppSettings::default()
        }
    };

    let ports: PortRange = args.ports.parse().context("invalid port range")?;
    let target = Target::new(&args.host, args.transport(), ports)?;

    // Resolve once: a bad host fails the whole scan here, not per port
    let resolved = target.resolve().await.context("cannot scan target")?;
    debug!(host = %resolved, "target resolved");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            output::print_warning("interrupted, winding down outstanding probes");
            interrupt.cancel();
        }
    });

    let engine = ScanEngine::new(args.scan_options(&settings));
    let mut session = engine.scan(&resolved, cancel);

    let progress = args
        .verbose
        .then(|| output::scan_progress(ports.len() as u64));
    let mut reporter = stdout_reporter();
    let mut open = 0usize;

    while let Some(result) = session.recv().await {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        if result.is_open() {
            open += 1;
        }
        reporter.report(&result)?;
    }
    session.join().await?;
    reporter.flush()?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    debug!(open, "scan finished");

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "portsweep=debug"
    } else {
        "portsweep=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

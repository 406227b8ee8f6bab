//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. The
//! transport selector is a required, mutually exclusive flag pair;
//! everything else falls back to the settings file, then to built-ins.

use crate::config::AppSettings;
use crate::engine::ScanOptions;
use crate::types::Transport;
use clap::{ArgGroup, Parser};
use std::time::Duration;

/// A concurrent TCP/UDP port reachability scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version)]
#[command(about = "A concurrent TCP/UDP port reachability scanner", long_about = None)]
#[command(group(ArgGroup::new("transport").required(true).multiple(false)))]
pub struct Args {
    /// Host address to scan (hostname or IP literal)
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Probe with TCP (connection-oriented)
    #[arg(short = 't', long, group = "transport")]
    pub tcp: bool,

    /// Probe with UDP (connectionless; silence counts as open)
    #[arg(short = 'u', long, group = "transport")]
    pub udp: bool,

    /// Port range to scan, both bounds inclusive
    #[arg(short = 'p', long, value_name = "N1-N2")]
    pub ports: String,

    /// Per-probe timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum concurrent probes; 0 means unbounded fan-out
    #[arg(short = 'c', long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Abort the scan after this many seconds, reporting the rest inconclusive
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Verbose output (progress bar and lifecycle logs on stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The transport selected by the mutually exclusive flags.
    pub fn transport(&self) -> Transport {
        if self.udp {
            Transport::Udp
        } else {
            Transport::Tcp
        }
    }

    /// Merge flags over settings-file defaults into engine options.
    pub fn scan_options(&self, settings: &AppSettings) -> ScanOptions {
        let timeout_ms = self.timeout.unwrap_or(settings.default_timeout_ms);
        let concurrency = self
            .max_concurrency
            .unwrap_or(settings.default_concurrency);

        ScanOptions {
            timeout: Duration::from_millis(timeout_ms),
            max_concurrency: (concurrency > 0).then_some(concurrency),
            deadline: self.deadline.map(Duration::from_secs),
        }
    }
}

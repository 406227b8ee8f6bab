//! Result reporting.
//!
//! A `Reporter` is the single writer for scan output: it consumes results
//! from the engine's channel one at a time and emits one line per open
//! port, so concurrent probes can never interleave partial lines. Closed
//! and inconclusive ports are not printed.
//!
//! Diagnostics (warnings, errors, progress) go to stderr, keeping stdout
//! machine-clean.

use crate::probe::ProbeResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

/// Formats open-port results as `<TRANSPORT> <PORT> <SERVICE>` lines.
///
/// The service column is empty (but still delimited) when the port is not
/// in the well-known table, e.g. `TCP 54321 `.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to the given sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Emit one result. Non-open results are skipped.
    pub fn report(&mut self, result: &ProbeResult) -> io::Result<()> {
        if !result.is_open() {
            return Ok(());
        }
        writeln!(
            self.out,
            "{} {} {}",
            result.transport,
            result.port,
            result.service.unwrap_or("")
        )
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// A reporter bound to stdout.
pub fn stdout_reporter() -> Reporter<io::Stdout> {
    Reporter::new(io::stdout())
}

/// Progress bar over the scanned range, drawn on stderr.
pub fn scan_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

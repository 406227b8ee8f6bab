//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Ordinary per-port
//! outcomes (closed, timed out) are not errors; only whole-scan-invalidating
//! conditions live here.

use thiserror::Error;

/// Main error type for scanning operations.
///
/// Host-resolution failures are caught before fan-out and live in
/// [`TargetError`](crate::types::TargetError).
#[derive(Error, Debug)]
pub enum ScanError {
    /// The process ran out of socket resources mid-scan (EMFILE class).
    /// Surfaced once for the whole scan; bounding concurrency avoids it.
    #[error("out of socket resources: {0} (lower --max-concurrency)")]
    ResourceExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

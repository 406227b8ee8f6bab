//! # portsweep - A Concurrent Port Reachability Scanner
//!
//! portsweep probes a host across a numeric port range, one probe per port,
//! and reports which ports accept connections together with a best-effort
//! service-name guess from a static well-known-port table.
//!
//! ## Features
//!
//! - **TCP and UDP probing**: full-handshake TCP connect, plus UDP with the
//!   conventional "silence means open" heuristic
//! - **Concurrent fan-out**: one async task per port, with an optional
//!   concurrency bound to cap socket usage on wide ranges
//! - **Loss-free collection**: exactly one result per port, delivered in
//!   completion order over a single-consumer channel
//! - **Cancellation**: Ctrl-C and an optional whole-scan deadline resolve
//!   outstanding probes to a distinct inconclusive state
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::engine::{ScanEngine, ScanOptions};
//! use portsweep::types::{PortRange, Target, Transport};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ports: PortRange = "1-1024".parse()?;
//!     let target = Target::new("127.0.0.1", Transport::Tcp, ports)?;
//!     let resolved = target.resolve().await?;
//!
//!     let engine = ScanEngine::new(ScanOptions::default());
//!     let mut session = engine.scan(&resolved, CancellationToken::new());
//!
//!     while let Some(result) = session.recv().await {
//!         if result.is_open() {
//!             println!("{} is open", result.port);
//!         }
//!     }
//!     session.join().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated ports, ranges, transports, and targets
//! - [`probe`] - One-shot connection attempts per transport
//! - [`engine`] - Concurrent fan-out, join barrier, cancellation
//! - [`output`] - Single-writer result reporting
//! - [`services`] - The static well-known-port table
//! - [`config`] - Settings-file defaults
//! - [`error`] - Scan error types

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod probe;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use engine::{ScanEngine, ScanOptions, ScanSession};
pub use error::{ScanError, ScanResult};
pub use probe::{PortState, ProbeResult, Prober};
pub use types::{Port, PortRange, ResolvedTarget, Target, Transport};

//! Probe abstraction - one connection attempt per port.
//!
//! Defines a common interface for transport-specific probers, enabling
//! polymorphism and easier testing. A probe makes exactly one outbound
//! attempt, owns its socket for its duration, and releases it on every
//! exit path.

pub mod tcp;
pub mod udp;

use crate::error::ScanResult;
use crate::services::service_name;
use crate::types::{Port, Transport};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

pub use tcp::TcpProber;
pub use udp::UdpProber;

/// State of a probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// A connection could be established.
    Open,
    /// The connection attempt was refused, unreachable, or timed out.
    Closed,
    /// The probe was cut short by cancellation or the scan deadline
    /// before it learned anything.
    Inconclusive,
}

impl PortState {
    /// Whether this state counts as reachable.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Result of probing a single port. Produced exactly once per port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// The port that was probed.
    pub port: Port,
    /// Transport the probe used.
    pub transport: Transport,
    /// What the probe learned.
    pub state: PortState,
    /// Well-known service name; populated only for open ports.
    pub service: Option<&'static str>,
}

impl ProbeResult {
    /// An open port, with its service name looked up from the static table.
    pub fn open(port: Port, transport: Transport) -> Self {
        Self {
            port,
            transport,
            state: PortState::Open,
            service: service_name(transport, port.as_u16()),
        }
    }

    /// A closed (or filtered) port.
    pub fn closed(port: Port, transport: Transport) -> Self {
        Self {
            port,
            transport,
            state: PortState::Closed,
            service: None,
        }
    }

    /// A port whose probe was interrupted before completion.
    pub fn inconclusive(port: Port, transport: Transport) -> Self {
        Self {
            port,
            transport,
            state: PortState::Inconclusive,
            service: None,
        }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

/// Trait for transport-specific probe implementations.
///
/// Ordinary failures (refused, unreachable, timed out) are outcomes folded
/// into the returned [`ProbeResult`], not errors. The only error a probe
/// may surface is socket-resource exhaustion, which invalidates the whole
/// scan rather than the single port.
#[async_trait]
pub trait Prober: Send + Sync {
    /// The transport this prober uses.
    fn transport(&self) -> Transport;

    /// The target IP address.
    fn target(&self) -> IpAddr;

    /// The per-probe timeout.
    fn timeout(&self) -> Duration;

    /// Probe a single port with one connection attempt.
    async fn probe(&self, port: Port) -> ScanResult<ProbeResult>;
}

/// Create a prober for the given transport.
pub fn create_prober(transport: Transport, target: IpAddr, timeout: Duration) -> Arc<dyn Prober> {
    match transport {
        Transport::Tcp => Arc::new(TcpProber::new(target, timeout)),
        Transport::Udp => Arc::new(UdpProber::new(target, timeout)),
    }
}

/// EMFILE-class socket failures invalidate the whole scan, not one port.
pub(crate) fn is_exhaustion(e: &io::Error) -> bool {
    // EMFILE (24) / ENFILE (23): the fd table is full
    matches!(e.raw_os_error(), Some(23) | Some(24)) || e.kind() == io::ErrorKind::OutOfMemory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_state_display() {
        assert_eq!(PortState::Open.to_string(), "open");
        assert_eq!(PortState::Closed.to_string(), "closed");
        assert_eq!(PortState::Inconclusive.to_string(), "inconclusive");
    }

    #[test]
    fn test_open_result_carries_service() {
        let port = Port::new(80).unwrap();
        let result = ProbeResult::open(port, Transport::Tcp);
        assert!(result.is_open());
        assert_eq!(result.service, Some("HTTP"));
    }

    #[test]
    fn test_open_result_unknown_service() {
        let port = Port::new(54321).unwrap();
        let result = ProbeResult::open(port, Transport::Tcp);
        assert!(result.is_open());
        assert_eq!(result.service, None);
    }

    #[test]
    fn test_closed_result_has_no_service() {
        let port = Port::new(80).unwrap();
        let result = ProbeResult::closed(port, Transport::Tcp);
        assert!(!result.is_open());
        assert_eq!(result.service, None);
    }

    #[test]
    fn test_factory_picks_transport() {
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let prober = create_prober(Transport::Udp, ip, Duration::from_secs(1));
        assert_eq!(prober.transport(), Transport::Udp);
        assert_eq!(prober.target(), ip);
    }
}

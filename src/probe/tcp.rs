//! TCP connect prober.
//!
//! Performs a full TCP handshake using the operating system's socket API.
//! "Open" means the handshake completed before the timeout; refusal,
//! unreachability, and timeout all count as closed.

use crate::error::{ScanError, ScanResult};
use crate::probe::{is_exhaustion, ProbeResult, Prober};
use crate::types::{Port, Transport};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Prober for connection-oriented scanning.
///
/// Uses standard connect() calls, so no elevated privileges are needed.
/// The stream is dropped as soon as the handshake outcome is known; no
/// data is exchanged.
pub struct TcpProber {
    target: IpAddr,
    timeout: Duration,
}

impl TcpProber {
    /// Create a new TCP prober.
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn transport(&self) -> Transport {
        Transport::Tcp
    }

    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: Port) -> ScanResult<ProbeResult> {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(ProbeResult::open(port, Transport::Tcp))
            }
            Ok(Err(e)) if is_exhaustion(&e) => Err(ScanError::ResourceExhausted(e.to_string())),
            // Refused and unreachable are expected outcomes, not faults
            Ok(Err(_)) => Ok(ProbeResult::closed(port, Transport::Tcp)),
            // No handshake within the timeout
            Err(_) => Ok(ProbeResult::closed(port, Transport::Tcp)),
        }
    }
}

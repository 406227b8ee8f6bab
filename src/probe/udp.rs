//! UDP prober.
//!
//! UDP has no handshake, so "open" is a weak signal. The probe sends one
//! empty datagram and waits up to the timeout for either data (open) or an
//! ICMP port-unreachable error surfaced on the socket (closed).
//!
//! Silence means open. Most UDP services ignore unsolicited datagrams and
//! many networks drop ICMP, so no response within the timeout is reported
//! as open. This matches real-world UDP scan ambiguity and is preserved
//! deliberately; callers should read UDP results accordingly.

use crate::error::{ScanError, ScanResult};
use crate::probe::{is_exhaustion, ProbeResult, Prober};
use crate::types::{Port, Transport};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// One empty datagram; no service-specific payloads, no handshake.
const PROBE_PAYLOAD: &[u8] = b"\x00";

/// Prober for connectionless scanning.
pub struct UdpProber {
    target: IpAddr,
    timeout: Duration,
}

impl UdpProber {
    /// Create a new UDP prober.
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    async fn exchange(&self, addr: SocketAddr) -> ScanResult<bool> {
        // Bind to an ephemeral local port matching the target's family
        let local_addr: SocketAddr = if self.target.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };

        let socket = UdpSocket::bind(local_addr).await.map_err(|e| {
            if is_exhaustion(&e) {
                ScanError::ResourceExhausted(e.to_string())
            } else {
                ScanError::Io(e)
            }
        })?;

        // Connecting routes ICMP errors for this destination back to us
        if socket.connect(addr).await.is_err() {
            return Ok(false);
        }
        if socket.send(PROBE_PAYLOAD).await.is_err() {
            return Ok(false);
        }

        let mut buf = [0u8; 512];
        match timeout(self.timeout, socket.recv(&mut buf)).await {
            // Any data back means something is listening
            Ok(Ok(_)) => Ok(true),
            // ICMP unreachable surfaces here as a recv error
            Ok(Err(e)) => {
                let msg = e.to_string().to_lowercase();
                if e.kind() == std::io::ErrorKind::ConnectionRefused || msg.contains("unreachable")
                {
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            // Silence: open by policy (see module docs)
            Err(_) => Ok(true),
        }
    }
}

#[async_trait]
impl Prober for UdpProber {
    fn transport(&self) -> Transport {
        Transport::Udp
    }

    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: Port) -> ScanResult<ProbeResult> {
        let addr = SocketAddr::new(self.target, port.as_u16());

        let result = match self.exchange(addr).await {
            Ok(true) => ProbeResult::open(port, Transport::Udp),
            Ok(false) => ProbeResult::closed(port, Transport::Udp),
            Err(e @ ScanError::ResourceExhausted(_)) => return Err(e),
            // A socket we failed to set up tells us nothing about the port
            Err(_) => ProbeResult::closed(port, Transport::Udp),
        };

        Ok(result)
    }
}

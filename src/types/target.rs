//! Scan target types and one-shot host resolution.
//!
//! A `Target` names what to scan: host, transport, and port range. Hostname
//! resolution happens exactly once, before any probe is spawned, so a bad
//! hostname fails the whole scan a single time instead of once per port.

use crate::types::{PortRange, Transport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Error type for target validation and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("failed to resolve host '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for host '{0}'")]
    NoAddressesFound(String),
}

/// What to scan: a host, a transport, and an inclusive port range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    transport: Transport,
    ports: PortRange,
}

impl Target {
    /// Create a new target. The host must be non-empty.
    pub fn new(
        host: impl Into<String>,
        transport: Transport,
        ports: PortRange,
    ) -> Result<Self, TargetError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(TargetError::EmptyHost);
        }
        Ok(Self {
            host,
            transport,
            ports,
        })
    }

    /// The host as given on the command line.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn ports(&self) -> PortRange {
        self.ports
    }

    /// Resolve the host to a concrete address.
    ///
    /// IP literals short-circuit; hostnames go through the system resolver.
    /// Of multiple resolved addresses the first is used.
    pub async fn resolve(&self) -> Result<ResolvedTarget, TargetError> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(ResolvedTarget::new(self.clone(), ip));
        }

        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

        let response = resolver
            .lookup_ip(self.host.as_str())
            .await
            .map_err(|e| TargetError::DnsResolutionFailed(self.host.clone(), e.to_string()))?;

        let ip = response
            .iter()
            .next()
            .ok_or_else(|| TargetError::NoAddressesFound(self.host.clone()))?;

        Ok(ResolvedTarget::new(self.clone(), ip))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.transport, self.host, self.ports)
    }
}

/// A target whose host has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// The original host string (hostname or IP literal).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
    /// Transport to probe with.
    pub transport: Transport,
    /// Ports to probe.
    pub ports: PortRange,
}

impl ResolvedTarget {
    fn new(target: Target, ip: IpAddr) -> Self {
        Self {
            original: target.host,
            ip,
            transport: target.transport,
            ports: target.ports,
        }
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> PortRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(matches!(
            Target::new("  ", Transport::Tcp, range("1-10")),
            Err(TargetError::EmptyHost)
        ));
    }

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let target = Target::new("127.0.0.1", Transport::Tcp, range("1-10")).unwrap();
        let resolved = target.resolve().await.unwrap();
        assert_eq!(resolved.ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(resolved.original, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let target = Target::new("::1", Transport::Udp, range("53")).unwrap();
        let resolved = target.resolve().await.unwrap();
        assert!(resolved.ip.is_ipv6());
    }

    #[test]
    fn test_display() {
        let target = Target::new("example.com", Transport::Tcp, range("1-1024")).unwrap();
        assert_eq!(target.to_string(), "TCP example.com 1-1024");
    }
}

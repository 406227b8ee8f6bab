//! Transport protocol selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network transport used for a probe.
///
/// TCP is connection-oriented: an open port completes the handshake.
/// UDP is connectionless, so openness is inferred from weaker signals
/// (see the `probe::udp` module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" | "t" => Ok(Self::Tcp),
            "udp" | "u" => Ok(Self::Udp),
            _ => Err(format!("unknown transport: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        assert_eq!(Transport::Tcp.to_string(), "TCP");
        assert_eq!(Transport::Udp.to_string(), "UDP");
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("tcp".parse::<Transport>().unwrap(), Transport::Tcp);
        assert_eq!("u".parse::<Transport>().unwrap(), Transport::Udp);
        assert!("icmp".parse::<Transport>().is_err());
    }
}

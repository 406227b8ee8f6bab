//! Service-name guesses for well-known ports.
//!
//! Provides a static mapping from (transport, port) to a conventional
//! service name. A hit is a best-effort label, not a detection: nothing
//! stops an operator from running SSH on 80.

use crate::types::Transport;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Static map of well-known (transport, port) pairs to service names.
static PORT_SERVICES: LazyLock<HashMap<(Transport, u16), &'static str>> = LazyLock::new(|| {
    use Transport::{Tcp, Udp};
    let mut m = HashMap::new();

    // Connection-oriented services
    m.insert((Tcp, 20), "FTP");
    m.insert((Tcp, 21), "FTP");
    m.insert((Tcp, 22), "SSH");
    m.insert((Tcp, 23), "Telnet");
    m.insert((Tcp, 25), "SMTP");
    m.insert((Tcp, 53), "DNS");
    m.insert((Tcp, 80), "HTTP");
    m.insert((Tcp, 110), "POP3");
    m.insert((Tcp, 123), "NTP");
    m.insert((Tcp, 143), "IMAP");
    m.insert((Tcp, 443), "HTTPS");
    m.insert((Tcp, 465), "SMTPS");
    m.insert((Tcp, 587), "SMTP");
    m.insert((Tcp, 993), "IMAPS");
    m.insert((Tcp, 995), "POP3S");
    m.insert((Tcp, 3306), "MySQL");
    m.insert((Tcp, 3389), "RDP");
    m.insert((Tcp, 5432), "PostgreSQL");

    // Datagram services
    m.insert((Udp, 53), "DNS");
    m.insert((Udp, 67), "DHCP");
    m.insert((Udp, 68), "DHCP");
    m.insert((Udp, 69), "TFTP");
    m.insert((Udp, 123), "NTP");
    m.insert((Udp, 137), "NetBIOS");
    m.insert((Udp, 138), "NetBIOS");
    m.insert((Udp, 139), "NetBIOS");
    m.insert((Udp, 161), "SNMP");
    m.insert((Udp, 162), "SNMP");
    m.insert((Udp, 389), "LDAP");
    m.insert((Udp, 500), "IKE");
    m.insert((Udp, 1701), "L2TP");
    m.insert((Udp, 1812), "RADIUS");
    m.insert((Udp, 1813), "RADIUS");
    m.insert((Udp, 1900), "SSDP");

    m
});

/// Look up the probable service name for a port on a given transport.
///
/// Returns `None` if the pair is not in the well-known table.
pub fn service_name(transport: Transport, port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&(transport, port)).copied()
}

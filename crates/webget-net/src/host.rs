//! Host Validation
//!
//! Pure checks on the host and scheme parts of a URL. Nothing here resolves
//! names or touches the network, so every decision is made before a
//! connection is attempted.

use std::net::Ipv4Addr;

/// Longest host name accepted (RFC 1035)
const MAX_HOST_LEN: usize = 253;

/// Longest single label accepted (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// Why a host was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host is empty")]
    Empty,

    #[error("host starts or ends with '.'")]
    EdgeDot,

    #[error("host contains an empty label")]
    EmptyLabel,

    #[error("host is longer than {MAX_HOST_LEN} characters")]
    TooLong,

    #[error("label '{0}' is longer than {MAX_LABEL_LEN} characters")]
    LabelTooLong(String),

    #[error("illegal character {0:?} in host")]
    IllegalCharacter(char),

    #[error("label '{0}' starts or ends with '-'")]
    HyphenPlacement(String),

    #[error("label '{0}' contains consecutive hyphens")]
    ConsecutiveHyphens(String),

    #[error("'{0}' is not a dotted-quad IPv4 address")]
    MalformedAddress(String),

    #[error("zero address is not a valid destination")]
    ZeroAddress,

    #[error("multicast address {0} is not a valid destination")]
    MulticastAddress(Ipv4Addr),
}

/// Validate a host: a DNS-style name or a dotted-quad IPv4 literal.
///
/// A host without a single letter in it can only be an address, so it must
/// be a well-formed four-octet unicast address. Everything else is checked
/// label by label.
pub fn validate_host(host: &str) -> Result<(), HostError> {
    if host.is_empty() {
        return Err(HostError::Empty);
    }
    if host.starts_with('.') || host.ends_with('.') {
        return Err(HostError::EdgeDot);
    }
    if host.len() > MAX_HOST_LEN {
        return Err(HostError::TooLong);
    }

    if !has_alpha(host) {
        let addr = parse_address(host)
            .ok_or_else(|| HostError::MalformedAddress(host.to_string()))?;
        if is_zero_address(&addr) {
            return Err(HostError::ZeroAddress);
        }
        if is_multicast(&addr) {
            return Err(HostError::MulticastAddress(addr));
        }
        return Ok(());
    }

    for label in host.split('.') {
        validate_label(label)?;
    }
    Ok(())
}

fn validate_label(label: &str) -> Result<(), HostError> {
    if label.is_empty() {
        return Err(HostError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(HostError::LabelTooLong(label.to_string()));
    }
    if let Some(c) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
        return Err(HostError::IllegalCharacter(c));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(HostError::HyphenPlacement(label.to_string()));
    }
    if has_illegal_hyphens(label) {
        return Err(HostError::ConsecutiveHyphens(label.to_string()));
    }
    Ok(())
}

/// True if a label has a run of hyphens that is not the `xn--` prefix of an
/// IDNA A-label. Runs of three or more are never legal.
pub fn has_illegal_hyphens(label: &str) -> bool {
    if label.contains("---") {
        return true;
    }
    let rest = match label.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("xn--") => &label[4..],
        _ => label,
    };
    rest.contains("--")
}

/// True if the host has at least one ASCII letter
pub fn has_alpha(host: &str) -> bool {
    host.bytes().any(|b| b.is_ascii_alphabetic())
}

/// Parse a strict dotted quad: exactly four decimal octets, no leading zeros.
pub fn parse_address(host: &str) -> Option<Ipv4Addr> {
    host.parse().ok()
}

pub fn is_zero_address(addr: &Ipv4Addr) -> bool {
    addr.is_unspecified()
}

/// 224.0.0.0 through 239.255.255.255
pub fn is_multicast(addr: &Ipv4Addr) -> bool {
    addr.is_multicast()
}

/// Default port for a scheme, 0 if the scheme has none
pub fn default_port(scheme: &str) -> u16 {
    match scheme {
        "http" => 80,
        "https" => 443,
        "ftp" => 21,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_host("example.com"), Ok(()));
        assert_eq!(validate_host("a.b-c.de"), Ok(()));
        assert_eq!(validate_host("1337.net"), Ok(()));
        assert_eq!(validate_host("localhost"), Ok(()));
        assert_eq!(validate_host("xn--bcher-kva.example"), Ok(()));
    }

    #[test]
    fn test_edge_dots() {
        assert_eq!(validate_host("."), Err(HostError::EdgeDot));
        assert_eq!(validate_host(".."), Err(HostError::EdgeDot));
        assert_eq!(validate_host(".www.foo.bar"), Err(HostError::EdgeDot));
        assert_eq!(validate_host("www.foo.bar."), Err(HostError::EdgeDot));
        assert_eq!(validate_host("www..bar"), Err(HostError::EmptyLabel));
    }

    #[test]
    fn test_hyphens() {
        assert!(matches!(validate_host("-a.b.co"), Err(HostError::HyphenPlacement(_))));
        assert!(matches!(validate_host("a.b-.co"), Err(HostError::HyphenPlacement(_))));
        assert!(matches!(validate_host("-error-.invalid"), Err(HostError::HyphenPlacement(_))));
        assert!(matches!(validate_host("a.b--c.de"), Err(HostError::ConsecutiveHyphens(_))));
        assert!(matches!(validate_host("a.b---c.de"), Err(HostError::ConsecutiveHyphens(_))));
    }

    #[test]
    fn test_illegal_hyphens() {
        assert!(!has_illegal_hyphens("b-c"));
        assert!(!has_illegal_hyphens("xn--nxasmq6b"));
        assert!(has_illegal_hyphens("b--c"));
        assert!(has_illegal_hyphens("xn---abc"));
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(validate_host("foo_bar.com"), Err(HostError::IllegalCharacter('_')));
        assert_eq!(validate_host("foo%2e.com"), Err(HostError::IllegalCharacter('%')));
    }

    #[test]
    fn test_addresses() {
        assert_eq!(validate_host("142.42.1.1"), Ok(()));
        assert_eq!(validate_host("223.255.255.254"), Ok(()));
        assert_eq!(validate_host("0.0.0.0"), Err(HostError::ZeroAddress));
        assert_eq!(
            validate_host("224.1.1.1"),
            Err(HostError::MulticastAddress(Ipv4Addr::new(224, 1, 1, 1)))
        );
        assert_eq!(
            validate_host("239.255.255.255"),
            Err(HostError::MulticastAddress(Ipv4Addr::new(239, 255, 255, 255)))
        );
    }

    #[test]
    fn test_malformed_addresses() {
        for host in ["1.1.1.1.1", "123.123.123", "3628126748", "256.1.1.1", "01.2.3.4", "1.2.3-4"] {
            assert!(
                matches!(validate_host(host), Err(HostError::MalformedAddress(_))),
                "{} should be malformed",
                host
            );
        }
    }

    #[test]
    fn test_lengths() {
        let label = "a".repeat(64);
        assert!(matches!(validate_host(&label), Err(HostError::LabelTooLong(_))));
        let host = vec!["abcdefghi"; 26].join(".");
        assert_eq!(validate_host(&host), Err(HostError::TooLong));
    }

    #[test]
    fn test_default_port() {
        assert_eq!(default_port("http"), 80);
        assert_eq!(default_port("https"), 443);
        assert_eq!(default_port("ftp"), 21);
        assert_eq!(default_port("ftps"), 0);
        assert_eq!(default_port("rdar"), 0);
    }
}

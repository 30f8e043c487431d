//! Address classification helpers.
//!
//! Path filtering only needs one capability: deciding whether an address
//! belongs to a private (non globally routable) range. [`AddressClassifier`]
//! captures that so the filter does not care which address family or
//! policy is in use.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Capability: "is this address private?"
pub trait AddressClassifier: Send + Sync {
    fn is_private(&self, address: &str) -> bool;
}

impl<F> AddressClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_private(&self, address: &str) -> bool {
        self(address)
    }
}

/// Literal prefix match on the IPv4 text form:
/// 127.0.0.1, 10/8, 172.16/12 and 192.168/16.
static RFC1918_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(^127\.0\.0\.1)|(^10\.)|(^172\.1[6-9]\.)|(^172\.2[0-9]\.)|(^172\.3[0-1]\.)|(^192\.168\.)",
    )
    .expect("Invalid rfc1918 regex")
});

/// IPv4-only textual classifier. IPv6 literals never match and are
/// therefore always treated as public.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc1918Pattern;

impl AddressClassifier for Rfc1918Pattern {
    fn is_private(&self, address: &str) -> bool {
        RFC1918_PATTERN.is_match(address)
    }
}

/// Classifier that parses the address first and understands both families.
///
/// IPv4: loopback (127/8), 10/8, 172.16/12, 192.168/16.
/// IPv6: loopback (::1) and unique local addresses (fc00::/7).
/// Unparseable input is treated as public.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParsedPrivateRanges;

impl AddressClassifier for ParsedPrivateRanges {
    fn is_private(&self, address: &str) -> bool {
        is_private_ip(address).unwrap_or(false)
    }
}

/// Which classifier the path filter uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressPolicy {
    /// IPv4 text prefix match
    #[default]
    Pattern,
    /// Parsed IPv4 and IPv6 ranges
    Parsed,
}

impl AddressPolicy {
    pub fn classifier(self) -> Box<dyn AddressClassifier> {
        match self {
            AddressPolicy::Pattern => Box::new(Rfc1918Pattern),
            AddressPolicy::Parsed => Box::new(ParsedPrivateRanges),
        }
    }
}

impl std::str::FromStr for AddressPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(AddressPolicy::Pattern),
            "parsed" => Ok(AddressPolicy::Parsed),
            other => Err(format!("unknown address policy '{}'", other)),
        }
    }
}

/// Check if an IP address is private (RFC 1918 or loopback for IPv4,
/// RFC 4193 or loopback for IPv6)
pub fn is_private_ip(ip: &str) -> Result<bool, String> {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(ipv4)) => Ok(is_private_v4(ipv4)),
        Ok(IpAddr::V6(ipv6)) => Ok(is_private_v6(ipv6)),
        Err(_) => Err(format!("Invalid IP address: {}", ip)),
    }
}

fn is_private_v4(ipv4: Ipv4Addr) -> bool {
    let octets = ipv4.octets();
    ipv4.is_loopback() ||
        // 10.0.0.0/8
        octets[0] == 10 ||
        // 172.16.0.0/12
        (octets[0] == 172 && (16..=31).contains(&octets[1])) ||
        // 192.168.0.0/16
        (octets[0] == 192 && octets[1] == 168)
}

fn is_private_v6(ipv6: Ipv6Addr) -> bool {
    let segments = ipv6.segments();
    // fc00::/7
    ipv6.is_loopback() || segments[0] & 0xfe00 == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_private_ranges() {
        let c = Rfc1918Pattern;
        assert!(c.is_private("127.0.0.1"));
        assert!(c.is_private("10.0.0.5"));
        assert!(c.is_private("172.16.1.1"));
        assert!(c.is_private("172.31.255.1"));
        assert!(c.is_private("192.168.1.1"));

        assert!(!c.is_private("172.15.0.1"));
        assert!(!c.is_private("172.32.0.1"));
        assert!(!c.is_private("8.8.8.8"));
        assert!(!c.is_private("127.0.0.2"));
    }

    #[test]
    fn test_pattern_is_literal_prefix() {
        // Textual match only: no canonicalisation and no IPv6
        assert!(Rfc1918Pattern.is_private("10.garbage"));
        assert!(!Rfc1918Pattern.is_private("fd00::1"));
    }

    #[test]
    fn test_parsed_ranges() {
        let c = ParsedPrivateRanges;
        assert!(c.is_private("127.0.0.2"));
        assert!(c.is_private("172.20.0.1"));
        assert!(c.is_private("fd12:3456::1"));
        assert!(c.is_private("::1"));
        assert!(!c.is_private("2001:db8::1"));
        assert!(!c.is_private("8.8.4.4"));
        assert!(!c.is_private("not-an-address"));
    }

    #[test]
    fn test_closure_classifier() {
        let only_a = |addr: &str| addr == "A";
        assert!(only_a.is_private("A"));
        assert!(!only_a.is_private("B"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("pattern".parse::<AddressPolicy>(), Ok(AddressPolicy::Pattern));
        assert_eq!("parsed".parse::<AddressPolicy>(), Ok(AddressPolicy::Parsed));
        assert!("ipv6".parse::<AddressPolicy>().is_err());
    }
}

//! Hostname to IPv4 resolution

use crate::AddressError;
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use tracing::debug;

/// Name lookup backend used when a host is not an IPv4 literal
pub trait Resolver: Send + Sync {
    /// Return every IPv4 address the name maps to
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>>;
}

/// Resolver backed by the operating system (`getaddrinfo`). Blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        let addrs = (host, 0u16).to_socket_addrs()?;
        Ok(addrs
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .collect())
    }
}

/// Map `host` to exactly one IPv4 address.
///
/// Dotted-decimal literals are returned as-is without consulting the
/// resolver. A name that yields zero addresses, or more than one distinct
/// address, is rejected rather than picking one arbitrarily.
pub fn resolve_ipv4<R: Resolver + ?Sized>(host: &str, resolver: &R) -> Result<Ipv4Addr, AddressError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }

    let failed = || AddressError::HostResolutionFailed {
        host: host.to_string(),
    };

    let answers = resolver.lookup_ipv4(host).map_err(|e| {
        debug!(host, error = %e, "Name lookup failed");
        failed()
    })?;

    let mut unique: Vec<Ipv4Addr> = Vec::with_capacity(answers.len());
    for ip in answers {
        if !unique.contains(&ip) {
            unique.push(ip);
        }
    }

    match unique.as_slice() {
        [ip] => {
            debug!(host, ip = %ip, "Resolved host");
            Ok(*ip)
        }
        _ => {
            debug!(host, count = unique.len(), "Host did not resolve to exactly one address");
            Err(failed())
        }
    }
}

//! Endpoint string parsing
//!
//! An endpoint is either a Unix-domain socket path (`/var/run/app.sock`) or
//! a `host:port` pair (`10.0.0.5:9000`, `backend-host:9000`).

use crate::resolve::{resolve_ipv4, Resolver};
use crate::{AddressError, SocketAddress};

/// Build a socket address from an endpoint string.
pub fn parse_endpoint<R: Resolver + ?Sized>(
    endpoint: &str,
    resolver: &R,
) -> Result<SocketAddress, AddressError> {
    if endpoint.is_empty() {
        return Err(AddressError::EmptyEndpoint);
    }

    if endpoint.starts_with('/') {
        return SocketAddress::unix(endpoint);
    }

    // Split on the first colon only; bracketed IPv6 is not supported.
    let (host, port_text) = endpoint
        .split_once(':')
        .ok_or_else(|| AddressError::MissingPort {
            endpoint: endpoint.to_string(),
        })?;

    let port = parse_port(port_text)?;
    let ip = resolve_ipv4(host, resolver)?;

    Ok(SocketAddress::inet(ip, port))
}

/// Build the address for `endpoint` into `slot` and return its serialized
/// length. `None` is treated like an empty endpoint.
///
/// `slot` is only written on success; on failure it keeps whatever it held.
pub fn make_addr<R: Resolver + ?Sized>(
    endpoint: Option<&str>,
    resolver: &R,
    slot: &mut Option<SocketAddress>,
) -> Result<usize, AddressError> {
    let addr = parse_endpoint(endpoint.unwrap_or_default(), resolver)?;
    let len = addr.serialized_len();
    *slot = Some(addr);
    Ok(len)
}

/// Digits only; `u16::from_str` alone would also take a leading `+`.
fn parse_port(text: &str) -> Result<u16, AddressError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::InvalidPort {
            port: text.to_string(),
        });
    }
    match text.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(AddressError::InvalidPort {
            port: text.to_string(),
        }),
    }
}

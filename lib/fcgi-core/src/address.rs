//! Socket address descriptors handed to the connection layer

use crate::AddressError;
use serde::Serialize;
use socket2::SockAddr;
use std::fmt;
use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;

/// Bytes of `sockaddr_un` that precede `sun_path`.
#[cfg(unix)]
pub const UNIX_ADDR_HEADER_LEN: usize = mem::offset_of!(libc::sockaddr_un, sun_path);
#[cfg(not(unix))]
pub const UNIX_ADDR_HEADER_LEN: usize = 2;

/// Size of `sockaddr_un.sun_path`, terminating NUL included.
#[cfg(unix)]
pub const SUN_PATH_CAPACITY: usize = mem::size_of::<libc::sockaddr_un>() - UNIX_ADDR_HEADER_LEN;
// afunix.h UNIX_PATH_MAX
#[cfg(not(unix))]
pub const SUN_PATH_CAPACITY: usize = 108;

/// `sizeof(struct sockaddr_in)`
pub const INET_ADDR_LEN: usize = 16;

/// A Unix-domain socket path known to fit in `sun_path`.
///
/// Construction fails instead of truncating, so a value of this type can
/// always be copied into a `sockaddr_un` together with its terminator and
/// contains no interior NUL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UnixSocketPath(String);

impl UnixSocketPath {
    pub fn new(path: impl Into<String>) -> Result<Self, AddressError> {
        let path = path.into();
        // The kernel stops at the first NUL
        if path.as_bytes().contains(&0) {
            return Err(AddressError::InvalidPath { path });
        }
        if path.len() >= SUN_PATH_CAPACITY {
            return Err(AddressError::PathTooLong { path });
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path length in bytes, terminator excluded
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<Path> for UnixSocketPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for UnixSocketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address family of a [`SocketAddress`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Unix,
    Inet,
}

/// Where a backend application accepts connections
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum SocketAddress {
    Unix { path: UnixSocketPath },
    Inet { ip: Ipv4Addr, port: u16 },
}

impl SocketAddress {
    pub fn unix(path: impl Into<String>) -> Result<Self, AddressError> {
        Ok(SocketAddress::Unix {
            path: UnixSocketPath::new(path)?,
        })
    }

    pub fn inet(ip: Ipv4Addr, port: u16) -> Self {
        SocketAddress::Inet { ip, port }
    }

    pub fn family(&self) -> AddressFamily {
        match self {
            SocketAddress::Unix { .. } => AddressFamily::Unix,
            SocketAddress::Inet { .. } => AddressFamily::Inet,
        }
    }

    /// Length to pass alongside the address to `connect(2)`.
    ///
    /// Unix-domain addresses use the `SUN_LEN` convention (header plus path,
    /// no terminator); inet addresses are always the full `sockaddr_in`.
    pub fn serialized_len(&self) -> usize {
        match self {
            SocketAddress::Unix { path } => UNIX_ADDR_HEADER_LEN + path.len(),
            SocketAddress::Inet { .. } => INET_ADDR_LEN,
        }
    }

    pub fn as_inet(&self) -> Option<SocketAddrV4> {
        match self {
            SocketAddress::Inet { ip, port } => Some(SocketAddrV4::new(*ip, *port)),
            SocketAddress::Unix { .. } => None,
        }
    }

    pub fn as_unix_path(&self) -> Option<&UnixSocketPath> {
        match self {
            SocketAddress::Unix { path } => Some(path),
            SocketAddress::Inet { .. } => None,
        }
    }

    /// Build the OS-level address structure for this endpoint
    pub fn to_sock_addr(&self) -> io::Result<SockAddr> {
        match self {
            SocketAddress::Unix { path } => SockAddr::unix(path),
            SocketAddress::Inet { ip, port } => Ok(SockAddr::from(SocketAddrV4::new(*ip, *port))),
        }
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketAddress::Unix { path } => write!(f, "unix:{}", path),
            SocketAddress::Inet { ip, port } => write!(f, "{}:{}", ip, port),
        }
    }
}

//! Core FastCGI server addressing and routing
//!
//! This library provides:
//! - Socket address construction from endpoint strings (`/path.sock` or `host:port`)
//! - Server registry with directory-boundary prefix lookup by filesystem path
//! - Configuration loading and swappable registry generations

pub mod address;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod generation;
pub mod path;
pub mod registry;
pub mod resolve;

pub use address::{AddressFamily, SocketAddress, UnixSocketPath};
pub use config::{RegistryConfig, ServerConfig};
pub use endpoint::{make_addr, parse_endpoint};
pub use error::{AddressError, CoreError, Result};
pub use generation::{Generation, Generations};
pub use registry::{ServerRecord, ServerRegistry, WrapperIdentity};
pub use resolve::{resolve_ipv4, Resolver, SystemResolver};

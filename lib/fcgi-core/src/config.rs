//! Server configuration loading
//!
//! ```yaml
//! wrapper: false
//! servers:
//!   - path: /var/www/app.fcgi
//!     endpoint: /var/run/app.sock
//!   - path: /var/www/api
//!     endpoint: backend-host:9000
//!     uid: 1001
//!     gid: 1001
//! ```
//!
//! Servers are registered in file order, so a later entry shadows an earlier
//! one with an overlapping path.

use crate::registry::{ServerRegistry, WrapperIdentity};
use crate::resolve::Resolver;
use crate::{make_addr, CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Backends run under their own uid/gid through a wrapper
    #[serde(default)]
    pub wrapper: bool,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub path: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
}

impl ServerConfig {
    fn identity(&self) -> Result<Option<WrapperIdentity>> {
        match (self.uid, self.gid) {
            (Some(uid), Some(gid)) => Ok(Some(WrapperIdentity::new(uid, gid))),
            (None, None) => Ok(None),
            _ => Err(CoreError::InvalidConfiguration(format!(
                "server {}: uid and gid must be set together",
                self.path
            ))),
        }
    }
}

impl RegistryConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        info!(
            path = %path.display(),
            servers = config.servers.len(),
            "Loaded server configuration"
        );
        Ok(config)
    }

    /// Build one registry generation from this configuration.
    ///
    /// Fails on the first invalid server; nothing is returned for a partially
    /// built configuration.
    pub fn build_registry<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<ServerRegistry> {
        let mut registry = ServerRegistry::new();

        for server in &self.servers {
            if !server.path.starts_with('/') {
                return Err(CoreError::InvalidConfiguration(format!(
                    "server path \"{}\" is not absolute",
                    server.path
                )));
            }

            let identity = server.identity()?;
            if identity.is_some() && !self.wrapper {
                return Err(CoreError::InvalidConfiguration(format!(
                    "server {}: uid/gid require the wrapper to be enabled",
                    server.path
                )));
            }

            let mut record = ServerRegistry::allocate();
            record.set_fs_path(&server.path);
            record.set_identity(identity);
            make_addr(server.endpoint.as_deref(), resolver, record.socket_addr_slot()).map_err(
                |source| CoreError::Address {
                    fs_path: record.fs_path().to_string(),
                    source,
                },
            )?;

            if registry.find_exact(record.fs_path()).is_some() {
                warn!(fs_path = %record.fs_path(), "Duplicate server path; the later definition wins");
            }
            registry.add(record);
        }

        info!("Built server registry with {} servers", registry.len());
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::testing::StaticResolver;
    use crate::{AddressError, SocketAddress};
    use std::net::Ipv4Addr;

    const CONFIG: &str = r#"
wrapper: true
servers:
  - path: /srv/app
    endpoint: /var/run/app.sock
  - path: //srv//app/v2
    endpoint: backend-host:9000
    uid: 1001
    gid: 1002
"#;

    fn resolver() -> StaticResolver {
        StaticResolver::new().with_host("backend-host", &[Ipv4Addr::new(10, 0, 0, 5)])
    }

    #[test]
    fn test_parse() {
        let config = RegistryConfig::from_yaml_str(CONFIG).unwrap();
        assert!(config.wrapper);
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[1].endpoint.as_deref(), Some("backend-host:9000"));
        assert_eq!(config.servers[1].uid, Some(1001));
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = RegistryConfig::from_yaml_str("servers:\n  - path: /a\n    socket: /b\n");
        assert!(matches!(result, Err(CoreError::Parse(_))));
    }

    #[test]
    fn test_build_registry() {
        let config = RegistryConfig::from_yaml_str(CONFIG).unwrap();
        let registry = config.build_registry(&resolver()).unwrap();
        assert_eq!(registry.len(), 2);

        let v2 = registry.find_by_path("/srv/app/v2/index.php").unwrap();
        assert_eq!(v2.fs_path(), "/srv/app/v2");
        assert_eq!(
            v2.socket_addr(),
            Some(&SocketAddress::inet(Ipv4Addr::new(10, 0, 0, 5), 9000))
        );
        assert_eq!(v2.identity(), Some(WrapperIdentity::new(1001, 1002)));

        let app = registry.find_by_path("/srv/app/other").unwrap();
        assert_eq!(app.socket_addr(), Some(&SocketAddress::unix("/var/run/app.sock").unwrap()));
        assert_eq!(app.identity(), None);
    }

    #[test]
    fn test_duplicate_paths_allowed() {
        let config = RegistryConfig::from_yaml_str(
            "servers:\n  - path: /a\n    endpoint: /tmp/first.sock\n  - path: /a\n    endpoint: /tmp/second.sock\n",
        )
        .unwrap();
        let registry = config.build_registry(&resolver()).unwrap();
        assert_eq!(registry.len(), 2);
        let found = registry.find_by_path("/a").unwrap();
        assert_eq!(found.socket_addr(), Some(&SocketAddress::unix("/tmp/second.sock").unwrap()));
    }

    #[test]
    fn test_missing_endpoint() {
        let config = RegistryConfig::from_yaml_str("servers:\n  - path: /a\n").unwrap();
        match config.build_registry(&resolver()) {
            Err(CoreError::Address { fs_path, source }) => {
                assert_eq!(fs_path, "/a");
                assert_eq!(source, AddressError::EmptyEndpoint);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_address_error_carries_server_path() {
        let config = RegistryConfig::from_yaml_str(
            "servers:\n  - path: /a\n    endpoint: unknown-host:9000\n",
        )
        .unwrap();
        let err = config.build_registry(&resolver()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Server /a: failed to resolve \"unknown-host\" to exactly one IP address"
        );
    }

    #[test]
    fn test_relative_path_rejected() {
        let config = RegistryConfig::from_yaml_str(
            "servers:\n  - path: app\n    endpoint: /tmp/a.sock\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_registry(&resolver()),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_identity_requires_both_ids() {
        let config = RegistryConfig::from_yaml_str(
            "wrapper: true\nservers:\n  - path: /a\n    endpoint: /tmp/a.sock\n    uid: 5\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_registry(&resolver()),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_identity_requires_wrapper() {
        let config = RegistryConfig::from_yaml_str(
            "servers:\n  - path: /a\n    endpoint: /tmp/a.sock\n    uid: 5\n    gid: 5\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_registry(&resolver()),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RegistryConfig::load(Path::new("/nonexistent/fcgi-route/servers.yaml"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}

//! Registry of FastCGI backend servers keyed by filesystem path

use crate::path::{collapse_slashes, normalize_request_path};
use crate::SocketAddress;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// OS identity a wrapped backend runs under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperIdentity {
    pub uid: u32,
    pub gid: u32,
}

impl WrapperIdentity {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

/// One configured backend application
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServerRecord {
    fs_path: String,
    socket_addr: Option<SocketAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<WrapperIdentity>,
}

impl ServerRecord {
    /// Normalized filesystem path this server answers for
    pub fn fs_path(&self) -> &str {
        &self.fs_path
    }

    /// Set the path key; repeated slashes are collapsed.
    pub fn set_fs_path(&mut self, path: &str) {
        self.fs_path = collapse_slashes(path).into_owned();
    }

    pub fn socket_addr(&self) -> Option<&SocketAddress> {
        self.socket_addr.as_ref()
    }

    /// Destination for [`crate::make_addr`]
    pub fn socket_addr_slot(&mut self) -> &mut Option<SocketAddress> {
        &mut self.socket_addr
    }

    pub fn identity(&self) -> Option<WrapperIdentity> {
        self.identity
    }

    pub fn set_identity(&mut self, identity: Option<WrapperIdentity>) {
        self.identity = identity;
    }

    /// `fs_path` is a prefix of `path` ending on a path-component boundary.
    fn is_prefix_of(&self, path: &str) -> bool {
        match path.as_bytes().strip_prefix(self.fs_path.as_bytes()) {
            Some(rest) => matches!(rest.first(), None | Some(b'/')),
            None => false,
        }
    }
}

/// ServerRegistry owns every configured server of one configuration
/// generation.
///
/// It is filled single-threaded while the configuration loads and is
/// read-only afterwards; [`ServerRegistry::freeze`] hands it out behind an
/// `Arc` so request handlers can share it without locking. Lookups scan the
/// most recently added record first.
#[derive(Debug, Default)]
pub struct ServerRegistry {
    // Insertion order; iterated in reverse
    servers: Vec<ServerRecord>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self {
            servers: Vec::new(),
        }
    }

    /// Blank record for the caller to fill in before [`ServerRegistry::add`]
    pub fn allocate() -> ServerRecord {
        ServerRecord::default()
    }

    /// Register a server. Duplicate or overlapping paths are allowed; the
    /// newest one shadows older ones.
    pub fn add(&mut self, record: ServerRecord) {
        debug!(
            fs_path = %record.fs_path,
            socket_addr = ?record.socket_addr,
            "Registered server"
        );
        self.servers.push(record);
    }

    /// Find the server whose path is a directory-boundary prefix of
    /// `requested_path`.
    ///
    /// `/app` matches `/app` and `/app/sub` but not `/application`. Paths
    /// longer than [`crate::path::MAX_PATH`] are truncated before matching.
    pub fn find_by_path(&self, requested_path: &str) -> Option<&ServerRecord> {
        self.find_by_path_as(requested_path, None)
    }

    /// Like [`ServerRegistry::find_by_path`], additionally requiring the
    /// record's wrapper identity to equal `identity` when one is given.
    pub fn find_by_path_as(
        &self,
        requested_path: &str,
        identity: Option<WrapperIdentity>,
    ) -> Option<&ServerRecord> {
        let path = normalize_request_path(requested_path);
        let found = self.iter().find(|server| {
            server.is_prefix_of(&path)
                && identity.map_or(true, |id| server.identity == Some(id))
        });
        trace!(path = %path, matched = found.is_some(), "Server lookup");
        found
    }

    /// Find the server registered for exactly `path`
    pub fn find_exact(&self, path: &str) -> Option<&ServerRecord> {
        let path = collapse_slashes(path);
        self.iter().find(|server| server.fs_path == path)
    }

    /// Servers, most recently added first
    pub fn iter(&self) -> impl Iterator<Item = &ServerRecord> {
        self.servers.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// End the load phase; the registry is immutable from here on.
    pub fn freeze(self) -> Arc<ServerRegistry> {
        debug!("Froze server registry with {} servers", self.servers.len());
        Arc::new(self)
    }
}

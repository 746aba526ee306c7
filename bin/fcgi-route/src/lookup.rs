//! Lookup reporting for matching request paths to servers

use fcgi_core::{ServerRecord, ServerRegistry, WrapperIdentity};
use serde_json::{json, Value};
use std::sync::Arc;

/// Answers lookups against one registry generation
pub struct Lookup {
    registry: Arc<ServerRegistry>,
    identity: Option<WrapperIdentity>,
}

impl Lookup {
    pub fn new(registry: Arc<ServerRegistry>, identity: Option<WrapperIdentity>) -> Self {
        Self { registry, identity }
    }

    pub fn find(&self, path: &str) -> Option<&ServerRecord> {
        self.registry.find_by_path_as(path, self.identity)
    }

    /// One line per lookup, `no match` when nothing is configured for it
    pub fn describe(&self, path: &str) -> String {
        match self.find(path) {
            Some(server) => format!("{} -> {}", path, describe_server(server)),
            None => format!("{} -> no match", path),
        }
    }

    pub fn to_json(&self, path: &str) -> Value {
        json!({
            "path": path,
            "server": self.find(path),
        })
    }
}

/// `fs_path address (len N)` for a registered server
pub fn describe_server(server: &ServerRecord) -> String {
    let mut line = match server.socket_addr() {
        Some(addr) => format!("{} {} (len {})", server.fs_path(), addr, addr.serialized_len()),
        None => format!("{} <no address>", server.fs_path()),
    };
    if let Some(identity) = server.identity() {
        line.push_str(&format!(" as {}:{}", identity.uid, identity.gid));
    }
    line
}

//! Cluster configuration.
//!
//! Every node loads the same YAML file before the run starts; the set of
//! nodes it describes is static for the whole run. Field names are the
//! on-disk keys:
//!
//! ```yaml
//! servers:
//!   - serverId: 0
//!     host: "127.0.0.1"
//!     port: "7070"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One configured node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    pub server_id: u32,
    pub host: String,
    pub port: String,
}

impl ServerEntry {
    /// The node's dial/listen address, `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The full static cluster, identical on every node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub servers: Vec<ServerEntry>,
}

impl ClusterConfig {
    /// Load and validate a cluster file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        let config: ClusterConfig = serde_yaml::from_str(&text)
            .map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::EmptyCluster);
        }
        for (i, server) in self.servers.iter().enumerate() {
            if self.servers[..i].iter().any(|s| s.server_id == server.server_id) {
                return Err(ConfigError::DuplicateServerId(server.server_id));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// The entry for `server_id`, or an error naming the id.
    pub fn require(&self, server_id: u32) -> Result<&ServerEntry, ConfigError> {
        self.servers
            .iter()
            .find(|s| s.server_id == server_id)
            .ok_or(ConfigError::UnknownServerId(server_id))
    }

    /// Every node other than `server_id`, in file order.
    pub fn peers(&self, server_id: u32) -> impl Iterator<Item = &ServerEntry> {
        self.servers.iter().filter(move |s| s.server_id != server_id)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, serde_yaml::Error),
    #[error("cluster config lists no servers")]
    EmptyCluster,
    #[error("duplicate server id {0} in cluster config")]
    DuplicateServerId(u32),
    #[error("server id {0} is not in the cluster config")]
    UnknownServerId(u32),
}

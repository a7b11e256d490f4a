//! TOML configuration for the RandomFS daemon.
//!
//! Every section is optional; missing values fall back to the defaults
//! below, and command-line flags override whatever the file says.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use randomfs_engine::{DEFAULT_CACHE_MAX_BYTES, EvictionKind, RandomFsConfig};
use randomfs_types::DEFAULT_HOST;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// HTTP server settings.
    pub server: ServerSection,
    /// Content store backend.
    pub store: StoreSection,
    /// Block cache.
    pub cache: CacheSection,
    /// Locator settings.
    pub locator: LocatorSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address for the HTTP API.
    pub listen_addr: String,
    /// Directory of static files served outside the API.
    ///
    /// Skipped with a warning when it does not exist.
    pub web_dir: PathBuf,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_dir: PathBuf::from("./web"),
            max_upload_bytes: None,
        }
    }
}

/// Which content store the daemon talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// An IPFS node's HTTP API.
    #[default]
    Ipfs,
    /// Files under the data directory (offline mode).
    File,
    /// Volatile in-memory store.
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ipfs => "ipfs",
            Self::File => "file",
            Self::Memory => "memory",
        })
    }
}

/// `[store]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Backend type: `"ipfs"` (default), `"file"` or `"memory"`.
    pub backend: StoreBackend,
    /// IPFS HTTP API base URL.
    pub ipfs_api: String,
    /// Directory for the `file` backend.
    pub data_dir: PathBuf,
    /// Per-request timeout for the IPFS client, in seconds. Unbounded if unset.
    pub timeout_secs: Option<u64>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Ipfs,
            ipfs_api: "http://localhost:5001".to_string(),
            data_dir: PathBuf::from("./data"),
            timeout_secs: None,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Upper bound on cached block bytes.
    pub max_bytes: u64,
    /// Eviction order: `"lru"` (default) or `"fifo"`.
    pub eviction: EvictionKind,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_CACHE_MAX_BYTES,
            eviction: EvictionKind::Lru,
        }
    }
}

/// `[locator]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocatorSection {
    /// Host segment of produced `rd://` locators.
    pub host: String,
}

impl Default for LocatorSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Engine settings derived from the `[cache]` and `[locator]` sections.
    pub fn engine_config(&self) -> RandomFsConfig {
        RandomFsConfig {
            host: self.locator.host.clone(),
            cache_max_bytes: self.cache.max_bytes,
            eviction: self.cache.eviction,
        }
    }

    /// Effective IPFS request timeout.
    pub fn store_timeout(&self) -> Option<Duration> {
        self.store.timeout_secs.map(Duration::from_secs)
    }
}

//! Custom token persistence.
//!
//! Tokens are stored per network under the key `custom_tokens_<network>`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::network::TokenDescriptor;

/// A user-added token in its persisted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomToken {
    #[serde(flatten)]
    pub token: TokenDescriptor,
    /// Unix time in milliseconds.
    pub added_at: u64,
}

impl CustomToken {
    pub fn new(token: TokenDescriptor) -> Self {
        let added_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self { token, added_at }
    }
}

/// Storage key for a network's custom token list.
pub fn storage_key(network: &str) -> String {
    format!("custom_tokens_{network}")
}

/// Synchronous key-value persistence for custom tokens.
pub trait TokenStore: Send + Sync {
    /// Tokens stored for `network`; empty when nothing was saved.
    fn load(&self, network: &str) -> GatewayResult<Vec<CustomToken>>;

    /// Replace the list stored for `network`.
    fn save(&self, network: &str, tokens: &[CustomToken]) -> GatewayResult<()>;
}

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<DashMap<String, Vec<CustomToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, network: &str) -> GatewayResult<Vec<CustomToken>> {
        Ok(self
            .inner
            .get(&storage_key(network))
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    fn save(&self, network: &str, tokens: &[CustomToken]) -> GatewayResult<()> {
        self.inner.insert(storage_key(network), tokens.to_vec());
        Ok(())
    }
}

/// JSON file store; the whole file is rewritten on every save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    inner: Arc<DashMap<String, Vec<CustomToken>>>,
    path: PathBuf,
}

impl FileTokenStore {
    /// Open the store, loading the file if it exists.
    ///
    /// Unreadable or corrupt content is logged and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let inner = DashMap::new();

        if path.exists() {
            match Self::read_file(&path) {
                Ok(map) => {
                    for (k, v) in map {
                        inner.insert(k, v);
                    }
                    tracing::info!(path = %path.display(), networks = inner.len(), "Loaded custom tokens");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable custom token file");
                }
            }
        }

        Self {
            inner: Arc::new(inner),
            path,
        }
    }

    fn read_file(path: &Path) -> std::io::Result<HashMap<String, Vec<CustomToken>>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_file(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        serde_json::to_writer_pretty(writer, &map)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, network: &str) -> GatewayResult<Vec<CustomToken>> {
        Ok(self
            .inner
            .get(&storage_key(network))
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    fn save(&self, network: &str, tokens: &[CustomToken]) -> GatewayResult<()> {
        self.inner.insert(storage_key(network), tokens.to_vec());
        self.write_file()
            .map_err(|e| GatewayError::Storage(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!(network, count = tokens.len(), "Saved custom tokens");
        Ok(())
    }
}

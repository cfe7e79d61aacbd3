//! Network lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::NetworkOverride;
use crate::error::{GatewayError, GatewayResult};
use crate::network::builtin;
use crate::network::types::NetworkDescriptor;

/// Static table of supported networks.
///
/// Built once at startup; there is no way to add a network afterwards.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<Arc<NetworkDescriptor>>,
}

impl NetworkRegistry {
    /// Registry over the built-in network table.
    pub fn builtin() -> Self {
        Self::from_descriptors(builtin::networks())
    }

    /// Registry over an explicit list (first key wins on duplicates).
    pub fn from_descriptors(descriptors: Vec<NetworkDescriptor>) -> Self {
        let mut networks: Vec<Arc<NetworkDescriptor>> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if networks.iter().any(|n| n.key == descriptor.key) {
                tracing::warn!(network = %descriptor.key, "Ignoring duplicate network definition");
                continue;
            }
            networks.push(Arc::new(descriptor));
        }
        Self { networks }
    }

    /// Apply configured endpoint overrides.
    pub fn with_overrides(self, overrides: &BTreeMap<String, NetworkOverride>) -> Self {
        let networks = self
            .networks
            .into_iter()
            .map(|network| match overrides.get(&network.key) {
                Some(over) => {
                    let mut patched = (*network).clone();
                    if let Some(url) = &over.rpc_url {
                        patched.primary_endpoint = url.clone();
                    }
                    if let Some(backups) = &over.backup_urls {
                        patched.backup_endpoints = backups.clone();
                    }
                    tracing::debug!(
                        network = %patched.key,
                        endpoints = patched.backup_endpoints.len() + 1,
                        "Applied endpoint override"
                    );
                    Arc::new(patched)
                }
                None => network,
            })
            .collect();
        Self { networks }
    }

    /// Look up a network by key.
    pub fn get(&self, key: &str) -> GatewayResult<Arc<NetworkDescriptor>> {
        self.networks
            .iter()
            .find(|n| n.key == key)
            .cloned()
            .ok_or_else(|| GatewayError::UnsupportedNetwork(key.to_string()))
    }

    pub fn supported_chain_ids(&self) -> Vec<u64> {
        self.networks.iter().map(|n| n.chain_id.0).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NetworkDescriptor>> {
        self.networks.iter()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("bsc").unwrap().chain_id.0, 56);
        assert_eq!(registry.get("arbitrum").unwrap().chain_id.0, 42161);
        assert_eq!(registry.supported_chain_ids(), vec![1, 10, 42161, 56]);
    }

    #[test]
    fn test_unknown_network() {
        let err = NetworkRegistry::builtin().get("polygon").unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedNetwork(k) if k == "polygon"));
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "optimism".to_string(),
            NetworkOverride {
                rpc_url: Some("http://127.0.0.1:9545".to_string()),
                backup_urls: Some(vec![]),
            },
        );
        let registry = NetworkRegistry::builtin().with_overrides(&overrides);
        let optimism = registry.get("optimism").unwrap();
        assert_eq!(optimism.endpoints(), vec!["http://127.0.0.1:9545".to_string()]);
        assert!(registry.get("ethereum").unwrap().endpoints().len() > 1);
    }
}

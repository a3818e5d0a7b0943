//! Client registry for managing available client adapters.
//!
//! The registry is an ordinary value owned by the caller. Registration takes
//! `&mut self`; lookups take `&self`, so a shared registry can be read from
//! several threads at once.

use super::{ClientAdapter, ClientKind};
use crate::error::{Error, Result};

/// Registry of available client adapters.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: Vec<Box<dyn ClientAdapter>>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::with_default_clients()
    }
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    /// Create a registry with every built-in client.
    pub fn with_default_clients() -> Self {
        Self {
            clients: ClientKind::ALL.into_iter().map(ClientKind::adapter).collect(),
        }
    }

    /// Register a client adapter, replacing any adapter with the same ID.
    pub fn register(&mut self, client: Box<dyn ClientAdapter>) {
        self.clients.retain(|c| c.id() != client.id());
        self.clients.push(client);
    }

    /// Get all registered clients.
    pub fn all(&self) -> &[Box<dyn ClientAdapter>] {
        &self.clients
    }

    /// Get a client by ID.
    pub fn get(&self, id: &str) -> Option<&dyn ClientAdapter> {
        self.clients
            .iter()
            .find(|c| c.id() == id)
            .map(|c| c.as_ref())
    }

    /// Like [`get`](Self::get), but an unknown ID is an error.
    pub fn require(&self, id: &str) -> Result<&dyn ClientAdapter> {
        self.get(id)
            .ok_or_else(|| Error::UnknownClient(id.to_string()))
    }

    /// Resolve an explicit target list, or every client when there is none.
    pub fn select<S: AsRef<str>>(&self, targets: Option<&[S]>) -> Result<Vec<&dyn ClientAdapter>> {
        match targets {
            Some(targets) => targets.iter().map(|t| self.require(t.as_ref())).collect(),
            None => Ok(self.clients.iter().map(|c| c.as_ref()).collect()),
        }
    }

    /// List all client IDs.
    pub fn client_ids(&self) -> Vec<&'static str> {
        self.clients.iter().map(|c| c.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClaudeCodeClient, ReloadPolicy};

    #[test]
    fn test_default_clients_registered() {
        let registry = ClientRegistry::with_default_clients();
        let ids = registry.client_ids();

        assert_eq!(ids, vec!["claude-code", "vscode", "cursor"]);
    }

    #[test]
    fn test_get_client_by_id() {
        let registry = ClientRegistry::with_default_clients();

        let claude = registry.get("claude-code");
        assert!(claude.is_some());
        assert_eq!(claude.expect("client exists").id(), "claude-code");

        let missing = registry.get("nonexistent");
        assert!(missing.is_none());
    }

    #[test]
    fn test_require_unknown_client() {
        let registry = ClientRegistry::with_default_clients();

        let err = registry.require("zed").unwrap_err();

        assert!(matches!(err, Error::UnknownClient(_)));
    }

    #[test]
    fn test_select_with_targets() {
        let registry = ClientRegistry::with_default_clients();
        let targets = vec!["cursor".to_string(), "claude-code".to_string()];

        let clients = registry.select(Some(targets.as_slice())).unwrap();
        let ids: Vec<_> = clients.iter().map(|c| c.id()).collect();

        assert_eq!(ids, vec!["cursor", "claude-code"]);
    }

    #[test]
    fn test_select_without_targets() {
        let registry = ClientRegistry::with_default_clients();

        let clients = registry.select::<String>(None).unwrap();

        assert_eq!(clients.len(), 3);
    }

    #[test]
    fn test_select_rejects_unknown_target() {
        let registry = ClientRegistry::with_default_clients();

        assert!(registry.select(Some(&["vscode", "zed"][..])).is_err());
    }

    #[test]
    fn test_register_custom_client() {
        let mut registry = ClientRegistry::new();
        assert!(registry.all().is_empty());

        registry.register(Box::new(ClaudeCodeClient::new()));
        assert_eq!(registry.all().len(), 1);
        assert_eq!(
            registry.get("claude-code").expect("exists").id(),
            "claude-code"
        );
    }

    #[test]
    fn test_register_replaces_same_id() {
        #[derive(Debug)]
        struct LiveClaude;

        impl ClientAdapter for LiveClaude {
            fn id(&self) -> &'static str {
                "claude-code"
            }
            fn display_name(&self) -> &'static str {
                "Claude Code (live)"
            }
            fn server_key(&self) -> &'static str {
                "mcpServers"
            }
            fn relative_path(&self) -> &'static str {
                ".mcp.json"
            }
            fn reload(&self) -> ReloadPolicy {
                ReloadPolicy::LIVE
            }
        }

        let mut registry = ClientRegistry::with_default_clients();
        registry.register(Box::new(LiveClaude));

        assert_eq!(registry.all().len(), 3);
        assert_eq!(
            registry.get("claude-code").expect("exists").display_name(),
            "Claude Code (live)"
        );
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientRegistry>();

        let registry = std::sync::Arc::new(ClientRegistry::with_default_clients());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || registry.client_ids().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClientRegistry::new();

        assert!(registry.all().is_empty());
        assert!(registry.get("claude-code").is_none());
    }
}

//! Plugin Registry
//!
//! The central key table: maps each [`PluginKey`] to its type-level
//! declaration and a factory that builds an instance for a given peer. The
//! registry never holds plugin instances; those live in the per-peer
//! dispatcher.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::context::PeerContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::key::PluginKey;
use crate::plugin::traits::{Plugin, PluginDescriptor};

/// Builds a plugin instance bound to a peer
pub type PluginFactory = Arc<dyn Fn(Arc<PeerContext>) -> Box<dyn Plugin> + Send + Sync>;

/// One row of the key table
#[derive(Clone)]
pub struct PluginEntry {
    key: PluginKey,
    declaration: CapabilityDeclaration,
    factory: PluginFactory,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("key", &self.key)
            .field("display_name", &self.declaration.display_name)
            .finish()
    }
}

impl PluginEntry {
    pub fn new(key: PluginKey, declaration: CapabilityDeclaration, factory: PluginFactory) -> Self {
        Self {
            key,
            declaration,
            factory,
        }
    }

    /// Entry for a plugin type implementing [`PluginDescriptor`]
    pub fn of<P: PluginDescriptor>() -> Self {
        Self::new(
            P::KEY,
            P::declare(),
            Arc::new(|context: Arc<PeerContext>| -> Box<dyn Plugin> {
                Box::new(P::create(context))
            }),
        )
    }

    pub fn key(&self) -> PluginKey {
        self.key
    }

    pub fn declaration(&self) -> &CapabilityDeclaration {
        &self.declaration
    }

    /// Build an instance bound to `context`
    pub fn instantiate(&self, context: Arc<PeerContext>) -> Box<dyn Plugin> {
        (self.factory)(context)
    }
}

/// Registry of plugin types, ordered by key
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<PluginKey, PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding every builtin plugin submitted with `builtin!`
    pub fn with_builtins() -> PluginResult<Self> {
        let mut registry = Self::new();
        for entry in crate::plugin::builtin::api::get_all_builtin_plugins() {
            registry.register(entry)?;
        }
        log::debug!("Registered {} builtin plugins", registry.plugin_count());
        Ok(registry)
    }

    /// Add a plugin type. Keys must be valid and unique, declarations must
    /// satisfy their invariants.
    pub fn register(&mut self, entry: PluginEntry) -> PluginResult<()> {
        entry.key.validate()?;
        entry.declaration.validate(entry.key)?;

        if self.entries.contains_key(&entry.key) {
            return Err(PluginError::DuplicateKey {
                key: entry.key.to_string(),
            });
        }

        log::trace!("Registering plugin '{}'", entry.key);
        self.entries.insert(entry.key, entry);
        Ok(())
    }

    pub fn register_plugin<P: PluginDescriptor>(&mut self) -> PluginResult<()> {
        self.register(PluginEntry::of::<P>())
    }

    pub fn unregister(&mut self, key: &str) -> PluginResult<PluginEntry> {
        let found = self.entries.keys().find(|k| k.as_str() == key).copied();
        found
            .and_then(|k| self.entries.remove(&k))
            .ok_or_else(|| PluginError::PluginNotFound {
                key: key.to_string(),
            })
    }

    pub fn get(&self, key: &str) -> Option<&PluginEntry> {
        self.entries.values().find(|e| e.key.as_str() == key)
    }

    /// Declaration lookup without instantiating anything
    pub fn declaration(&self, key: &str) -> Option<&CapabilityDeclaration> {
        self.get(key).map(PluginEntry::declaration)
    }

    pub fn has_plugin(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<PluginKey> {
        self.entries.keys().copied().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.values()
    }

    pub fn plugin_count(&self) -> usize {
        self.entries.len()
    }

    /// Keys of every plugin declaring `packet_type` as incoming
    pub fn handlers_for(&self, packet_type: &str) -> Vec<PluginKey> {
        self.entries
            .values()
            .filter(|e| e.declaration.accepts(packet_type))
            .map(|e| e.key)
            .collect()
    }

    /// Union of all incoming types
    pub fn incoming_types(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|e| e.declaration.incoming_types.iter().cloned())
            .collect()
    }

    /// Union of all outgoing types
    pub fn outgoing_types(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|e| e.declaration.outgoing_types.iter().cloned())
            .collect()
    }

    /// Entries whose minimum platform level is met
    pub fn supported_on(&self, platform_version: u32) -> Vec<&PluginEntry> {
        self.entries
            .values()
            .filter(|e| e.declaration.is_supported_on(platform_version))
            .collect()
    }
}

/// Thread-safe shared plugin registry
#[derive(Debug, Clone, Default)]
pub struct SharedPluginRegistry {
    inner: Arc<RwLock<PluginRegistry>>,
}

impl SharedPluginRegistry {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Get access to the inner registry for read/write operations
    pub fn inner(&self) -> &Arc<RwLock<PluginRegistry>> {
        &self.inner
    }

    pub async fn has_plugin(&self, key: &str) -> bool {
        self.inner.read().await.has_plugin(key)
    }

    pub async fn keys(&self) -> Vec<PluginKey> {
        self.inner.read().await.keys()
    }

    pub async fn plugin_count(&self) -> usize {
        self.inner.read().await.plugin_count()
    }

    pub async fn declaration(&self, key: &str) -> Option<CapabilityDeclaration> {
        self.inner.read().await.declaration(key).cloned()
    }

    pub async fn register(&self, entry: PluginEntry) -> PluginResult<()> {
        self.inner.write().await.register(entry)
    }
}

use crate::store::{MemoryStore, MemoryStoreInner};
use crate::tables::Tables;
use occi_core::CategoryRegistry;
use occi_domain::config::UserCredentials;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

const DEFAULT_ID_LENGTH: usize = 12;

#[derive(Debug)]
pub struct MemoryStoreBuilder {
    registry: Option<CategoryRegistry>,
    users: Vec<UserCredentials>,
    id_length: usize,
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self { registry: None, users: Vec::new(), id_length: DEFAULT_ID_LENGTH }
    }
}

impl MemoryStoreBuilder {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares an existing registry. A fresh one with the core categories is used otherwise.
    #[must_use = "Sets the category registry of the store"]
    pub fn registry(mut self, registry: CategoryRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Credentials accepted by `auth_user`.
    #[must_use = "Sets the accepted credentials"]
    pub fn users(mut self, users: impl IntoIterator<Item = UserCredentials>) -> Self {
        self.users = users.into_iter().collect();
        self
    }

    /// Length of the random part of generated ids.
    #[must_use = "Sets the generated id length"]
    pub const fn id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    #[must_use]
    pub fn build(self) -> MemoryStore {
        let registry = self.registry.unwrap_or_default();
        info!(
            categories = registry.all().len(),
            users = self.users.len(),
            "In-memory entity store initialized"
        );
        MemoryStore {
            inner: Arc::new(MemoryStoreInner {
                registry,
                users: self.users,
                id_length: self.id_length.max(1),
                tables: RwLock::new(Tables::default()),
            }),
        }
    }
}

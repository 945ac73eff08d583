use crate::builder::MemoryStoreBuilder;
use crate::tables::Tables;
use async_trait::async_trait;
use occi_core::{
    ActionInstance, Category, CategoryRef, CategoryRegistry, Entity, EntityFilter, EntityStore, StoreError, User,
};
use occi_domain::config::UserCredentials;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
pub(crate) struct MemoryStoreInner {
    pub(crate) registry: CategoryRegistry,
    pub(crate) users: Vec<UserCredentials>,
    pub(crate) id_length: usize,
    pub(crate) tables: RwLock<Tables>,
}

/// Thread-safe handle to the in-memory store. Clones share the same content.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) inner: Arc<MemoryStoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    /// Number of stored entities, links included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tables.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// User-defined Mixins recorded through discovery.
    #[must_use]
    pub fn user_categories(&self) -> Vec<CategoryRef> {
        self.inner.tables.read().user_categories().to_vec()
    }

    /// Applies `batch` to a working copy and commits it only if it succeeds
    /// and leaves every link consistent.
    fn transaction<T>(&self, batch: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut tables = self.inner.tables.write();
        let mut work = tables.clone();
        let result = batch(&mut work)?;
        work.check_links()?;
        *tables = work;
        Ok(result)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn registry(&self) -> &CategoryRegistry {
        &self.inner.registry
    }

    #[instrument(skip(self, secret), level = "debug")]
    async fn auth_user(&self, identity: &str, secret: Option<&str>, method: Option<&str>) -> Option<User> {
        let known = self
            .inner
            .users
            .iter()
            .any(|u| u.identity == identity && Some(u.secret.as_str()) == secret);
        if !known {
            warn!(identity, "Rejected credentials");
            return None;
        }
        Some(User::new(identity))
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_entity(&self, id: &str, user: Option<&User>) -> Result<Entity, StoreError> {
        self.inner.tables.read().get(id).ok_or_else(|| StoreError::not_found(id))
    }

    #[instrument(skip(self), level = "debug")]
    async fn filter_entities(&self, filter: &EntityFilter, user: Option<&User>) -> Result<Vec<Entity>, StoreError> {
        Ok(self.inner.tables.read().filter(filter))
    }

    #[instrument(skip(self, entities), fields(count = entities.len()), level = "debug")]
    async fn save_entities(
        &self,
        entities: Vec<Entity>,
        delete_ids: &[String],
        user: Option<&User>,
    ) -> Result<Vec<Entity>, StoreError> {
        let id_length = self.inner.id_length;
        let saved = self.transaction(|tables| {
            let mut ids = Vec::with_capacity(entities.len());
            for entity in entities {
                ids.push(tables.upsert(entity, id_length)?);
            }
            for id in delete_ids {
                tables.delete(id)?;
            }
            Ok(ids.iter().filter_map(|id| tables.get(id)).collect::<Vec<_>>())
        })?;
        debug!(saved = saved.len(), deleted = delete_ids.len(), "Batch committed");
        Ok(saved)
    }

    #[instrument(skip(self, action), fields(action = %action.category()), level = "debug")]
    async fn exec_action_on_collection(
        &self,
        action: &ActionInstance,
        collection: Option<&CategoryRef>,
        user: Option<&User>,
    ) -> Result<(), StoreError> {
        let filter = collection.map(|c| EntityFilter::category(CategoryRef::clone(c))).unwrap_or_default();
        let id_length = self.inner.id_length;
        let count = self.transaction(|tables| {
            let targets: Vec<Entity> = tables
                .filter(&filter)
                .into_iter()
                .filter(|e| e.is_applicable_action(action.category()))
                .collect();
            let count = targets.len();
            for mut entity in targets {
                self.inner.registry.behavior(entity.kind()).exec_action(&mut entity, action)?;
                tables.upsert(entity, id_length)?;
            }
            Ok(count)
        })?;
        debug!(count, "Action applied to collection");
        Ok(())
    }

    async fn add_user_category(&self, category: &CategoryRef, _user: Option<&User>) -> Result<(), StoreError> {
        if !category.is_mixin() {
            return Err(StoreError::invalid_operation("Permission denied"));
        }
        self.inner.tables.write().add_user_category(category)?;
        debug!(category = %category, "User category recorded");
        Ok(())
    }

    async fn remove_user_category(&self, category: &Category, _user: Option<&User>) -> Result<(), StoreError> {
        if !category.is_mixin() {
            return Err(StoreError::invalid_operation("Permission denied"));
        }
        self.transaction(|tables| tables.remove_user_category(category))?;
        debug!(category = %category, "User category removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occi_core::builtin;

    #[tokio::test]
    async fn failed_batches_leave_no_trace() {
        let store = MemoryStore::default();
        let resource = Entity::new(builtin::resource_kind()).unwrap();

        let result = store.save_entities(vec![resource], &["missing".to_owned()], None).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn user_categories_must_be_mixins() {
        let store = MemoryStore::default();
        let err = store.add_user_category(&builtin::resource_kind(), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid operation: Permission denied");

        let mixin = Category::mixin("tag", "http://example.com/tags#").location("tag/").build().unwrap();
        store.add_user_category(&mixin, None).await.unwrap();
        assert_eq!(store.user_categories(), vec![mixin.clone()]);

        let twin = Category::mixin("tag", "http://example.com/tags#").location("other/").build().unwrap();
        let err = store.add_user_category(&twin, None).await.unwrap_err();
        assert!(err.to_string().contains("already defined"));
        assert_eq!(store.user_categories(), vec![mixin.clone()]);

        store.remove_user_category(&mixin, None).await.unwrap();
        assert!(store.user_categories().is_empty());
        assert!(store.remove_user_category(&mixin, None).await.is_err());
    }

    #[tokio::test]
    async fn authenticates_configured_users() {
        let store = MemoryStore::builder()
            .users([UserCredentials { identity: "alice".into(), secret: "wonderland".into() }])
            .build();

        let user = store.auth_user("alice", Some("wonderland"), Some("Basic")).await;
        assert_eq!(user.as_ref().map(User::identity), Some("alice"));
        assert!(store.auth_user("alice", Some("guess"), None).await.is_none());
        assert!(store.auth_user("bob", None, None).await.is_none());
    }
}

//! The storage contract the HTTP layer is written against.

use crate::action::ActionInstance;
use crate::attribute::AttributeValue;
use crate::category::{Category, CategoryRef};
use crate::entity::Entity;
use crate::error::StoreError;
use crate::registry::CategoryRegistry;
use async_trait::async_trait;
use std::fmt::Debug;

/// An authenticated caller. Stores decide what it is allowed to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    identity: String,
}

impl User {
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self { identity: identity.into() }
    }

    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Selection criteria for [`EntityStore::filter_entities`].
///
/// Every category and every attribute must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    pub categories: Vec<CategoryRef>,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl EntityFilter {
    #[must_use]
    pub fn category(category: CategoryRef) -> Self {
        Self { categories: vec![category], attributes: Vec::new() }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.attributes.is_empty()
    }

    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.categories.iter().all(|category| entity.has_category(category))
            && self.attributes.iter().all(|(name, filter)| {
                entity.attribute(name).is_some_and(|value| value.matches(filter))
            })
    }
}

/// Persistence for entities, plus the registry the server resolves categories with.
///
/// `user` is the caller as returned by [`auth_user`](Self::auth_user), `None`
/// for anonymous requests.
#[async_trait]
pub trait EntityStore: Debug + Send + Sync {
    fn registry(&self) -> &CategoryRegistry;

    /// Checks credentials. The default accepts nobody.
    async fn auth_user(&self, _identity: &str, _secret: Option<&str>, _method: Option<&str>) -> Option<User> {
        None
    }

    /// # Errors
    /// [`StoreError::NotFound`] for unknown ids.
    async fn get_entity(&self, id: &str, user: Option<&User>) -> Result<Entity, StoreError>;

    /// Entities matching `filter`, in insertion order.
    ///
    /// # Errors
    /// Backend failures.
    async fn filter_entities(&self, filter: &EntityFilter, user: Option<&User>) -> Result<Vec<Entity>, StoreError>;

    /// Upserts `entities` and deletes `delete_ids` as one batch.
    ///
    /// New entities get an id. Returns the saved entities in input order.
    ///
    /// # Errors
    /// [`StoreError::InvalidOperation`] for dangling link endpoints,
    /// [`StoreError::NotFound`] for unknown delete ids. Nothing is applied on error.
    async fn save_entities(
        &self,
        entities: Vec<Entity>,
        delete_ids: &[String],
        user: Option<&User>,
    ) -> Result<Vec<Entity>, StoreError>;

    /// Runs `action` through the Kind's behavior and saves the result.
    ///
    /// # Errors
    /// Behavior errors, then whatever saving reports.
    async fn exec_action(
        &self,
        entity: Entity,
        action: &ActionInstance,
        user: Option<&User>,
    ) -> Result<Entity, StoreError> {
        let mut entity = entity;
        self.registry().behavior(entity.kind()).exec_action(&mut entity, action)?;
        let id = entity.id().unwrap_or_default().to_owned();
        self.save_entities(vec![entity], &[], user)
            .await?
            .pop()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Runs `action` on every entity of a collection.
    ///
    /// # Errors
    /// [`StoreError::NotImplemented`] unless the store supports it.
    async fn exec_action_on_collection(
        &self,
        _action: &ActionInstance,
        _collection: Option<&CategoryRef>,
        _user: Option<&User>,
    ) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented { operation: "action on collection".into() })
    }

    /// Persists a user-defined Mixin. An identifier already recorded is
    /// refused, never replaced.
    ///
    /// # Errors
    /// [`StoreError::NotImplemented`] unless the store supports it.
    async fn add_user_category(&self, _category: &CategoryRef, _user: Option<&User>) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented { operation: "user-defined categories".into() })
    }

    /// # Errors
    /// [`StoreError::NotImplemented`] unless the store supports it.
    async fn remove_user_category(&self, _category: &Category, _user: Option<&User>) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented { operation: "user-defined categories".into() })
    }
}

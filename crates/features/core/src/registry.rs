//! The category registry: every Kind, Mixin and Action known to the server.

use crate::action::ActionInstance;
use crate::builtin;
use crate::category::{Category, CategoryRef};
use crate::entity::Entity;
use crate::error::{CategoryError, EntityError};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-Kind construction and action behavior.
///
/// Registered with [`CategoryRegistry::register_with_behavior`]; Kinds without
/// one use [`DefaultBehavior`].
pub trait EntityBehavior: Debug + Send + Sync {
    /// Fills computed defaults and the initially applicable actions of a new entity.
    ///
    /// # Errors
    /// Implementations propagate [`EntityError`] from attribute imports.
    fn initialize(&self, _entity: &mut Entity) -> Result<(), EntityError> {
        Ok(())
    }

    /// Carries out `action` on `entity`. Applicability is checked by the caller.
    ///
    /// # Errors
    /// Implementations report invalid transitions as [`EntityError`].
    fn exec_action(&self, _entity: &mut Entity, _action: &ActionInstance) -> Result<(), EntityError> {
        Ok(())
    }
}

/// Accepts every applicable action without side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl EntityBehavior for DefaultBehavior {}

#[derive(Debug, Default)]
struct RegistryInner {
    order: Vec<String>,
    categories: FxHashMap<String, CategoryRef>,
    locations: FxHashMap<String, CategoryRef>,
    behaviors: FxHashMap<String, Arc<dyn EntityBehavior>>,
}

impl RegistryInner {
    fn register(&mut self, category: CategoryRef) -> Result<(), CategoryError> {
        self.check(&category)?;

        if self.categories.contains_key(category.id()) {
            trace!(category = %category, "Replacing registered category");
            self.unregister(&category);
        }

        for action in category.actions() {
            if self.categories.contains_key(action.id()) {
                self.unregister(action);
            }
            self.insert(Arc::clone(action));
        }
        self.insert(category);
        Ok(())
    }

    /// Rejects nested actions, self-relations and location clashes without mutating anything.
    fn check(&self, category: &Category) -> Result<(), CategoryError> {
        if category.related().is_some_and(|related| related.id() == category.id()) {
            return Err(CategoryError::invalid(format!("\"{category}\": related to itself")));
        }

        if category.is_action() && !category.actions().is_empty() {
            return Err(CategoryError::invalid(format!(
                "\"{category}\": an action cannot define actions"
            )));
        }
        for action in category.actions() {
            if !action.is_action() {
                return Err(CategoryError::invalid(format!(
                    "\"{category}\": \"{action}\" is not an action category"
                )));
            }
            if !action.actions().is_empty() {
                return Err(CategoryError::invalid(format!(
                    "\"{action}\": an action cannot define actions"
                )));
            }
        }

        if let Some(location) = category.location()
            && let Some(owner) = self.locations.get(location)
            && owner.id() != category.id()
        {
            return Err(CategoryError::invalid(format!(
                "\"{category}\": location \"{location}\" is already used by \"{owner}\""
            )));
        }
        Ok(())
    }

    fn insert(&mut self, category: CategoryRef) {
        if let Some(location) = category.location() {
            self.locations.insert(location.to_owned(), Arc::clone(&category));
        }
        self.order.push(category.id().to_owned());
        self.categories.insert(category.id().to_owned(), category);
    }

    fn unregister(&mut self, category: &Category) -> Option<CategoryRef> {
        let removed = self.categories.remove(category.id())?;
        self.order.retain(|id| id != removed.id());
        if let Some(location) = removed.location() {
            self.locations.remove(location);
        }
        self.behaviors.remove(removed.id());
        for action in removed.actions() {
            self.unregister(action);
        }
        Some(removed)
    }
}

/// Thread-safe store of category definitions, indexed by id and location.
///
/// Cloning is cheap and yields a handle to the same registry. A new registry
/// already holds the built-in core categories.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut inner = RegistryInner::default();
        for category in builtin::all() {
            inner.insert(category);
        }
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    /// Registers a category together with its actions, replacing any category
    /// with the same identifier.
    ///
    /// # Errors
    /// [`CategoryError::Invalid`] for nested actions, self-relation or a
    /// location already owned by another category. The registry is unchanged
    /// on error.
    pub fn register(&self, category: CategoryRef) -> Result<(), CategoryError> {
        debug!(category = %category, location = ?category.location(), "Registering category");
        self.inner.write().register(category)
    }

    /// Like [`CategoryRegistry::register`] but refuses to replace an existing category.
    ///
    /// # Errors
    /// [`CategoryError::Invalid`] when the identifier is already registered,
    /// plus everything [`CategoryRegistry::register`] rejects.
    pub fn register_unique(&self, category: CategoryRef) -> Result<(), CategoryError> {
        let mut inner = self.inner.write();
        if inner.categories.contains_key(category.id()) {
            return Err(CategoryError::invalid(format!("\"{category}\": already registered")));
        }
        debug!(category = %category, location = ?category.location(), "Registering new category");
        inner.register(category)
    }

    /// Registers a Kind and the behavior its entities are built with.
    ///
    /// # Errors
    /// Same as [`CategoryRegistry::register`].
    pub fn register_with_behavior(
        &self,
        kind: CategoryRef,
        behavior: Arc<dyn EntityBehavior>,
    ) -> Result<(), CategoryError> {
        let id = kind.id().to_owned();
        let mut inner = self.inner.write();
        inner.register(kind)?;
        inner.behaviors.insert(id, behavior);
        Ok(())
    }

    /// Removes a category and, recursively, its actions.
    ///
    /// # Errors
    /// [`CategoryError::DoesNotExist`] when the category is not registered.
    pub fn unregister(&self, category: &Category) -> Result<CategoryRef, CategoryError> {
        debug!(category = %category, "Unregistering category");
        self.inner
            .write()
            .unregister(category)
            .ok_or_else(|| CategoryError::DoesNotExist { id: category.id().to_owned() })
    }

    /// # Errors
    /// [`CategoryError::DoesNotExist`] for unknown identifiers.
    pub fn lookup_id(&self, id: &str) -> Result<CategoryRef, CategoryError> {
        self.inner
            .read()
            .categories
            .get(id)
            .cloned()
            .ok_or_else(|| CategoryError::DoesNotExist { id: id.to_owned() })
    }

    /// Finds the category owning `location`; a leading slash is ignored.
    #[must_use]
    pub fn lookup_location(&self, location: &str) -> Option<CategoryRef> {
        self.inner.read().locations.get(location.trim_start_matches('/')).cloned()
    }

    /// Resolves a category read from the wire to its registered definition.
    ///
    /// # Errors
    /// [`CategoryError::DoesNotExist`] when no category has the same identifier.
    pub fn resolve(&self, category: &Category) -> Result<CategoryRef, CategoryError> {
        self.lookup_id(category.id())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().categories.contains_key(id)
    }

    /// Every registered category in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<CategoryRef> {
        let inner = self.inner.read();
        inner.order.iter().filter_map(|id| inner.categories.get(id).cloned()).collect()
    }

    #[must_use]
    pub fn behavior(&self, kind: &Category) -> Arc<dyn EntityBehavior> {
        self.inner
            .read()
            .behaviors
            .get(kind.id())
            .cloned()
            .unwrap_or_else(|| Arc::new(DefaultBehavior))
    }

    /// Builds a new entity of `kind` and lets the Kind's behavior initialize it.
    ///
    /// # Errors
    /// [`EntityError::InvalidCategory`] when `kind` is not a Kind, or whatever
    /// the behavior reports.
    pub fn instantiate(&self, kind: &CategoryRef) -> Result<Entity, EntityError> {
        let mut entity = Entity::new(Arc::clone(kind))?;
        self.behavior(kind).initialize(&mut entity)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    const SCHEME: &str = "http://example.com/occi#";
    const ACTION_SCHEME: &str = "http://example.com/occi/vm/action#";

    fn vm_kind(location: &str) -> CategoryRef {
        let start = Category::action("start", ACTION_SCHEME).build().unwrap();
        Category::kind("vm", SCHEME)
            .related(&builtin::resource_kind())
            .location(location)
            .action(&start)
            .build()
            .unwrap()
    }

    #[test]
    fn new_registry_holds_builtins() {
        let registry = CategoryRegistry::new();
        let ids: Vec<_> = registry.all().iter().map(|c| c.id().to_owned()).collect();
        assert_eq!(ids.len(), 4);
        assert!(registry.contains("http://schemas.ogf.org/occi/core#resource"));
    }

    #[test]
    fn register_adds_actions_and_location() {
        let registry = CategoryRegistry::new();
        registry.register(vm_kind("vm/")).unwrap();

        assert!(registry.contains("http://example.com/occi/vm/action#start"));
        assert_eq!(registry.lookup_location("/vm/").unwrap().term(), "vm");
        assert_eq!(registry.lookup_location("vm/").unwrap().term(), "vm");
        assert!(registry.lookup_location("nothing/").is_none());
    }

    #[test]
    fn unregister_removes_actions() {
        let registry = CategoryRegistry::new();
        let kind = vm_kind("vm/");
        registry.register(Arc::clone(&kind)).unwrap();
        registry.unregister(&kind).unwrap();

        assert!(!registry.contains(kind.id()));
        assert!(!registry.contains("http://example.com/occi/vm/action#start"));
        assert!(registry.lookup_location("vm/").is_none());
        assert!(matches!(registry.unregister(&kind), Err(CategoryError::DoesNotExist { .. })));
    }

    #[test]
    fn replace_keeps_single_entry() {
        let registry = CategoryRegistry::new();
        registry.register(vm_kind("vm/")).unwrap();
        registry.register(vm_kind("machines/")).unwrap();

        assert_eq!(registry.all().len(), 6);
        assert!(registry.lookup_location("vm/").is_none());
        assert_eq!(registry.lookup_location("machines/").unwrap().term(), "vm");
    }

    #[test]
    fn location_conflict_is_rejected_atomically() {
        let registry = CategoryRegistry::new();
        registry.register(vm_kind("vm/")).unwrap();
        let clash = Category::mixin("tag", SCHEME).location("vm/").build().unwrap();

        let err = registry.register(clash).unwrap_err();
        assert!(err.to_string().contains("already used"));
        assert!(!registry.contains("http://example.com/occi#tag"));
        assert_eq!(registry.lookup_location("vm/").unwrap().term(), "vm");
    }

    #[test]
    fn nested_actions_are_rejected() {
        let inner = Category::action("inner", ACTION_SCHEME).build().unwrap();
        let outer = Category::action("outer", ACTION_SCHEME).action(&inner).build().unwrap();
        let registry = CategoryRegistry::new();
        assert!(registry.register(Arc::clone(&outer)).is_err());

        let kind = Category::kind("vm", SCHEME).action(&outer).build().unwrap();
        assert!(registry.register(kind).is_err());
        assert!(!registry.contains(outer.id()));
    }

    #[test]
    fn register_unique_refuses_duplicates() {
        let registry = CategoryRegistry::new();
        let tag = Category::mixin("tag", SCHEME).location("tag/").build().unwrap();
        registry.register_unique(Arc::clone(&tag)).unwrap();
        assert!(registry.register_unique(tag).is_err());
    }

    #[test]
    fn lookup_unknown_id_fails() {
        let err = CategoryRegistry::new().lookup_id("http://nowhere#x").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn instantiate_uses_default_behavior() {
        let registry = CategoryRegistry::new();
        let kind = Category::kind("vm", SCHEME)
            .related(&builtin::resource_kind())
            .attribute(Attribute::int("cores"))
            .build()
            .unwrap();
        registry.register(Arc::clone(&kind)).unwrap();

        let entity = registry.instantiate(&kind).unwrap();
        assert!(entity.is_resource());
        assert!(entity.id().is_none());
        assert!(registry.instantiate(&builtin::action_category()).is_err());
    }

    #[test]
    fn clones_share_state() {
        let registry = CategoryRegistry::new();
        let handle = registry.clone();
        handle.register(vm_kind("vm/")).unwrap();
        assert!(registry.lookup_location("vm/").is_some());
    }
}

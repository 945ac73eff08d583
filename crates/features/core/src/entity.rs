//! Entities: Resources, Links and the attribute validation state machine.

use crate::attribute::{Attribute, AttributeValue};
use crate::builtin::{SOURCE, TARGET};
use crate::category::{Category, CategoryRef, EntityType};
use crate::error::EntityError;
use fxhash::{FxHashMap, FxHashSet};

/// An instance of exactly one Kind, with any number of Mixins attached.
///
/// Resources additionally own their outgoing [`Link`](EntityType::Link)s.
/// Links hold the ids of their endpoints in the `source` and `target`
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: Option<String>,
    kind: CategoryRef,
    mixins: Vec<CategoryRef>,
    attributes: FxHashMap<String, AttributeValue>,
    available_actions: Vec<CategoryRef>,
    applicable_actions: FxHashSet<String>,
    links: Vec<Entity>,
}

impl Entity {
    /// # Errors
    /// [`EntityError::InvalidCategory`] when `kind` is not a Kind.
    pub fn new(kind: CategoryRef) -> Result<Self, EntityError> {
        if !kind.is_kind() {
            return Err(EntityError::InvalidCategory {
                name: kind.id().to_owned(),
                message: "not a Kind".into(),
            });
        }
        let available_actions = kind.actions().to_vec();
        Ok(Self {
            id: None,
            kind,
            mixins: Vec::new(),
            attributes: FxHashMap::default(),
            available_actions,
            applicable_actions: FxHashSet::default(),
            links: Vec::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    #[must_use]
    pub const fn kind(&self) -> &CategoryRef {
        &self.kind
    }

    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type().unwrap_or_default()
    }

    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.entity_type() == EntityType::Resource
    }

    #[must_use]
    pub fn is_link(&self) -> bool {
        self.entity_type() == EntityType::Link
    }

    #[must_use]
    pub fn mixins(&self) -> &[CategoryRef] {
        &self.mixins
    }

    /// The Kind followed by the Mixins in attachment order.
    #[must_use]
    pub fn list_categories(&self) -> Vec<CategoryRef> {
        std::iter::once(&self.kind).chain(&self.mixins).cloned().collect()
    }

    #[must_use]
    pub fn has_category(&self, category: &Category) -> bool {
        *self.kind == *category || self.mixins.iter().any(|m| **m == *category)
    }

    /// Attaches a Mixin; re-attaching the same identifier replaces it in place.
    ///
    /// # Errors
    /// [`EntityError::InvalidCategory`] when `mixin` is not a Mixin.
    pub fn add_mixin(&mut self, mixin: CategoryRef) -> Result<(), EntityError> {
        if !mixin.is_mixin() {
            return Err(EntityError::InvalidCategory {
                name: mixin.id().to_owned(),
                message: "not a Mixin".into(),
            });
        }
        match self.mixins.iter_mut().find(|m| m.id() == mixin.id()) {
            Some(slot) => *slot = mixin,
            None => self.mixins.push(mixin),
        }
        self.refresh_actions();
        self.retain_defined_attributes();
        Ok(())
    }

    /// Detaches a Mixin and drops the values of attributes that only it defined.
    ///
    /// # Errors
    /// [`EntityError::UnknownCategory`] when the Mixin is not attached.
    pub fn remove_mixin(&mut self, mixin: &Category) -> Result<CategoryRef, EntityError> {
        let index = self
            .mixins
            .iter()
            .position(|m| **m == *mixin)
            .ok_or_else(|| EntityError::UnknownCategory { name: mixin.id().to_owned() })?;
        let removed = self.mixins.remove(index);
        self.refresh_actions();
        self.retain_defined_attributes();
        Ok(removed)
    }

    /// Every stored value must be defined by the Kind or an attached Mixin.
    fn retain_defined_attributes(&mut self) {
        let Self { kind, mixins, attributes, .. } = self;
        let defined: FxHashSet<&str> = std::iter::once(&*kind)
            .chain(mixins.iter())
            .flat_map(|c| c.attributes())
            .map(Attribute::name)
            .collect();
        attributes.retain(|name, _| defined.contains(name.as_str()));
    }

    fn refresh_actions(&mut self) {
        let mut seen = FxHashSet::default();
        self.available_actions = std::iter::once(&self.kind)
            .chain(&self.mixins)
            .flat_map(|c| c.actions())
            .filter(|a| seen.insert(a.id().to_owned()))
            .cloned()
            .collect();
        let available: FxHashSet<&str> = self.available_actions.iter().map(|a| a.id()).collect();
        self.applicable_actions.retain(|id| available.contains(id.as_str()));
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Imports attribute values.
    ///
    /// Walks every attribute defined by the Kind and the Mixins. A mutable
    /// attribute always accepts a value; an immutable one only while it is
    /// required and still unset. With `validate` off, immutability and the
    /// required check are skipped. Values are coerced to the declared type.
    /// Nothing is stored unless the whole import succeeds.
    ///
    /// # Errors
    /// `DuplicateAttribute`, `ImmutableAttribute`, `RequiredAttribute`,
    /// `UnknownAttribute` or `InvalidValue`, each naming the attribute.
    pub fn import_attributes<N, V>(
        &mut self,
        attributes: impl IntoIterator<Item = (N, V)>,
        validate: bool,
    ) -> Result<(), EntityError>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        self.import_deferring(attributes, validate, &[])
    }

    /// [`Entity::import_attributes`] with `deferred` attributes exempt from
    /// the required check; something else sets them later.
    pub(crate) fn import_deferring<N, V>(
        &mut self,
        attributes: impl IntoIterator<Item = (N, V)>,
        validate: bool,
        deferred: &[&str],
    ) -> Result<(), EntityError>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let mut input: Vec<(String, AttributeValue)> = Vec::new();
        for (name, value) in attributes {
            let name = name.into();
            if input.iter().any(|(seen, _)| *seen == name) {
                return Err(EntityError::DuplicateAttribute { name });
            }
            input.push((name, value.into()));
        }

        let mut staged = self.attributes.clone();
        let mut visited = FxHashSet::default();
        let categories = self.list_categories();
        for definition in categories.iter().flat_map(|c| c.attributes()) {
            let name = definition.name();
            if !visited.insert(name) {
                continue;
            }

            if let Some(index) = input.iter().position(|(n, _)| n == name) {
                let (_, value) = input.remove(index);
                let writable = !validate
                    || definition.is_mutable()
                    || (definition.is_required() && !staged.contains_key(name));
                if !writable {
                    return Err(EntityError::ImmutableAttribute { name: name.to_owned() });
                }
                staged.insert(name.to_owned(), definition.coerce(value)?);
            }

            let missing = definition.is_required() && !staged.contains_key(name);
            if validate && missing && !deferred.contains(&name) {
                return Err(EntityError::RequiredAttribute { name: name.to_owned() });
            }
        }

        if let Some((name, _)) = input.into_iter().next() {
            return Err(EntityError::UnknownAttribute { name });
        }

        self.attributes = staged;
        Ok(())
    }

    /// Current values in Kind-then-Mixin, then declaration order.
    #[must_use]
    pub fn export_attributes(&self) -> Vec<(String, AttributeValue)> {
        let mut visited = FxHashSet::default();
        let mut exported = Vec::new();
        for category in std::iter::once(&self.kind).chain(&self.mixins) {
            for definition in category.attributes() {
                let name = definition.name();
                if !visited.insert(name) {
                    continue;
                }
                if let Some(value) = self.attributes.get(name) {
                    exported.push((name.to_owned(), value.clone()));
                }
            }
        }
        exported
    }

    /// Actions offered by the Kind and the attached Mixins.
    #[must_use]
    pub fn available_actions(&self) -> &[CategoryRef] {
        &self.available_actions
    }

    #[must_use]
    pub fn available_action(&self, term: &str) -> Option<&CategoryRef> {
        self.available_actions.iter().find(|a| a.term() == term)
    }

    /// Applicable actions, in the order they are available.
    #[must_use]
    pub fn applicable_actions(&self) -> Vec<CategoryRef> {
        self.available_actions
            .iter()
            .filter(|a| self.applicable_actions.contains(a.id()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_applicable_action(&self, action: &Category) -> bool {
        self.applicable_actions.contains(action.id())
    }

    /// # Errors
    /// [`EntityError::UnknownCategory`] when the action is not available.
    pub fn set_applicable_action(&mut self, action: &Category, applicable: bool) -> Result<(), EntityError> {
        if !self.available_actions.iter().any(|a| **a == *action) {
            return Err(EntityError::UnknownCategory { name: action.id().to_owned() });
        }
        if applicable {
            self.applicable_actions.insert(action.id().to_owned());
        } else {
            self.applicable_actions.remove(action.id());
        }
        Ok(())
    }

    /// Outgoing links of a Resource. Always empty for other entity types.
    #[must_use]
    pub fn links(&self) -> &[Self] {
        &self.links
    }

    /// Adds or replaces (by id) an outgoing link.
    ///
    /// # Errors
    /// [`EntityError::InvalidCategory`] when this entity is not a Resource or
    /// `link` is not a Link.
    pub fn add_link(&mut self, link: Self) -> Result<(), EntityError> {
        if !self.is_resource() {
            return Err(EntityError::InvalidCategory {
                name: self.kind.id().to_owned(),
                message: "only Resources can own links".into(),
            });
        }
        if !link.is_link() {
            return Err(EntityError::InvalidCategory {
                name: link.kind.id().to_owned(),
                message: "not a Link Kind".into(),
            });
        }
        match self.links.iter_mut().find(|l| l.id.is_some() && l.id == link.id) {
            Some(slot) => *slot = link,
            None => self.links.push(link),
        }
        Ok(())
    }

    /// # Errors
    /// [`EntityError::DoesNotExist`] when no link has this id.
    pub fn remove_link(&mut self, id: &str) -> Result<Self, EntityError> {
        let index = self
            .links
            .iter()
            .position(|l| l.id() == Some(id))
            .ok_or_else(|| EntityError::DoesNotExist { id: id.to_owned() })?;
        Ok(self.links.remove(index))
    }

    pub fn take_links(&mut self) -> Vec<Self> {
        std::mem::take(&mut self.links)
    }

    pub fn set_links(&mut self, links: Vec<Self>) {
        if self.is_resource() {
            self.links = links;
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.attribute(SOURCE).and_then(AttributeValue::as_str)
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.attribute(TARGET).and_then(AttributeValue::as_str)
    }
}

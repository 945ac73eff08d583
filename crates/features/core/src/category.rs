//! Kinds, Mixins and Actions.
//!
//! A [`Category`] is identified by `scheme + term` and is shared as an
//! immutable [`CategoryRef`]. Kinds and Mixins carry the full attribute set
//! they define (inherited ones first) and the actions they offer; a bare
//! category of class [`CategoryClass::Action`] defines an action and its
//! parameters.

use crate::attribute::Attribute;
use crate::error::CategoryError;
use fxhash::FxHashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

pub type CategoryRef = Arc<Category>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CategoryClass {
    Kind,
    Mixin,
    /// Bare category, used to define actions.
    Action,
}

/// Capability type of the entities a Kind instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityType {
    #[default]
    Entity,
    Resource,
    Link,
}

#[derive(Debug, Clone)]
pub struct Category {
    id: String,
    term: String,
    scheme: String,
    title: Option<String>,
    class: CategoryClass,
    related: Option<CategoryRef>,
    attributes: Vec<Attribute>,
    unique_attributes: Vec<Attribute>,
    actions: Vec<CategoryRef>,
    location: Option<String>,
    entity_type: Option<EntityType>,
    user_defined: bool,
}

impl Category {
    pub fn kind(term: impl Into<String>, scheme: impl Into<String>) -> CategoryBuilder {
        CategoryBuilder::new(CategoryClass::Kind, term.into(), scheme.into())
    }

    pub fn mixin(term: impl Into<String>, scheme: impl Into<String>) -> CategoryBuilder {
        CategoryBuilder::new(CategoryClass::Mixin, term.into(), scheme.into())
    }

    pub fn action(term: impl Into<String>, scheme: impl Into<String>) -> CategoryBuilder {
        CategoryBuilder::new(CategoryClass::Action, term.into(), scheme.into())
    }

    pub fn builder(
        class: CategoryClass,
        term: impl Into<String>,
        scheme: impl Into<String>,
    ) -> CategoryBuilder {
        CategoryBuilder::new(class, term.into(), scheme.into())
    }

    /// Starts a builder carrying this category's own definition.
    pub fn to_builder(&self) -> CategoryBuilder {
        CategoryBuilder {
            class: self.class,
            term: self.term.clone(),
            scheme: self.scheme.clone(),
            title: self.title.clone(),
            related: self.related.clone(),
            attributes: self.unique_attributes.clone(),
            actions: self.actions.clone(),
            location: self.location.clone(),
            entity_type: self.entity_type,
            user_defined: self.user_defined,
        }
    }

    /// `scheme + term`, with no separator.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub const fn class(&self) -> CategoryClass {
        self.class
    }

    #[must_use]
    pub fn is_kind(&self) -> bool {
        self.class == CategoryClass::Kind
    }

    #[must_use]
    pub fn is_mixin(&self) -> bool {
        self.class == CategoryClass::Mixin
    }

    #[must_use]
    pub fn is_action(&self) -> bool {
        self.class == CategoryClass::Action
    }

    #[must_use]
    pub const fn related(&self) -> Option<&CategoryRef> {
        self.related.as_ref()
    }

    /// Whether `other` is this category or one of its ancestors.
    #[must_use]
    pub fn is_related(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(category) = current {
            if category == other {
                return true;
            }
            current = category.related.as_deref();
        }
        false
    }

    /// All attributes, inherited ones first.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attributes declared by this category itself.
    #[must_use]
    pub fn unique_attributes(&self) -> &[Attribute] {
        &self.unique_attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    #[must_use]
    pub fn actions(&self) -> &[CategoryRef] {
        &self.actions
    }

    /// Location relative to the base URL, without a leading slash.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub const fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }

    #[must_use]
    pub const fn is_user_defined(&self) -> bool {
        self.user_defined
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone)]
#[must_use = "The builder does nothing until `build` is called."]
pub struct CategoryBuilder {
    class: CategoryClass,
    term: String,
    scheme: String,
    title: Option<String>,
    related: Option<CategoryRef>,
    attributes: Vec<Attribute>,
    actions: Vec<CategoryRef>,
    location: Option<String>,
    entity_type: Option<EntityType>,
    user_defined: bool,
}

impl CategoryBuilder {
    const fn new(class: CategoryClass, term: String, scheme: String) -> Self {
        Self {
            class,
            term,
            scheme,
            title: None,
            related: None,
            attributes: Vec::new(),
            actions: Vec::new(),
            location: None,
            entity_type: None,
            user_defined: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn related(mut self, related: &CategoryRef) -> Self {
        self.related = Some(Arc::clone(related));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn action(mut self, action: &CategoryRef) -> Self {
        self.actions.push(Arc::clone(action));
        self
    }

    pub fn actions<'a>(mut self, actions: impl IntoIterator<Item = &'a CategoryRef>) -> Self {
        self.actions.extend(actions.into_iter().map(Arc::clone));
        self
    }

    /// Location relative to the base URL. A leading slash is dropped.
    pub fn location(mut self, location: impl AsRef<str>) -> Self {
        let location = location.as_ref().trim_start_matches('/');
        self.location = (!location.is_empty()).then(|| location.to_owned());
        self
    }

    pub const fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub const fn user_defined(mut self, user_defined: bool) -> Self {
        self.user_defined = user_defined;
        self
    }

    /// Validates and freezes the definition.
    ///
    /// # Errors
    /// [`CategoryError::Invalid`] for an empty term or scheme, a related
    /// category of another class, self-relation, or duplicate attribute names.
    pub fn build(self) -> Result<CategoryRef, CategoryError> {
        self.validate()?;
        Ok(self.build_unchecked())
    }

    fn validate(&self) -> Result<(), CategoryError> {
        let id = format!("{}{}", self.scheme, self.term);
        if self.term.trim().is_empty() {
            return Err(CategoryError::invalid(format!("\"{id}\": term cannot be empty")));
        }
        if self.scheme.trim().is_empty() {
            return Err(CategoryError::invalid(format!("\"{id}\": scheme cannot be empty")));
        }

        if let Some(related) = &self.related {
            if related.class() != self.class {
                return Err(CategoryError::invalid(format!(
                    "\"{id}\": a {} can only be related to a {}, not to {} \"{}\"",
                    self.class,
                    self.class,
                    related.class(),
                    related.id()
                )));
            }
            if related.id() == id {
                return Err(CategoryError::invalid(format!("\"{id}\": related to itself")));
            }
        }

        let inherited = self.related.iter().flat_map(|r| r.attributes());
        let mut names = FxHashSet::default();
        for attribute in inherited.chain(&self.attributes) {
            if !names.insert(attribute.name()) {
                return Err(CategoryError::invalid(format!(
                    "\"{id}\": duplicate attribute \"{}\"",
                    attribute.name()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn build_unchecked(self) -> CategoryRef {
        let mut attributes: Vec<Attribute> =
            self.related.iter().flat_map(|r| r.attributes().iter().cloned()).collect();
        attributes.extend(self.attributes.iter().cloned());

        let entity_type = match self.class {
            CategoryClass::Kind => {
                self.entity_type.or_else(|| self.related.as_ref().and_then(|r| r.entity_type()))
            },
            _ => None,
        };

        Arc::new(Category {
            id: format!("{}{}", self.scheme, self.term),
            term: self.term,
            scheme: self.scheme,
            title: self.title,
            class: self.class,
            related: self.related,
            attributes,
            unique_attributes: self.attributes,
            actions: self.actions,
            location: self.location,
            entity_type,
            user_defined: self.user_defined,
        })
    }
}

/// Splits a category identifier into `(scheme, term)` at its last `#`.
#[must_use]
pub fn split_id(id: &str) -> Option<(&str, &str)> {
    let index = id.rfind('#')?;
    let (scheme, term) = id.split_at(index + 1);
    (!term.is_empty()).then_some((scheme, term))
}

//! Format-neutral exchange object between entities and wire codecs.
//!
//! Parsers produce [`DataObject`]s, renderers consume them. Export from an
//! entity and import back into one (or into an action) happen here so every
//! codec shares the same semantics.

use crate::action::ActionInstance;
use crate::attribute::AttributeValue;
use crate::builtin::{self, SOURCE, TARGET, TITLE};
use crate::category::{CategoryRef, EntityType};
use crate::entity::Entity;
use crate::error::DataObjectError;
use crate::registry::CategoryRegistry;
use crate::translator::UrlTranslator;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Hints for renderers about what a [`DataObject`] stands for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderFlags: u8 {
        /// Category definitions for the discovery interface.
        const CATEGORY_DISCOVERY = 1;
        /// A single rendered entity.
        const RESOURCE_INSTANCE = 1 << 1;
    }
}

/// An outgoing link as seen from its source resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkRepr {
    pub target_location: Option<String>,
    pub target_title: Option<String>,
    pub target_categories: Vec<CategoryRef>,
    pub link_location: Option<String>,
    pub link_categories: Vec<CategoryRef>,
    pub link_attributes: Vec<(String, AttributeValue)>,
}

/// An action that can currently be triggered on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRepr {
    /// `<entity location>?action=<term>`
    pub location: String,
    pub category: CategoryRef,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Enforce immutability and required attributes.
    pub validate: bool,
    /// Build link entities from [`DataObject::links`].
    pub create_links: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { validate: true, create_links: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataObject {
    pub categories: Vec<CategoryRef>,
    pub attributes: Vec<(String, AttributeValue)>,
    pub links: Vec<LinkRepr>,
    pub actions: Vec<ActionRepr>,
    pub location: Option<String>,
    pub render_flags: RenderFlags,
}

impl DataObject {
    #[must_use]
    pub fn with_location(location: impl Into<String>) -> Self {
        Self { location: Some(location.into()), ..Self::default() }
    }

    /// Category definitions for the discovery interface.
    #[must_use]
    pub fn discovery(categories: Vec<CategoryRef>) -> Self {
        Self { categories, render_flags: RenderFlags::CATEGORY_DISCOVERY, ..Self::default() }
    }

    /// Exports an entity.
    ///
    /// `targets` are the entities the resource's links point to; they supply
    /// the title and categories of each link target. Missing targets only
    /// lose that decoration.
    #[must_use]
    pub fn load_from_entity(entity: &Entity, translator: &UrlTranslator, targets: &[Entity]) -> Self {
        let location = entity.id().map(|id| translator.to_url(id, None));

        let attributes = entity
            .export_attributes()
            .into_iter()
            .map(|(name, value)| match value {
                AttributeValue::String(id) if entity.is_link() && is_endpoint(&name) => {
                    let url = translator.to_url(&id, None);
                    (name, AttributeValue::String(url))
                },
                value => (name, value),
            })
            .collect();

        let links =
            entity.links().iter().map(|link| LinkRepr::from_link(link, translator, targets)).collect();

        let actions = location.as_ref().map_or_else(Vec::new, |location| {
            entity
                .applicable_actions()
                .into_iter()
                .map(|category| ActionRepr {
                    location: format!("{location}?action={}", category.term()),
                    title: category.title().map(str::to_owned),
                    category,
                })
                .collect()
        });

        Self {
            categories: entity.list_categories(),
            attributes,
            links,
            actions,
            location,
            render_flags: RenderFlags::RESOURCE_INSTANCE,
        }
    }

    /// Imports into `entity`, or into a new entity of the requested Kind.
    ///
    /// Categories are resolved through `registry` when given. At most one
    /// Kind may be named; it must match the Kind of an existing entity.
    /// Location-form `source`/`target` values are translated to ids.
    ///
    /// # Errors
    /// [`DataObjectError::Invalid`] for Kind problems and malformed links,
    /// plus category resolution and attribute validation errors.
    pub fn save_to_entity(
        &self,
        entity: Option<Entity>,
        registry: Option<&CategoryRegistry>,
        translator: &UrlTranslator,
        options: ImportOptions,
    ) -> Result<Entity, DataObjectError> {
        let categories = resolve_all(&self.categories, registry)?;
        let (kind, mixins) = split_categories(categories)?;

        let mut entity = match (entity, kind) {
            (Some(existing), Some(kind)) if *existing.kind() != kind => {
                return Err(DataObjectError::invalid(format!(
                    "\"{kind}\": the Kind of \"{}\" cannot change",
                    existing.id().unwrap_or_default()
                )));
            },
            (Some(existing), _) => existing,
            (None, Some(kind)) => instantiate(&kind, registry)?,
            (None, None) => return Err(DataObjectError::invalid("no Kind specified")),
        };

        for mixin in mixins {
            entity.add_mixin(mixin)?;
        }

        let is_link = entity.is_link();
        let attributes: Vec<(String, AttributeValue)> = self
            .attributes
            .iter()
            .map(|(name, value)| match value {
                AttributeValue::String(url) if is_link && is_endpoint(name) => {
                    (name.clone(), AttributeValue::String(translator.to_id(url)))
                },
                value => (name.clone(), value.clone()),
            })
            .collect();
        entity.import_attributes(attributes, options.validate)?;

        if options.create_links {
            for repr in &self.links {
                let link = repr.save_as_link(&entity, registry, translator, options.validate)?;
                entity.add_link(link)?;
            }
        }

        Ok(entity)
    }

    /// Interprets the object as an action invocation.
    ///
    /// # Errors
    /// [`DataObjectError::Invalid`] unless exactly one action category is
    /// given, plus resolution and parameter validation errors.
    pub fn save_as_action(&self, registry: Option<&CategoryRegistry>) -> Result<ActionInstance, DataObjectError> {
        let [category] = self.categories.as_slice() else {
            return Err(DataObjectError::invalid(format!(
                "exactly one action category expected, got {}",
                self.categories.len()
            )));
        };
        let category = resolve(category, registry)?;
        if !category.is_action() {
            return Err(DataObjectError::invalid(format!("\"{category}\": not an action")));
        }

        let mut action = ActionInstance::new(category);
        action.bind_parameters(self.attributes.iter().cloned())?;
        Ok(action)
    }
}

impl LinkRepr {
    fn from_link(link: &Entity, translator: &UrlTranslator, targets: &[Entity]) -> Self {
        let target_id = link.target();
        let target = target_id.and_then(|id| targets.iter().find(|t| t.id() == Some(id)));

        let link_attributes: Vec<_> =
            link.export_attributes().into_iter().filter(|(name, _)| !is_endpoint(name)).collect();
        let describe_link = !link_attributes.is_empty();

        Self {
            target_location: target_id.map(|id| translator.to_url(id, None)),
            target_title: target.and_then(|t| t.attribute(TITLE)).map(ToString::to_string),
            target_categories: target.map(Entity::list_categories).unwrap_or_default(),
            link_location: link.id().filter(|_| describe_link).map(|id| translator.to_url(id, None)),
            link_categories: if describe_link { link.list_categories() } else { Vec::new() },
            link_attributes,
        }
    }

    /// Builds the link entity leaving `source`.
    ///
    /// With `validate`, link attributes follow the same rules as entity
    /// attributes. A source without an id yet leaves `source` to the store.
    ///
    /// # Errors
    /// [`DataObjectError::Invalid`] without a target, for a target Kind that
    /// is not a Resource, or a link Kind that is not a Link, plus attribute
    /// validation errors.
    pub fn save_as_link(
        &self,
        source: &Entity,
        registry: Option<&CategoryRegistry>,
        translator: &UrlTranslator,
        validate: bool,
    ) -> Result<Entity, DataObjectError> {
        let target = self
            .target_location
            .as_deref()
            .ok_or_else(|| DataObjectError::invalid("link without target"))?;

        let target_categories = resolve_all(&self.target_categories, registry)?;
        if let Some(kind) = target_categories.iter().find(|c| c.is_kind())
            && kind.entity_type() != Some(EntityType::Resource)
        {
            return Err(DataObjectError::invalid(format!("\"{kind}\": link target is not a Resource")));
        }

        let (kind, mixins) = split_categories(resolve_all(&self.link_categories, registry)?)?;
        let kind = match kind {
            Some(kind) => kind,
            None => resolve(&builtin::link_kind(), registry)?,
        };
        if kind.entity_type() != Some(EntityType::Link) {
            return Err(DataObjectError::invalid(format!("\"{kind}\": not a Link Kind")));
        }

        let mut link = instantiate(&kind, registry)?;
        if let Some(location) = &self.link_location {
            link.set_id(translator.to_id(location));
        }
        for mixin in mixins {
            link.add_mixin(mixin)?;
        }

        let mut attributes = vec![(TARGET.to_owned(), AttributeValue::String(translator.to_id(target)))];
        let deferred: &[&str] = match source.id() {
            Some(source) => {
                attributes.push((SOURCE.to_owned(), AttributeValue::String(source.to_owned())));
                &[]
            },
            None => &[SOURCE],
        };
        attributes.extend(self.link_attributes.iter().filter(|(name, _)| !is_endpoint(name)).cloned());
        link.import_deferring(attributes, validate, deferred)?;

        Ok(link)
    }
}

fn is_endpoint(name: &str) -> bool {
    name == SOURCE || name == TARGET
}

fn resolve(category: &CategoryRef, registry: Option<&CategoryRegistry>) -> Result<CategoryRef, DataObjectError> {
    match registry {
        Some(registry) => Ok(registry.resolve(category)?),
        None => Ok(Arc::clone(category)),
    }
}

fn resolve_all(
    categories: &[CategoryRef],
    registry: Option<&CategoryRegistry>,
) -> Result<Vec<CategoryRef>, DataObjectError> {
    categories.iter().map(|c| resolve(c, registry)).collect()
}

/// Separates the single Kind from the Mixins.
fn split_categories(categories: Vec<CategoryRef>) -> Result<(Option<CategoryRef>, Vec<CategoryRef>), DataObjectError> {
    let mut kind: Option<CategoryRef> = None;
    let mut mixins = Vec::new();
    for category in categories {
        if category.is_kind() {
            if let Some(first) = &kind {
                return Err(DataObjectError::invalid(format!(
                    "only one Kind allowed, got \"{first}\" and \"{category}\""
                )));
            }
            kind = Some(category);
        } else if category.is_mixin() {
            mixins.push(category);
        } else {
            return Err(DataObjectError::invalid(format!("\"{category}\": not a Kind or Mixin")));
        }
    }
    Ok((kind, mixins))
}

fn instantiate(kind: &CategoryRef, registry: Option<&CategoryRegistry>) -> Result<Entity, DataObjectError> {
    let entity = match registry {
        Some(registry) => registry.instantiate(kind)?,
        None => Entity::new(Arc::clone(kind))?,
    };
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_only_objects() {
        let object = DataObject::with_location("http://localhost/compute/1");
        assert!(object.categories.is_empty());
        assert_eq!(object.render_flags, RenderFlags::empty());
        assert_eq!(object.location.as_deref(), Some("http://localhost/compute/1"));
    }

    #[test]
    fn discovery_flag_is_set() {
        let object = DataObject::discovery(builtin::all().to_vec());
        assert!(object.render_flags.contains(RenderFlags::CATEGORY_DISCOVERY));
        assert_eq!(object.categories.len(), 4);
    }

    #[test]
    fn action_import_needs_exactly_one_category() {
        let object = DataObject::default();
        assert!(matches!(object.save_as_action(None), Err(DataObjectError::Invalid { .. })));

        let object = DataObject { categories: vec![builtin::resource_kind()], ..DataObject::default() };
        let err = object.save_as_action(None).unwrap_err();
        assert!(err.to_string().contains("not an action"));
    }

    #[test]
    fn entity_import_needs_a_kind() {
        let translator = UrlTranslator::new("http://localhost");
        let err = DataObject::default()
            .save_to_entity(None, None, &translator, ImportOptions::default())
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("no Kind specified"));
    }
}

use fxhash::FxHashMap;
use occi_core::{Category, CategoryRef, Entity, EntityFilter, StoreError, builtin};
use occi_kernel::safe_nanoid;
use tracing::{debug, trace};

/// The whole store content. Cloned into a working copy for every batch.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tables {
    order: Vec<String>,
    entities: FxHashMap<String, Entity>,
    user_categories: Vec<CategoryRef>,
}

impl Tables {
    /// Returns `id` with its outgoing links attached.
    pub(crate) fn get(&self, id: &str) -> Option<Entity> {
        let mut entity = self.entities.get(id)?.clone();
        if entity.is_resource() {
            entity.set_links(self.links_from(id).cloned().collect());
        }
        Some(entity)
    }

    pub(crate) fn filter(&self, filter: &EntityFilter) -> Vec<Entity> {
        self.order
            .iter()
            .filter(|id| self.entities.get(id.as_str()).is_some_and(|e| filter.matches(e)))
            .filter_map(|id| self.get(id))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Stores `entity`, assigning ids to it and to its links.
    ///
    /// A resource's link list replaces the links previously stored for it.
    pub(crate) fn upsert(&mut self, mut entity: Entity, id_length: usize) -> Result<String, StoreError> {
        let id = match entity.id() {
            Some(id) => id.to_owned(),
            None => {
                let id = self.new_id(entity.kind(), id_length);
                entity.set_id(id.clone());
                id
            },
        };

        if entity.is_resource() {
            let links = entity.take_links();
            let mut kept = Vec::with_capacity(links.len());
            for mut link in links {
                if link.source() != Some(id.as_str()) {
                    link.import_attributes([(builtin::SOURCE, id.as_str())], false)?;
                }
                kept.push(self.upsert(link, id_length)?);
            }

            let stale: Vec<String> = self
                .links_from(&id)
                .filter_map(Entity::id)
                .filter(|link| !kept.iter().any(|k| k == *link))
                .map(str::to_owned)
                .collect();
            for link in stale {
                self.remove(&link);
            }
        }

        trace!(%id, "upsert");
        if self.entities.insert(id.clone(), entity).is_none() {
            self.order.push(id.clone());
        }
        Ok(id)
    }

    /// Removes `id`; a resource takes every link touching it along.
    pub(crate) fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let entity = self.entities.get(id).ok_or_else(|| StoreError::not_found(id))?;

        if entity.is_resource() {
            let attached: Vec<String> = self
                .entities
                .values()
                .filter(|e| e.is_link() && (e.source() == Some(id) || e.target() == Some(id)))
                .filter_map(Entity::id)
                .map(str::to_owned)
                .collect();
            for link in attached {
                debug!(%link, resource = %id, "cascading delete");
                self.remove(&link);
            }
        }

        self.remove(id);
        Ok(())
    }

    /// Every link must join two stored entities, and its source must be a resource.
    pub(crate) fn check_links(&self) -> Result<(), StoreError> {
        for link in self.entities.values().filter(|e| e.is_link()) {
            let id = link.id().unwrap_or_default();
            match link.source().and_then(|s| self.entities.get(s)) {
                Some(source) if source.is_resource() => {},
                Some(_) => {
                    return Err(StoreError::invalid_operation(format!(
                        "\"{id}\": link source is not a Resource"
                    )));
                },
                None => {
                    return Err(StoreError::invalid_operation(format!(
                        "\"{id}\": link source \"{}\" does not exist",
                        link.source().unwrap_or_default()
                    )));
                },
            }
            let target = link.target().unwrap_or_default();
            if !self.entities.contains_key(target) {
                return Err(StoreError::invalid_operation(format!(
                    "\"{id}\": link target \"{target}\" does not exist"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn user_categories(&self) -> &[CategoryRef] {
        &self.user_categories
    }

    /// Records a user Mixin; an identifier is recorded at most once.
    pub(crate) fn add_user_category(&mut self, category: &CategoryRef) -> Result<(), StoreError> {
        if self.user_categories.iter().any(|c| c.id() == category.id()) {
            return Err(StoreError::invalid_operation(format!("\"{category}\": already defined")));
        }
        self.user_categories.push(CategoryRef::clone(category));
        Ok(())
    }

    /// Forgets a user Mixin and detaches it from every entity.
    pub(crate) fn remove_user_category(&mut self, category: &Category) -> Result<(), StoreError> {
        let index = self
            .user_categories
            .iter()
            .position(|c| c.id() == category.id())
            .ok_or_else(|| StoreError::invalid_operation(format!("\"{category}\": not a user category")))?;
        self.user_categories.remove(index);

        for entity in self.entities.values_mut().filter(|e| e.has_category(category)) {
            entity.remove_mixin(category)?;
        }
        Ok(())
    }

    fn links_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(move |e| e.is_link() && e.source() == Some(source))
    }

    fn remove(&mut self, id: &str) {
        if self.entities.remove(id).is_some() {
            self.order.retain(|o| o != id);
        }
    }

    fn new_id(&self, kind: &Category, id_length: usize) -> String {
        let location = kind.location().unwrap_or_default();
        loop {
            let id = format!("{location}{}", safe_nanoid!(id_length));
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occi_core::{Attribute, AttributeValue};

    fn vm_kind() -> CategoryRef {
        Category::kind("vm", "http://example.com/occi#")
            .related(&builtin::resource_kind())
            .attribute(Attribute::string("name"))
            .location("vm/")
            .build()
            .unwrap()
    }

    fn link_to(target: &str) -> Entity {
        let mut link = Entity::new(builtin::link_kind()).unwrap();
        link.import_attributes([(builtin::TARGET, target)], false).unwrap();
        link
    }

    #[test]
    fn assigns_location_prefixed_ids() {
        let mut tables = Tables::default();
        let id = tables.upsert(Entity::new(vm_kind()).unwrap(), 8).unwrap();
        assert!(id.starts_with("vm/"));
        assert_eq!(id.len(), "vm/".len() + 8);
        assert_eq!(tables.get(&id).unwrap().id(), Some(id.as_str()));
    }

    #[test]
    fn links_are_stored_once_and_reattached() {
        let mut tables = Tables::default();
        let disk = tables.upsert(Entity::new(builtin::resource_kind()).unwrap(), 8).unwrap();

        let mut vm = Entity::new(vm_kind()).unwrap();
        vm.add_link(link_to(&disk)).unwrap();
        let vm_id = tables.upsert(vm, 8).unwrap();
        tables.check_links().unwrap();
        assert_eq!(tables.len(), 3);

        let vm = tables.get(&vm_id).unwrap();
        let [link] = vm.links() else { panic!("one link expected") };
        assert_eq!(link.source(), Some(vm_id.as_str()));
        assert_eq!(link.target(), Some(disk.as_str()));
        assert!(link.id().is_some());
    }

    #[test]
    fn resaving_replaces_the_link_set() {
        let mut tables = Tables::default();
        let disk = tables.upsert(Entity::new(builtin::resource_kind()).unwrap(), 8).unwrap();
        let mut vm = Entity::new(vm_kind()).unwrap();
        vm.add_link(link_to(&disk)).unwrap();
        let vm_id = tables.upsert(vm, 8).unwrap();

        let mut vm = tables.get(&vm_id).unwrap();
        vm.take_links();
        vm.import_attributes([("name", AttributeValue::from("web"))], true).unwrap();
        tables.upsert(vm, 8).unwrap();
        assert!(tables.get(&vm_id).unwrap().links().is_empty());
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn deleting_a_resource_cascades() {
        let mut tables = Tables::default();
        let disk = tables.upsert(Entity::new(builtin::resource_kind()).unwrap(), 8).unwrap();
        let mut vm = Entity::new(vm_kind()).unwrap();
        vm.add_link(link_to(&disk)).unwrap();
        let vm_id = tables.upsert(vm, 8).unwrap();

        tables.delete(&disk).unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables.get(&vm_id).unwrap().links().is_empty());
        assert!(matches!(tables.delete(&disk), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn dangling_targets_are_reported() {
        let mut tables = Tables::default();
        let mut vm = Entity::new(vm_kind()).unwrap();
        vm.add_link(link_to("vm/missing")).unwrap();
        tables.upsert(vm, 8).unwrap();
        let err = tables.check_links().unwrap_err();
        assert!(err.to_string().contains("link target \"vm/missing\" does not exist"));
    }
}

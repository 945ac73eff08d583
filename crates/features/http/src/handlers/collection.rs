use super::{Handler, bind_action};
use crate::error::ApiError;
use crate::message::{OcciRequest, OcciResponse};
use async_trait::async_trait;
use occi_core::{CategoryRef, DataObject, Entity, EntityFilter, ImportOptions};
use occi_kernel::server::state::ApiState;
use tracing::{debug, instrument};

/// The root collection, Kind and Mixin locations, and any other path ending in `/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionHandler;

impl CollectionHandler {
    /// The Kind or Mixin owning `path`, if any.
    fn category(state: &ApiState, path: &str) -> Option<CategoryRef> {
        if path.is_empty() { None } else { state.registry().lookup_location(path) }
    }

    fn mixin(state: &ApiState, path: &str) -> Result<CategoryRef, ApiError> {
        Self::category(state, path)
            .filter(|c| c.is_mixin())
            .ok_or_else(|| ApiError::bad_request(format!("\"{path}\": not a Mixin collection")))
    }
}

#[async_trait]
impl Handler for CollectionHandler {
    /// Lists the collection, narrowed by the request's categories and attributes.
    #[instrument(skip_all, fields(path = %request.path))]
    async fn get(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let mut filter = EntityFilter::default();
        if let Some(object) = request.objects.first() {
            for category in &object.categories {
                filter.categories.push(state.registry().resolve(category)?);
            }
            filter.attributes.clone_from(&object.attributes);
        }
        let category = Self::category(state, &request.path);
        if let Some(category) = &category {
            filter.categories.push(CategoryRef::clone(category));
        }

        let mut entities = state.store.filter_entities(&filter, request.user.as_ref()).await?;
        if category.is_none() && !request.path.is_empty() {
            entities.retain(|e| e.id().is_some_and(|id| id.starts_with(&request.path)));
        }
        debug!(count = entities.len(), "Collection listed");

        let objects = entities.iter().map(|e| DataObject::load_from_entity(e, &state.translator, &entities)).collect();
        Ok(OcciResponse::list(objects))
    }

    /// Creates an entity, or runs an action over the collection.
    #[instrument(skip_all, fields(path = %request.path, action = ?request.action))]
    async fn post(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let user = request.user.as_ref();
        let category = Self::category(state, &request.path);

        if let Some(term) = request.action.as_deref() {
            let actions = category.as_ref().map_or(&[][..], |c| c.actions());
            let action = match request.objects.first() {
                Some(object) if actions.is_empty() => object.save_as_action(Some(state.registry()))?,
                object => bind_action(actions, term, object, state.registry())?,
            };
            if action.term() != term {
                return Err(ApiError::bad_request(format!(
                    "\"{}\": does not match action \"{term}\"",
                    action.category()
                )));
            }
            state.store.exec_action_on_collection(&action, category.as_ref(), user).await?;
            return Ok(OcciResponse::Ok);
        }

        let mut object = request
            .objects
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::bad_request("Missing entity description"))?;
        if let Some(category) = &category
            && !object.categories.contains(category)
        {
            if let Some(kind) = object.categories.iter().find(|c| c.is_kind() && category.is_kind()) {
                return Err(ApiError::bad_request(format!(
                    "\"{kind}\": does not belong to collection \"{}\"",
                    request.path
                )));
            }
            object.categories.push(CategoryRef::clone(category));
        }

        let entity = object.save_to_entity(None, Some(state.registry()), &state.translator, ImportOptions::default())?;
        let saved = state.store.save_entities(vec![entity], &[], user).await?;
        let id = saved.first().and_then(Entity::id).ok_or_else(|| ApiError::from("store returned no entity id"))?;
        debug!(%id, "Entity created");
        Ok(OcciResponse::created(state.translator.to_url(id, None)))
    }

    /// Attaches the collection's Mixin to every listed entity.
    #[instrument(skip_all, fields(path = %request.path))]
    async fn put(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let mixin = Self::mixin(state, &request.path)?;
        let user = request.user.as_ref();
        let mut entities = Vec::new();
        for location in request.locations() {
            let mut entity = state.store.get_entity(&state.translator.to_id(location), user).await?;
            entity.add_mixin(CategoryRef::clone(&mixin))?;
            entities.push(entity);
        }
        state.store.save_entities(entities, &[], user).await?;
        Ok(OcciResponse::Ok)
    }

    /// Detaches the collection's Mixin from every listed entity.
    #[instrument(skip_all, fields(path = %request.path))]
    async fn delete(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let mixin = Self::mixin(state, &request.path)?;
        let user = request.user.as_ref();
        let mut entities = Vec::new();
        for location in request.locations() {
            let mut entity = state.store.get_entity(&state.translator.to_id(location), user).await?;
            entity.remove_mixin(&mixin)?;
            entities.push(entity);
        }
        state.store.save_entities(entities, &[], user).await?;
        Ok(OcciResponse::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixture::{self, INFRA};
    use crate::renderer::Payload;
    use occi_core::{AttributeValue, Category};

    fn locations(response: &OcciResponse) -> Vec<String> {
        let OcciResponse::Rendered { payload: Payload::List(objects), .. } = response else {
            panic!("list expected")
        };
        objects.iter().filter_map(|o| o.location.clone()).collect()
    }

    async fn post(state: &ApiState, path: &str, object: DataObject) -> String {
        let response = CollectionHandler.post(state, OcciRequest::new(path).objects(vec![object])).await.unwrap();
        let OcciResponse::Rendered { location: Some(location), .. } = &response else { panic!("location expected") };
        assert_eq!(locations(&response), vec![location.clone()]);
        location.clone()
    }

    fn with_memory(mut object: DataObject, memory: f64) -> DataObject {
        object.attributes.push(("occi.compute.memory".to_owned(), AttributeValue::Float(memory)));
        object
    }

    #[tokio::test]
    async fn kind_locations_supply_the_kind() {
        let state = fixture::state();
        let location = post(&state, "compute/", DataObject::default()).await;
        assert!(location.starts_with("http://localhost:8000/compute/"));

        let err = CollectionHandler
            .post(&state, OcciRequest::new("compute/").objects(vec![fixture::kind(&state, "storage")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = CollectionHandler.post(&state, OcciRequest::new("")).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing entity description");
        let err = CollectionHandler
            .post(&state, OcciRequest::new("").objects(vec![DataObject::default()]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn lists_filter_by_path_and_request() {
        let state = fixture::state();
        let small = post(&state, "compute/", with_memory(DataObject::default(), 1.0)).await;
        let large = post(&state, "", with_memory(fixture::kind(&state, "compute"), 4.0)).await;
        let mut storage = fixture::kind(&state, "storage");
        storage.attributes.push(("occi.storage.size".to_owned(), AttributeValue::Float(10.0)));
        let disk = post(&state, "storage/", storage).await;

        let all = CollectionHandler.get(&state, OcciRequest::new("")).await.unwrap();
        assert_eq!(locations(&all), vec![small.clone(), large.clone(), disk]);

        let computes = CollectionHandler.get(&state, OcciRequest::new("compute/")).await.unwrap();
        assert_eq!(locations(&computes).len(), 2);

        let filter = DataObject {
            attributes: vec![("occi.compute.memory".to_owned(), AttributeValue::from("4.0"))],
            ..DataObject::default()
        };
        let filtered =
            CollectionHandler.get(&state, OcciRequest::new("compute/").objects(vec![filter])).await.unwrap();
        assert_eq!(locations(&filtered), vec![large]);

        let none = CollectionHandler.get(&state, OcciRequest::new("nothing/")).await.unwrap();
        assert!(locations(&none).is_empty());
    }

    #[tokio::test]
    async fn mixin_collections_attach_and_detach() {
        let state = fixture::state();
        let tag = Category::mixin("tag", "http://example.com/tags#").location("tag/").build().unwrap();
        state.registry().register(tag.clone()).unwrap();
        let vm = post(&state, "compute/", DataObject::default()).await;
        let members = vec![DataObject::with_location(vm.clone())];

        CollectionHandler.put(&state, OcciRequest::new("tag/").objects(members.clone())).await.unwrap();
        let tagged = CollectionHandler.get(&state, OcciRequest::new("tag/")).await.unwrap();
        assert_eq!(locations(&tagged), vec![vm.clone()]);

        CollectionHandler.delete(&state, OcciRequest::new("tag/").objects(members.clone())).await.unwrap();
        let tagged = CollectionHandler.get(&state, OcciRequest::new("tag/")).await.unwrap();
        assert!(locations(&tagged).is_empty());

        let err = CollectionHandler.put(&state, OcciRequest::new("compute/").objects(members)).await.unwrap_err();
        assert_eq!(err.to_string(), "\"compute/\": not a Mixin collection");
    }

    #[tokio::test]
    async fn actions_on_kind_collections() {
        let state = fixture::state();
        post(&state, "compute/", DataObject::default()).await;
        post(&state, "compute/", DataObject::default()).await;

        CollectionHandler.post(&state, OcciRequest::new("compute/").action("start")).await.unwrap();
        let compute = state.registry().lookup_id(&format!("{INFRA}compute")).unwrap();
        let active = EntityFilter::category(compute).with_attribute("occi.compute.state", "active");
        assert_eq!(state.store.filter_entities(&active, None).await.unwrap().len(), 2);

        let err = CollectionHandler.post(&state, OcciRequest::new("compute/").action("fly")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}

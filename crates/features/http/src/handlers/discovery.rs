use super::Handler;
use crate::error::ApiError;
use crate::message::{OcciRequest, OcciResponse};
use async_trait::async_trait;
use occi_core::{CategoryRef, DataObject, User};
use occi_kernel::server::state::ApiState;
use tracing::{info, instrument, warn};

/// The query interface: lists categories and manages user-defined Mixins.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscoveryHandler;

impl DiscoveryHandler {
    fn requested(request: &OcciRequest) -> Vec<CategoryRef> {
        request.objects.iter().flat_map(|o| o.categories.iter().cloned()).collect()
    }

    /// Registers `category` as a user Mixin in the store and the registry, or in neither.
    async fn define(state: &ApiState, category: &CategoryRef, user: Option<&User>) -> Result<CategoryRef, ApiError> {
        if !category.is_mixin() {
            return Err(ApiError::bad_request(format!("\"{category}\": only Mixins can be defined")));
        }
        if category.location().is_none() {
            return Err(ApiError::bad_request(format!("\"{category}\": a Mixin needs a location")));
        }
        let mut builder = category.to_builder().user_defined(true);
        if let Some(related) = category.related() {
            builder = builder.related(&state.registry().resolve(related)?);
        }
        let mixin = builder.build()?;
        if state.registry().contains(mixin.id()) {
            return Err(ApiError::bad_request(format!("\"{mixin}\": already registered")));
        }

        state.store.add_user_category(&mixin, user).await?;
        if let Err(err) = state.registry().register_unique(CategoryRef::clone(&mixin)) {
            if let Err(undo) = state.store.remove_user_category(&mixin, user).await {
                warn!(category = %mixin, error = %undo, "Failed to roll back user Mixin");
            }
            return Err(err.into());
        }
        Ok(mixin)
    }

    async fn rollback(state: &ApiState, defined: &[CategoryRef], user: Option<&User>) {
        for mixin in defined.iter().rev() {
            if let Err(err) = state.registry().unregister(mixin) {
                warn!(category = %mixin, error = %err, "Failed to roll back registration");
            }
            if let Err(err) = state.store.remove_user_category(mixin, user).await {
                warn!(category = %mixin, error = %err, "Failed to roll back user Mixin");
            }
        }
    }
}

#[async_trait]
impl Handler for DiscoveryHandler {
    /// Every registered category, or only the ones named in the request.
    #[instrument(skip_all)]
    async fn get(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let requested = Self::requested(&request);
        let categories =
            state.registry().all().into_iter().filter(|c| requested.is_empty() || requested.contains(c)).collect();
        Ok(OcciResponse::single(DataObject::discovery(categories)))
    }

    /// Defines every request category as a user Mixin. Nothing is kept unless all succeed.
    #[instrument(skip_all)]
    async fn post(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let user = request.user.as_ref();
        let mut defined = Vec::new();
        for category in Self::requested(&request) {
            match Self::define(state, &category, user).await {
                Ok(mixin) => defined.push(mixin),
                Err(err) => {
                    Self::rollback(state, &defined, user).await;
                    return Err(err);
                },
            }
        }
        info!(count = defined.len(), "User Mixins defined");
        Ok(OcciResponse::Ok)
    }

    async fn put(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        self.post(state, request).await
    }

    /// Removes user Mixins; built-in and extension categories are protected.
    #[instrument(skip_all)]
    async fn delete(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let user = request.user.as_ref();
        let mut targets = Vec::new();
        for category in Self::requested(&request) {
            let registered = state.registry().resolve(&category)?;
            if !registered.is_mixin() || !registered.is_user_defined() {
                return Err(ApiError::forbidden(format!(
                    "\"{registered}\": only user-defined Mixins can be removed"
                )));
            }
            targets.push(registered);
        }

        for mixin in &targets {
            state.store.remove_user_category(mixin, user).await?;
            if let Err(err) = state.registry().unregister(mixin) {
                if let Err(undo) = state.store.add_user_category(mixin, user).await {
                    warn!(category = %mixin, error = %undo, "Failed to restore user Mixin");
                }
                return Err(err.into());
            }
        }
        info!(count = targets.len(), "User Mixins removed");
        Ok(OcciResponse::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixture;
    use crate::renderer::Payload;
    use occi_backend::MemoryStore;
    use occi_core::{Category, EntityStore, builtin};

    fn tag(term: &str, location: &str) -> CategoryRef {
        Category::mixin(term, "http://example.com/tags#").location(location).build().unwrap()
    }

    fn request(categories: Vec<CategoryRef>) -> OcciRequest {
        OcciRequest::new("-/").objects(vec![DataObject { categories, ..DataObject::default() }])
    }

    #[tokio::test]
    async fn lists_everything_or_the_requested_categories() {
        let state = fixture::state();
        let OcciResponse::Rendered { payload: Payload::Single(all), .. } =
            DiscoveryHandler.get(&state, OcciRequest::new("-/")).await.unwrap()
        else {
            panic!("single object expected")
        };
        assert_eq!(all.categories.len(), state.registry().all().len());

        let OcciResponse::Rendered { payload: Payload::Single(one), .. } =
            DiscoveryHandler.get(&state, request(vec![builtin::link_kind()])).await.unwrap()
        else {
            panic!("single object expected")
        };
        assert_eq!(one.categories, vec![builtin::link_kind()]);
    }

    #[tokio::test]
    async fn defines_and_removes_user_mixins() {
        let store = MemoryStore::default();
        let state = fixture::state_with(store.clone());

        DiscoveryHandler.post(&state, request(vec![tag("blue", "blue/")])).await.unwrap();
        let blue = state.registry().lookup_location("blue/").unwrap();
        assert!(blue.is_user_defined());
        assert_eq!(store.user_categories(), vec![blue.clone()]);

        let err = DiscoveryHandler.post(&state, request(vec![tag("blue", "other/")])).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(store.user_categories().len(), 1);

        DiscoveryHandler.delete(&state, request(vec![tag("blue", "blue/")])).await.unwrap();
        assert!(state.registry().lookup_location("blue/").is_none());
        assert!(store.user_categories().is_empty());
    }

    #[tokio::test]
    async fn failed_definitions_roll_back() {
        let store = MemoryStore::default();
        let state = fixture::state_with(store.clone());
        let before = state.registry().all().len();

        let err = DiscoveryHandler
            .post(&state, request(vec![tag("red", "red/"), tag("green", "compute/")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(state.registry().all().len(), before);
        assert!(store.user_categories().is_empty());

        let err = DiscoveryHandler.post(&state, request(vec![builtin::resource_kind()])).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn concurrent_definition_keeps_the_first() {
        let store = MemoryStore::default();
        let state = fixture::state_with(store.clone());

        // Recorded by a concurrent request that has not registered it yet.
        let first = tag("teal", "teal/").to_builder().user_defined(true).build().unwrap();
        store.add_user_category(&first, None).await.unwrap();

        let err = DiscoveryHandler.post(&state, request(vec![tag("teal", "teal/")])).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(store.user_categories(), vec![first.clone()]);

        state.registry().register_unique(CategoryRef::clone(&first)).unwrap();
        assert_eq!(state.registry().lookup_location("teal/"), Some(first));
    }

    #[tokio::test]
    async fn only_user_mixins_can_be_removed() {
        let state = fixture::state();
        let err = DiscoveryHandler.delete(&state, request(vec![builtin::resource_kind()])).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let ipnetwork = state.registry().lookup_location("ipnetwork/").unwrap();
        let err = DiscoveryHandler.delete(&state, request(vec![ipnetwork])).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = DiscoveryHandler.delete(&state, request(vec![tag("none", "none/")])).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}

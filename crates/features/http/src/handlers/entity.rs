use super::{Handler, bind_action, link_targets};
use crate::error::ApiError;
use crate::message::{OcciRequest, OcciResponse};
use async_trait::async_trait;
use occi_core::{DataObject, ImportOptions, StoreError};
use occi_kernel::server::state::ApiState;
use tracing::{debug, instrument};

/// Single entity paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityHandler;

#[async_trait]
impl Handler for EntityHandler {
    #[instrument(skip_all, fields(path = %request.path))]
    async fn get(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let user = request.user.as_ref();
        let entity = state.store.get_entity(&request.path, user).await?;
        let targets = link_targets(state, &entity, user).await;
        Ok(OcciResponse::single(DataObject::load_from_entity(&entity, &state.translator, &targets)))
    }

    /// Triggers the action named by the `action` query.
    #[instrument(skip_all, fields(path = %request.path, action = ?request.action))]
    async fn post(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let term =
            request.action.as_deref().ok_or_else(|| ApiError::bad_request("Missing action query parameter"))?;
        let user = request.user.as_ref();
        let entity = state.store.get_entity(&request.path, user).await?;

        let action = bind_action(entity.available_actions(), term, request.objects.first(), state.registry())?;
        if !entity.is_applicable_action(action.category()) {
            return Err(ApiError::bad_request(format!("{term}: action not applicable")));
        }
        state.store.exec_action(entity, &action, user).await?;
        debug!(action = %action.category(), "Action executed");
        Ok(OcciResponse::Ok)
    }

    /// Updates the entity, or creates it at this path when the request names a Kind.
    #[instrument(skip_all, fields(path = %request.path))]
    async fn put(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        let user = request.user.as_ref();
        let object = request.objects.first().cloned().unwrap_or_default();
        let registry = Some(state.registry());

        let entity = match state.store.get_entity(&request.path, user).await {
            Ok(existing) => {
                object.save_to_entity(Some(existing), registry, &state.translator, ImportOptions::default())?
            },
            Err(StoreError::NotFound { .. }) if object.categories.iter().any(|c| c.is_kind()) => {
                let mut entity = object.save_to_entity(None, registry, &state.translator, ImportOptions::default())?;
                entity.set_id(request.path.as_str());
                debug!("Creating entity at requested path");
                entity
            },
            Err(err) => return Err(err.into()),
        };
        state.store.save_entities(vec![entity], &[], user).await?;
        Ok(OcciResponse::Ok)
    }

    #[instrument(skip_all, fields(path = %request.path))]
    async fn delete(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError> {
        state.store.save_entities(Vec::new(), std::slice::from_ref(&request.path), request.user.as_ref()).await?;
        Ok(OcciResponse::Ok)
    }
}

//! Request handlers for the three kinds of OCCI paths.

mod collection;
mod discovery;
mod entity;

pub use collection::CollectionHandler;
pub use discovery::DiscoveryHandler;
pub use entity::EntityHandler;

use crate::error::ApiError;
use crate::message::{OcciRequest, OcciResponse};
use async_trait::async_trait;
use occi_core::{ActionInstance, CategoryRef, CategoryRegistry, DataObject, Entity, User};
use occi_kernel::server::state::ApiState;
use std::fmt::Debug;

#[async_trait]
pub trait Handler: Debug + Send + Sync {
    async fn get(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError>;
    async fn post(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError>;
    async fn put(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError>;
    async fn delete(&self, state: &ApiState, request: OcciRequest) -> Result<OcciResponse, ApiError>;
}

/// Builds the action named `term` out of `actions`.
///
/// A request category, when present, must name that same action; its
/// attributes become the parameters.
pub(crate) fn bind_action(
    actions: &[CategoryRef],
    term: &str,
    object: Option<&DataObject>,
    registry: &CategoryRegistry,
) -> Result<ActionInstance, ApiError> {
    let category = actions
        .iter()
        .find(|a| a.term() == term)
        .ok_or_else(|| ApiError::bad_request(format!("{term}: action not applicable")))?;

    match object.filter(|o| !o.categories.is_empty()) {
        Some(object) => {
            let action = object.save_as_action(Some(registry))?;
            if action.category() != category {
                return Err(ApiError::bad_request(format!(
                    "\"{}\": does not match action \"{term}\"",
                    action.category()
                )));
            }
            Ok(action)
        },
        None => {
            let mut action = ActionInstance::new(CategoryRef::clone(category));
            let parameters = object.map(|o| o.attributes.clone()).unwrap_or_default();
            action.bind_parameters(parameters)?;
            Ok(action)
        },
    }
}

/// Entities the links of `entity` point to, for rendering link targets.
pub(crate) async fn link_targets(state: &ApiState, entity: &Entity, user: Option<&User>) -> Vec<Entity> {
    let mut targets = Vec::new();
    for target in entity.links().iter().filter_map(Entity::target) {
        if let Ok(found) = state.store.get_entity(target, user).await {
            targets.push(found);
        }
    }
    targets
}

//! Requests and responses as the handlers see them.

use crate::renderer::Payload;
use occi_core::{DataObject, User};

/// A decoded request: routed path, action query, parsed content and caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcciRequest {
    /// Path relative to the base path, without a leading slash.
    pub path: String,
    /// Value of the `action` query parameter.
    pub action: Option<String>,
    pub objects: Vec<DataObject>,
    pub user: Option<User>,
}

impl OcciRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    #[must_use]
    pub fn action(mut self, term: impl Into<String>) -> Self {
        self.action = Some(term.into());
        self
    }

    #[must_use]
    pub fn objects(mut self, objects: Vec<DataObject>) -> Self {
        self.objects = objects;
        self
    }

    #[must_use]
    pub fn user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    /// Locations listed in the request, e.g. a `text/uri-list` body.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().filter_map(|o| o.location.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OcciResponse {
    /// Plain `OK`.
    Ok,
    Rendered { payload: Payload, location: Option<String> },
}

impl OcciResponse {
    #[must_use]
    pub const fn single(object: DataObject) -> Self {
        Self::Rendered { payload: Payload::Single(object), location: None }
    }

    #[must_use]
    pub const fn list(objects: Vec<DataObject>) -> Self {
        Self::Rendered { payload: Payload::List(objects), location: None }
    }

    /// A new entity's location, sent both as `Location` and as a one-item list.
    #[must_use]
    pub fn created(location: String) -> Self {
        Self::Rendered {
            payload: Payload::List(vec![DataObject::with_location(location.clone())]),
            location: Some(location),
        }
    }
}

//! Error types of the core model.
//!
//! Each family lives in its own module; all of them carry an HTTP status
//! through `status_code()`.

mod action;
mod attribute;
mod category;
mod dataobject;
mod entity;
mod store;

pub use action::{ActionError, ActionErrorExt};
pub use attribute::{AttributeError, AttributeErrorExt};
pub use category::{CategoryError, CategoryErrorExt};
pub use dataobject::{DataObjectError, DataObjectErrorExt};
pub use entity::{EntityError, EntityErrorExt};
pub use store::{StoreError, StoreErrorExt};

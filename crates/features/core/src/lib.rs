//! # OCCI core model
//!
//! The typed resource model every other crate builds on.
//!
//! * [`category`]: Kinds, Mixins and Actions, identified by `scheme + term`.
//! * [`registry`]: the shared set of known categories, their locations and
//!   per-Kind [`EntityBehavior`]s.
//! * [`entity`]: Resources and Links with validated attribute import.
//! * [`dataobject`]: the format-neutral object codecs read and write.
//! * [`store`]: the persistence contract served over HTTP.
//!
//! ```rust
//! use occi_core::{Attribute, Category, CategoryRegistry, builtin};
//!
//! let registry = CategoryRegistry::new();
//! let vm = Category::kind("vm", "http://example.com/occi#")
//!     .related(&builtin::resource_kind())
//!     .attribute(Attribute::int("cores").required())
//!     .location("vm/")
//!     .build()
//!     .unwrap();
//! registry.register(vm).unwrap();
//!
//! let kind = registry.lookup_location("/vm/").unwrap();
//! let mut entity = registry.instantiate(&kind).unwrap();
//! entity.import_attributes([("cores", "2")], true).unwrap();
//! assert_eq!(entity.attribute("cores").map(ToString::to_string).as_deref(), Some("2"));
//! ```

pub mod action;
pub mod attribute;
pub mod builtin;
pub mod category;
pub mod dataobject;
pub mod entity;
pub mod error;
pub mod registry;
pub mod store;
pub mod translator;

pub use crate::action::ActionInstance;
pub use crate::attribute::{Attribute, AttributeType, AttributeValue};
pub use crate::category::{Category, CategoryBuilder, CategoryClass, CategoryRef, EntityType, split_id};
pub use crate::dataobject::{ActionRepr, DataObject, ImportOptions, LinkRepr, RenderFlags};
pub use crate::entity::Entity;
pub use crate::error::{
    ActionError, AttributeError, CategoryError, DataObjectError, EntityError, StoreError, StoreErrorExt,
};
pub use crate::registry::{CategoryRegistry, DefaultBehavior, EntityBehavior};
pub use crate::store::{EntityFilter, EntityStore, User};
pub use crate::translator::UrlTranslator;

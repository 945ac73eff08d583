//! Built-in categories of the OCCI core model.

use crate::attribute::Attribute;
use crate::category::{Category, CategoryRef, EntityType};
use occi_domain::constants::CORE_SCHEME;
use std::sync::{Arc, LazyLock};

pub const ENTITY_TERM: &str = "entity";
pub const RESOURCE_TERM: &str = "resource";
pub const LINK_TERM: &str = "link";
pub const ACTION_TERM: &str = "action";

pub const TITLE: &str = "title";
pub const SUMMARY: &str = "summary";
pub const SOURCE: &str = "source";
pub const TARGET: &str = "target";

static ENTITY_KIND: LazyLock<CategoryRef> = LazyLock::new(|| {
    Category::kind(ENTITY_TERM, CORE_SCHEME)
        .title("Entity type")
        .attribute(Attribute::string(TITLE))
        .entity_type(EntityType::Entity)
        .build_unchecked()
});

static RESOURCE_KIND: LazyLock<CategoryRef> = LazyLock::new(|| {
    Category::kind(RESOURCE_TERM, CORE_SCHEME)
        .title("Resource type")
        .related(&ENTITY_KIND)
        .attribute(Attribute::string(SUMMARY))
        .entity_type(EntityType::Resource)
        .build_unchecked()
});

static LINK_KIND: LazyLock<CategoryRef> = LazyLock::new(|| {
    Category::kind(LINK_TERM, CORE_SCHEME)
        .title("Link type")
        .related(&ENTITY_KIND)
        .attribute(Attribute::string(SOURCE).required().immutable())
        .attribute(Attribute::string(TARGET).required())
        .entity_type(EntityType::Link)
        .build_unchecked()
});

static ACTION_CATEGORY: LazyLock<CategoryRef> = LazyLock::new(|| {
    Category::action(ACTION_TERM, CORE_SCHEME).title("Action").build_unchecked()
});

#[must_use]
pub fn entity_kind() -> CategoryRef {
    Arc::clone(&ENTITY_KIND)
}

#[must_use]
pub fn resource_kind() -> CategoryRef {
    Arc::clone(&RESOURCE_KIND)
}

#[must_use]
pub fn link_kind() -> CategoryRef {
    Arc::clone(&LINK_KIND)
}

#[must_use]
pub fn action_category() -> CategoryRef {
    Arc::clone(&ACTION_CATEGORY)
}

/// The categories every registry starts with.
#[must_use]
pub fn all() -> [CategoryRef; 4] {
    [entity_kind(), resource_kind(), link_kind(), action_category()]
}

//! Protocol identifiers and wire names.

/// OCCI protocol version advertised in the `Server` header.
pub const OCCI_VERSION: &str = "1.1";

pub const CORE_SCHEME: &str = "http://schemas.ogf.org/occi/core#";
pub const INFRASTRUCTURE_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure#";

/// Default discovery path, relative to the base path.
pub const DISCOVERY_PATH: &str = "-/";
pub const WELL_KNOWN_DISCOVERY_PATH: &str = ".well-known/org/ogf/occi/-/";

/// Query parameter naming the action to trigger.
pub const ACTION_QUERY: &str = "action";

pub mod media {
    pub const TEXT_OCCI: &str = "text/occi";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const TEXT_URI_LIST: &str = "text/uri-list";
    pub const OCCI_JSON: &str = "application/occi+json";
    pub const JSON: &str = "application/json";
    pub const ANY: &str = "*/*";
    pub const TEXT_ANY: &str = "text/*";
    /// Content type of plain `OK` and error responses.
    pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
}

pub mod headers {
    pub const CATEGORY: &str = "Category";
    pub const LINK: &str = "Link";
    pub const ATTRIBUTE: &str = "X-OCCI-Attribute";
    pub const LOCATION: &str = "X-OCCI-Location";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ACCEPT: &str = "Accept";
}

pub use crate::config::{ConfigError, load_config};
pub use crate::safe_nanoid;
pub use crate::security::path::{PathGuard, PathGuardError};
#[cfg(feature = "server")]
pub use crate::server::state::{ApiState, ApiStateBuilder, ApiStateError};
pub use occi_domain::config::ApiConfig;

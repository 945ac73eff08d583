//! Facade crate for the OCCI server.
//! Re-exports the model, the Infrastructure extension, the in-memory backend
//! and (with `server`) the HTTP layer, and wires them into an [`ApiState`].
//! Keep this crate thin: it should compose other crates, not implement protocol logic.
//!
//! ## Usage
//! - Add `occi` with the `server` feature.
//! - Call [`init`] with the loaded configuration and hand the state to [`http::router`].

pub use occi_backend as backend;
pub use occi_core as core;
pub use occi_domain as domain;
#[cfg(feature = "server")]
pub use occi_http as http;
pub use occi_infrastructure as infrastructure;
pub use occi_kernel as kernel;

#[cfg(feature = "server")]
pub use bootstrap::{BootstrapError, BootstrapErrorExt, init};

#[cfg(feature = "server")]
mod bootstrap {
    use occi_backend::MemoryStore;
    use occi_core::EntityStore;
    use occi_domain::config::ApiConfig;
    use occi_infrastructure::{Infrastructure, InfrastructureError};
    use occi_kernel::server::state::{ApiState, ApiStateError};
    use std::borrow::Cow;
    use std::sync::Arc;
    use tracing::info;

    #[occi_derive::occi_error]
    pub enum BootstrapError {
        #[error("Infrastructure extension{}: {source}", format_context(.context))]
        Infrastructure { source: InfrastructureError, context: Option<Cow<'static, str>> },

        #[error("Application state{}: {source}", format_context(.context))]
        State { source: ApiStateError, context: Option<Cow<'static, str>> },
    }

    /// Builds the serving state: an in-memory store accepting the configured
    /// users, with the Infrastructure categories registered.
    ///
    /// # Errors
    /// Returns an error if the Infrastructure categories cannot be registered
    /// or the state is incomplete.
    pub fn init(config: &ApiConfig) -> Result<ApiState, BootstrapError> {
        let store = MemoryStore::builder().users(config.occi.users.iter().cloned()).build();

        Infrastructure::new()
            .and_then(|infrastructure| infrastructure.register(store.registry()))
            .context("Failed to register categories")?;

        let categories = store.registry().all().len();
        let state = ApiState::builder().config(config.clone()).store(Arc::new(store)).build()?;

        info!(base_url = %state.translator.base_url(), categories, "OCCI state initialized");
        Ok(state)
    }
}

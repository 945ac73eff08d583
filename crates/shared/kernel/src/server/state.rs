use axum::extract::FromRef;
use occi_core::{CategoryRegistry, EntityStore, UrlTranslator};
use occi_domain::config::ApiConfig;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[occi_derive::occi_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub store: Arc<dyn EntityStore>,
    pub translator: UrlTranslator,
}

/// Shared request state: configuration, the entity store and URL translation.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn registry(&self) -> &CategoryRegistry {
        self.inner.store.registry()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Arc<dyn EntityStore> {
    fn from_ref(state: &ApiState) -> Self {
        Arc::clone(&state.inner.store)
    }
}

impl FromRef<ApiState> for UrlTranslator {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.translator.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn EntityStore>>,
    translator: Option<UrlTranslator>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the translator derived from `occi.base_url`.
    #[must_use]
    pub fn translator(mut self, translator: UrlTranslator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// # Errors
    /// Returns an error when the config or the store is missing.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let store = self.store.ok_or_else(|| ApiStateError::Validation {
            message: "EntityStore not provided".into(),
            context: None,
        })?;
        let translator = self.translator.unwrap_or_else(|| UrlTranslator::new(&config.occi.base_url));

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, store, translator }) })
    }
}

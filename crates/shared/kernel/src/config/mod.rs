use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for overrides, e.g. `OCCI__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "OCCI";

#[occi_derive::occi_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered under environment overrides.
///
/// 1. **Base file**: `path` (any format the `config` crate recognizes by
///    extension; the extension may be omitted). Defaults to `server` in the
///    working directory. A missing file is not an error, every field has a default.
/// 2. **Environment**: variables prefixed with `OCCI__`, nested with `__`
///    (`OCCI__OCCI__BASE_URL` maps to `occi.base_url`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is malformed or a value
/// does not fit `T`.
///
/// # Example
/// ```rust
/// use occi_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

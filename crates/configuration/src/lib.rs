use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ApiConfig, DatabaseSettings, LoggingSettings, Settings, ValuationSettings};

/// Prefix for environment overrides, e.g. `PORTFOLIO__VALUATION__MAX_RETRIES=0`.
const ENV_PREFIX: &str = "PORTFOLIO";

/// Command-line access to the configuration file location.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: std::path::PathBuf,
}

/// Loads the application configuration from a TOML file plus the environment.
///
/// A missing file is not an error: every setting has a default. Environment
/// variables with the `PORTFOLIO__` prefix override the file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    finish(builder)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;
    tracing::debug!(?settings.valuation, "Configuration loaded");
    Ok(settings)
}

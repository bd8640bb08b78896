//! Configuration for tapkit agents.
//!
//! [`TapkitConfig`] is assembled by [`ConfigLoader`] from defaults, `tapkit.toml`,
//! `TAPKIT_*` environment variables and programmatic overrides, then checked
//! by [`validate_config`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file, load_env_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ResolverConfig, SpanEventConfig,
    TapkitConfig, UsdcConfig,
};
pub use validation::validate_config;

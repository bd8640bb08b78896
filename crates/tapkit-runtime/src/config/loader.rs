//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. `WEB3_BIO_API_KEY` / `NETWORK_ID` fallbacks
//! 3. Profile-specific config file (`tapkit.{profile}.toml`)
//! 4. Main config file (`tapkit.toml`, then `config.toml`)
//! 5. Environment variables (`TAPKIT_*`)
//! 6. Programmatic overrides ([`ConfigLoader::merge`])
//!
//! Before any of that, a `.env` file in the working directory (or two levels
//! up, for binaries started from a crate directory) is loaded into the process
//! environment. Variables already set are left alone.
//!
//! # Environment Variable Mapping
//!
//! `TAPKIT_` prefix with `__` as the section separator:
//!
//! - `TAPKIT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `TAPKIT_RESOLVER__API_KEY=xxx` → `resolver.api_key = "xxx"`
//! - `TAPKIT_USDC__NETWORK_ID=base-mainnet` → `usdc.network_id = "base-mainnet"`
//!
//! # Example
//!
//! ```rust,ignore
//! use tapkit_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/tapkit.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Serialized};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::{Figment, Provider};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TapkitConfig;
use super::validation::validate_config;

/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "TAPKIT_PROFILE";

/// Where a `.env` file is looked for, relative to the working directory.
const ENV_FILE_CANDIDATES: [&str; 2] = [".env", "../../.env"];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `TAPKIT_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads a `.env` file from `dir` or two levels above it.
///
/// Returns the path that was loaded, if any.
pub fn load_env_file(dir: &Path) -> ConfigResult<Option<PathBuf>> {
    let Some(path) = ENV_FILE_CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.is_file())
    else {
        trace!(dir = %dir.display(), "No .env file found");
        return Ok(None);
    };

    dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "Loaded environment file");
    Ok(Some(path))
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    load_env_file: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            load_env_file: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds `<config dir>/tapkit` (e.g. `~/.config/tapkit`) to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(config_dir) => self.search_path(config_dir.join("tapkit")),
            None => self,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables `TAPKIT_*` variables and the plain-name fallbacks.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Skips loading a `.env` file.
    pub fn without_env_file(mut self) -> Self {
        self.load_env_file = false;
        self
    }

    /// Merges an override provider on top of every other source.
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(Serialized::default("logging.level", "debug"))
    ///     .load()?;
    /// ```
    pub fn merge(mut self, provider: impl Provider) -> Self {
        self.overrides = self.overrides.merge(provider);
        self
    }

    pub fn profile_name(&self) -> &Profile {
        &self.profile
    }

    /// Loads, extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<TapkitConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: TapkitConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            network = %config.usdc.network_id,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        if self.load_env_file
            && let Ok(cwd) = std::env::current_dir()
        {
            load_env_file(&cwd)?;
        }

        let mut figment = Figment::from(Serialized::defaults(TapkitConfig::default()));

        if self.load_env {
            figment = Self::merge_fallbacks(figment);
        }

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with TAPKIT_ prefix");
            figment = figment.merge(Env::prefixed("TAPKIT_").split("__"));
        }

        let overrides = std::mem::take(&mut self.overrides);
        Ok(figment.merge(overrides))
    }

    /// Plain variable names used by existing deployments.
    fn merge_fallbacks(mut figment: Figment) -> Figment {
        let fallbacks = [
            ("WEB3_BIO_API_KEY", "resolver.api_key"),
            ("NETWORK_ID", "usdc.network_id"),
        ];
        for (var, key) in fallbacks {
            if let Ok(value) = std::env::var(var)
                && !value.is_empty()
            {
                trace!(var, key, "Using fallback environment variable");
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        figment
    }

    /// Merges a single config file, dispatching on its extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tapkit"));
        }
        paths
    }

    /// Tries `search_paths × base_names`; a profile-specific variant is
    /// merged before its base file. Stops at the first base file found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return (merge_fn(figment, &base_path), true);
                }
            }
        }
        (figment, false)
    }

    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["tapkit.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["tapkit.yaml", "tapkit.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<TapkitConfig> {
    ConfigLoader::new().load()
}

/// Loads the configuration from `path` plus environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<TapkitConfig> {
    ConfigLoader::new().file(path).load()
}

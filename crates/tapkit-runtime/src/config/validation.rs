//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, ResolverConfig, TapkitConfig, UsdcConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &TapkitConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_resolver_config(&config.resolver)?;
    validate_usdc_config(&config.usdc)?;
    if let Some(app) = &config.app
        && app.menus.is_empty()
    {
        return Err(ConfigError::validation(format!(
            "App '{}' declares no menus",
            app.name
        )));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Empty module name in log filters: {module:?}"
        )));
    }

    Ok(())
}

fn validate_resolver_config(resolver: &ResolverConfig) -> ConfigResult<()> {
    validate_url(&resolver.base_url)?;

    if resolver.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    Ok(())
}

fn validate_usdc_config(usdc: &UsdcConfig) -> ConfigResult<()> {
    if tapkit_usdc::find_network(&usdc.network_id).is_none() {
        return Err(ConfigError::UnknownNetwork(usdc.network_id.clone()));
    }

    if let Some(url) = &usdc.rpc_url {
        validate_url(url)?;
    }

    Ok(())
}

/// Validates an HTTP(S) URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::invalid_url(url, "URL is empty"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&TapkitConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_unknown_network() {
        let mut config = TapkitConfig::default();
        config.usdc.network_id = "polygon".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::UnknownNetwork(id)) if id == "polygon"
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = TapkitConfig::default();
        config.resolver.timeout_ms = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_urls() {
        let mut config = TapkitConfig::default();
        config.resolver.base_url = "ftp://api.web3.bio".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let mut config = TapkitConfig::default();
        config.usdc.rpc_url = Some(String::new());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = TapkitConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some(PathBuf::from("logs/tapkit.log"));
        assert!(validate_config(&config).is_ok());
    }
}

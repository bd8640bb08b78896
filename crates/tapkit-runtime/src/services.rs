//! Services built from configuration.

use reqwest::Client;
use tracing::debug;

use crate::config::TapkitConfig;
use crate::error::RuntimeResult;
use tapkit_resolver::{IdentifierResolver, Web3BioClient};
use tapkit_usdc::UsdcHandler;

/// The lookup and payment clients an agent's handlers use.
///
/// All of them share one HTTP client with the resolver's timeout.
#[derive(Debug, Clone)]
pub struct AgentServices {
    pub profiles: Web3BioClient,
    pub resolver: IdentifierResolver,
    pub usdc: UsdcHandler,
}

impl AgentServices {
    pub fn from_config(config: &TapkitConfig) -> RuntimeResult<Self> {
        let client = Client::builder()
            .timeout(config.resolver.timeout())
            .build()?;

        let profiles = Web3BioClient::new(config.resolver.api_key.clone())
            .with_base_url(config.resolver.base_url.clone())
            .with_client(client.clone());

        let mut usdc = UsdcHandler::new(&config.usdc.network_id)?.with_client(client);
        if let Some(rpc_url) = &config.usdc.rpc_url {
            usdc = usdc.with_rpc_url(rpc_url.clone());
        }

        debug!(
            base_url = %profiles.base_url(),
            network = usdc.network().network_id,
            "Agent services ready"
        );

        Ok(Self {
            resolver: IdentifierResolver::new(profiles.clone()),
            profiles,
            usdc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;

    #[test]
    fn test_from_default_config() {
        let services = AgentServices::from_config(&TapkitConfig::default()).unwrap();
        assert_eq!(services.profiles.base_url(), "https://api.web3.bio");
        assert_eq!(services.usdc.network().chain_id, 84532);
    }

    #[test]
    fn test_unknown_network() {
        let mut config = TapkitConfig::default();
        config.usdc.network_id = "polygon".into();
        assert!(matches!(
            AgentServices::from_config(&config),
            Err(RuntimeError::Usdc(_))
        ));
    }
}

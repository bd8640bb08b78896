//! Supported networks.

/// Where USDC lives on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network_id: &'static str,
    pub network_name: &'static str,
    pub chain_id: u64,
    pub token_address: &'static str,
    pub decimals: u8,
    /// Public JSON-RPC endpoint used when none is configured.
    pub default_rpc_url: &'static str,
}

impl NetworkConfig {
    /// The chain id as a `0x`-prefixed hex string, as wallets expect it.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

pub const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    network_id: "base-sepolia",
    network_name: "Base Sepolia",
    chain_id: 84532,
    token_address: "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
    decimals: 6,
    default_rpc_url: "https://sepolia.base.org",
};

pub const BASE_MAINNET: NetworkConfig = NetworkConfig {
    network_id: "base-mainnet",
    network_name: "Base Mainnet",
    chain_id: 8453,
    token_address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
    decimals: 6,
    default_rpc_url: "https://mainnet.base.org",
};

pub static USDC_NETWORKS: [NetworkConfig; 2] = [BASE_SEPOLIA, BASE_MAINNET];

pub fn find_network(network_id: &str) -> Option<&'static NetworkConfig> {
    USDC_NETWORKS.iter().find(|n| n.network_id == network_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_network() {
        assert_eq!(find_network("base-sepolia").unwrap().chain_id_hex(), "0x14a34");
        assert_eq!(find_network("base-mainnet").unwrap().chain_id_hex(), "0x2105");
        assert!(find_network("ethereum").is_none());
    }
}

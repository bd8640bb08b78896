//! USDC transfers and balances.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{UsdcError, UsdcResult};
use crate::network::{NetworkConfig, find_network};
use crate::units::format_units;
use tapkit_core::{WalletCall, WalletSendCalls};

/// `transfer(address,uint256)`
const TRANSFER_SELECTOR: &str = "a9059cbb";
/// `balanceOf(address)`
const BALANCE_OF_SELECTOR: &str = "70a08231";

#[derive(Debug, Clone)]
pub struct UsdcHandler {
    network: &'static NetworkConfig,
    rpc_url: String,
    client: Client,
}

impl UsdcHandler {
    /// Creates a handler for `"base-sepolia"` or `"base-mainnet"`.
    pub fn new(network_id: &str) -> UsdcResult<Self> {
        let network =
            find_network(network_id).ok_or_else(|| UsdcError::UnknownNetwork(network_id.into()))?;
        Ok(Self {
            network,
            rpc_url: network.default_rpc_url.to_string(),
            client: Client::new(),
        })
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn network(&self) -> &'static NetworkConfig {
        self.network
    }

    /// Builds the wallet call bundle transferring `amount` base units.
    pub fn create_transfer_calls(
        &self,
        from: &str,
        recipient: &str,
        amount: u128,
    ) -> UsdcResult<WalletSendCalls> {
        let data = format!(
            "0x{TRANSFER_SELECTOR}{}{amount:064x}",
            encode_address(recipient)?
        );

        let decimals = self.network.decimals;
        let mut metadata = Map::new();
        metadata.insert(
            "description".into(),
            Value::String(format!(
                "Transfer {} USDC on {}",
                format_units(amount, decimals),
                self.network.network_name
            )),
        );
        metadata.insert("transactionType".into(), "transfer".into());
        metadata.insert("currency".into(), "USDC".into());
        metadata.insert("amount".into(), amount.to_string().into());
        metadata.insert("decimals".into(), decimals.to_string().into());
        metadata.insert("networkId".into(), self.network.network_id.into());

        Ok(WalletSendCalls {
            version: "1.0".into(),
            from: from.to_string(),
            chain_id: self.network.chain_id_hex(),
            calls: vec![WalletCall {
                to: self.network.token_address.to_string(),
                data,
                metadata: Some(metadata),
            }],
        })
    }

    /// Reads the USDC balance of `address`, formatted with token decimals.
    pub async fn get_balance(&self, address: &str) -> UsdcResult<String> {
        let data = format!("0x{BALANCE_OF_SELECTOR}{}", encode_address(address)?);
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": self.network.token_address, "data": data }, "latest"],
        });

        debug!(network = self.network.network_id, %address, "Querying USDC balance");
        let response: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(UsdcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| UsdcError::Decode("missing result".into()))?;

        Ok(format_units(decode_uint(&result)?, self.network.decimals))
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Left-pads a `0x` address to a 32-byte ABI word (without `0x`).
fn encode_address(address: &str) -> UsdcResult<String> {
    let hex = address
        .strip_prefix("0x")
        .filter(|h| h.len() == 40 && h.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| UsdcError::InvalidAddress(address.to_string()))?;
    Ok(format!("{hex:0>64}"))
}

/// Decodes a `0x`-prefixed uint256 that must fit in 128 bits.
fn decode_uint(hex: &str) -> UsdcResult<u128> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex).trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 32 {
        return Err(UsdcError::Decode(format!("value out of range: {hex}")));
    }
    u128::from_str_radix(digits, 16).map_err(|e| UsdcError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FROM: &str = "0x1111111111111111111111111111111111111111";
    const TO: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_unknown_network() {
        assert!(matches!(
            UsdcHandler::new("polygon"),
            Err(UsdcError::UnknownNetwork(id)) if id == "polygon"
        ));
    }

    #[test]
    fn test_transfer_calls() {
        let handler = UsdcHandler::new("base-sepolia").unwrap();
        let calls = handler.create_transfer_calls(FROM, TO, 1_500_000).unwrap();

        assert_eq!(calls.version, "1.0");
        assert_eq!(calls.from, FROM);
        assert_eq!(calls.chain_id, "0x14a34");
        assert_eq!(calls.calls.len(), 1);

        let call = &calls.calls[0];
        assert_eq!(call.to, "0x036CbD53842c5426634e7929541eC2318f3dCF7e");
        assert_eq!(
            call.data,
            format!(
                "0xa9059cbb{}{}{}",
                "0".repeat(24),
                &TO[2..],
                format!("{:0>64}", "16e360")
            )
        );
        assert_eq!(call.data.len(), 2 + 8 + 64 + 64);

        let metadata = call.metadata.as_ref().unwrap();
        assert_eq!(metadata["description"], "Transfer 1.5 USDC on Base Sepolia");
        assert_eq!(metadata["amount"], "1500000");
        assert_eq!(metadata["decimals"], "6");
        assert_eq!(metadata["networkId"], "base-sepolia");
    }

    #[test]
    fn test_transfer_rejects_bad_recipient() {
        let handler = UsdcHandler::new("base-mainnet").unwrap();
        assert!(matches!(
            handler.create_transfer_calls(FROM, "alice.eth", 1),
            Err(UsdcError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_decode_uint() {
        assert_eq!(decode_uint("0x").unwrap(), 0);
        assert_eq!(decode_uint(&format!("0x{:0>64}", "f4240")).unwrap(), 1_000_000);
        assert!(decode_uint(&format!("0x{}", "f".repeat(64))).is_err());
    }

    #[tokio::test]
    async fn test_get_balance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_call" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": format!("0x{:0>64}", "2625a0"),
            })))
            .mount(&server)
            .await;

        let handler = UsdcHandler::new("base-sepolia")
            .unwrap()
            .with_rpc_url(server.uri());
        assert_eq!(handler.get_balance(FROM).await.unwrap(), "2.5");
    }

    #[tokio::test]
    async fn test_get_balance_rpc_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "execution reverted" },
            })))
            .mount(&server)
            .await;

        let handler = UsdcHandler::new("base-sepolia")
            .unwrap()
            .with_rpc_url(server.uri());
        assert!(matches!(
            handler.get_balance(FROM).await,
            Err(UsdcError::Rpc { code: -32000, .. })
        ));
    }
}

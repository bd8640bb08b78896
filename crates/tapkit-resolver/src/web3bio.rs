//! web3.bio profile lookup.
//!
//! `GET {base_url}/profile/{name}` returns one entry per platform the name is
//! known on (ENS, Farcaster, Basenames, ...). With an API key the request
//! carries `X-API-KEY: Bearer <key>`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error};

use crate::error::{ResolveError, ResolveResult};
use crate::resolve::NameResolver;

/// Public web3.bio API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.web3.bio";

/// Social graph counters attached to a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default)]
    pub follower: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
}

/// One platform entry of a web3.bio profile response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Web3BioProfile {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platform: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub social: Option<Social>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The Farcaster entry of a profile, or all-empty when there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterProfile {
    pub address: Option<String>,
    pub display_name: Option<String>,
    pub platform: String,
    pub username: Option<String>,
    pub fid: Option<String>,
    pub social: Option<Social>,
}

impl FarcasterProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<Web3BioProfile> for FarcasterProfile {
    fn from(profile: Web3BioProfile) -> Self {
        Self {
            fid: profile
                .social
                .as_ref()
                .and_then(|s| s.uid)
                .map(|uid| uid.to_string()),
            username: profile.display_name.clone(),
            address: profile.address,
            display_name: profile.display_name,
            platform: profile.platform,
            social: profile.social,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Web3BioClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for Web3BioClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Web3BioClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn profile_url(&self, name: &str) -> ResolveResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ResolveError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("profile")
            .push(name);
        Ok(url)
    }

    /// Fetches every platform entry for `name`.
    ///
    /// A 404 means the name is unknown and yields an empty list.
    pub async fn fetch_profiles(&self, name: &str) -> ResolveResult<Vec<Web3BioProfile>> {
        let url = self.profile_url(name)?;
        debug!(%url, "Fetching web3.bio profile");

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ResolveError::Status {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let profiles: Option<Vec<Web3BioProfile>> = serde_json::from_slice(&body)?;
        Ok(profiles.unwrap_or_default())
    }

    /// Returns the Farcaster entry for `name`.
    ///
    /// Never fails: any error is logged and yields the empty profile.
    pub async fn fetch_farcaster_profile(&self, name: &str) -> FarcasterProfile {
        match self.fetch_profiles(name).await {
            Ok(profiles) => profiles
                .into_iter()
                .find(|p| p.platform == "farcaster")
                .map(FarcasterProfile::from)
                .unwrap_or_default(),
            Err(e) => {
                error!(name = %name, error = %e, "Failed to fetch Farcaster profile");
                FarcasterProfile::default()
            }
        }
    }
}

#[async_trait]
impl NameResolver for Web3BioClient {
    async fn resolve(&self, name: &str) -> ResolveResult<Option<String>> {
        let profiles = self.fetch_profiles(name).await?;
        Ok(profiles
            .into_iter()
            .filter_map(|p| p.address)
            .find(|address| !address.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profiles() -> serde_json::Value {
        json!([
            {
                "address": "0x1111111111111111111111111111111111111111",
                "identity": "alice.eth",
                "platform": "ens",
                "displayName": "alice.eth"
            },
            {
                "address": "0x2222222222222222222222222222222222222222",
                "identity": "alice",
                "platform": "farcaster",
                "displayName": "Alice",
                "social": { "uid": 4242, "follower": 10, "following": 3 }
            }
        ])
    }

    async fn server_with(route: &str, response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_resolve_returns_first_address() {
        let server = server_with(
            "/profile/alice.eth",
            ResponseTemplate::new(200).set_body_json(profiles()),
        )
        .await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());

        assert_eq!(
            client.resolve("alice.eth").await.unwrap().as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
    }

    #[tokio::test]
    async fn test_null_platform_keeps_other_entries() {
        let mut body = profiles();
        body.as_array_mut().unwrap().insert(
            0,
            json!({ "address": null, "identity": "alice", "platform": null, "displayName": null }),
        );
        let server = server_with(
            "/profile/alice",
            ResponseTemplate::new(200).set_body_json(body),
        )
        .await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());

        let profiles = client.fetch_profiles("alice").await.unwrap();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].platform, "");
        assert_eq!(
            client.resolve("alice").await.unwrap().as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(
            client.fetch_farcaster_profile("alice").await.fid.as_deref(),
            Some("4242")
        );
    }

    #[tokio::test]
    async fn test_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/bob.eth"))
            .and(header("X-API-KEY", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        let client = Web3BioClient::new(Some("secret".into())).with_base_url(server.uri());

        assert_eq!(client.resolve("bob.eth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_name_is_none() {
        let server = server_with("/profile/ghost.eth", ResponseTemplate::new(404)).await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());

        assert_eq!(client.resolve("ghost.eth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let server = server_with("/profile/alice.eth", ResponseTemplate::new(500)).await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());

        assert!(matches!(
            client.resolve("alice.eth").await,
            Err(ResolveError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_farcaster_profile() {
        let server = server_with(
            "/profile/alice",
            ResponseTemplate::new(200).set_body_json(profiles()),
        )
        .await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());

        let profile = client.fetch_farcaster_profile("alice").await;
        assert_eq!(
            profile.address.as_deref(),
            Some("0x2222222222222222222222222222222222222222")
        );
        assert_eq!(profile.platform, "farcaster");
        assert_eq!(profile.username.as_deref(), Some("Alice"));
        assert_eq!(profile.fid.as_deref(), Some("4242"));
        assert_eq!(profile.social.unwrap().follower, Some(10));
    }

    #[tokio::test]
    async fn test_farcaster_profile_degrades_to_empty() {
        let server = server_with("/profile/alice", ResponseTemplate::new(500)).await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());
        assert!(client.fetch_farcaster_profile("alice").await.is_empty());

        let server = server_with(
            "/profile/alice",
            ResponseTemplate::new(200).set_body_string("not json"),
        )
        .await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());
        assert!(client.fetch_farcaster_profile("alice").await.is_empty());

        let server = server_with(
            "/profile/alice",
            ResponseTemplate::new(200).set_body_json(json!([{ "platform": "ens" }])),
        )
        .await;
        let client = Web3BioClient::new(None).with_base_url(server.uri());
        assert!(client.fetch_farcaster_profile("alice").await.is_empty());
    }
}

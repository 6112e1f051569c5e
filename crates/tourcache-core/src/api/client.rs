//! API client for the TDX tourism feed.
//!
//! This module provides the `ApiClient` struct for the three upstream calls
//! the cache layer needs: token exchange, per-domain collection fetch and
//! overlay file fetch.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::ClientCredentials;
use crate::models::Domain;

// ============================================================================
// Constants
// ============================================================================

/// TDX OAuth2 token endpoint
pub const DEFAULT_AUTH_URL: &str =
    "https://tdx.transportdata.tw/auth/realms/TDXConnect/protocol/openid-connect/token";

/// Base URL for the tourism data endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://tdx.transportdata.tw/api/basic/v2";

/// Host serving `/data/translated/{domain}.json`
pub const DEFAULT_OVERLAY_BASE_URL: &str = "http://localhost:3000";

/// HTTP request timeout in seconds.
/// Full collections are several megabytes; 30s covers a slow upstream.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where each upstream lives. All URLs are without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_base_url: String,
    pub overlay_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            overlay_base_url: DEFAULT_OVERLAY_BASE_URL.to_string(),
        }
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

/// API client for TDX and the overlay host.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    /// Exchange client credentials for a bearer token (form-encoded POST).
    pub async fn request_token(&self, credentials: &ClientCredentials) -> Result<TokenResponse, ApiError> {
        let response = self
            .client
            .post(&self.endpoints.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::read_json(response, "token response").await
    }

    /// Fetch the full collection for a domain.
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        domain: Domain,
        token: &str,
    ) -> Result<Vec<T>, ApiError> {
        let url = format!("{}/{}", self.endpoints.api_base_url, domain.collection_path());
        debug!(domain = %domain, url = %url, "Fetching upstream collection");

        let response = self
            .client
            .get(&url)
            .query(&[("$format", "JSON")])
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let items: Vec<serde_json::Value> =
            Self::read_json(response, &format!("{} collection", domain)).await?;

        // One malformed record must not take the whole collection down
        let total = items.len();
        let records: Vec<T> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if records.len() != total {
            warn!(domain = %domain, skipped = total - records.len(), "Skipped malformed upstream records");
        }
        Ok(records)
    }

    /// Fetch a domain's translation overlay as raw JSON.
    pub async fn fetch_overlay(&self, domain: Domain) -> Result<serde_json::Value, ApiError> {
        let url = format!(
            "{}/data/translated/{}",
            self.endpoints.overlay_base_url,
            domain.overlay_file()
        );
        debug!(domain = %domain, url = %url, "Fetching translation overlay");

        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(response).await?;
        Self::read_json(response, &format!("{} overlay", domain)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpotRecord;
    use wiremock::matchers::{body_string_contains, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Endpoints {
            auth_url: format!("{}/token", server.uri()),
            api_base_url: server.uri(),
            overlay_base_url: server.uri(),
        })
        .expect("Failed to build client")
    }

    #[tokio::test]
    async fn test_request_token_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=id-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_in": 86400,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .request_token(&ClientCredentials::new("id-1", "secret"))
            .await
            .unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_in, 86400);
    }

    #[tokio::test]
    async fn test_fetch_collection_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Tourism/ScenicSpot"))
            .and(query_param("$format", "JSON"))
            .and(header_eq("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ScenicSpotID": "S1", "ScenicSpotName": "象山"}
            ])))
            .mount(&server)
            .await;

        let spots: Vec<SpotRecord> = client_for(&server)
            .fetch_collection(Domain::Spots, "tok")
            .await
            .unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].id, "S1");
    }

    #[tokio::test]
    async fn test_fetch_collection_skips_malformed_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Tourism/ScenicSpot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ScenicSpotID": "S1", "ScenicSpotName": "象山"},
                {"ScenicSpotName": "No ID"},
                {"ScenicSpotID": "S3", "Position": {"PositionLat": "25.0", "PositionLon": 121.5}},
                {"ScenicSpotID": "S4"}
            ])))
            .mount(&server)
            .await;

        let spots: Vec<SpotRecord> = client_for(&server)
            .fetch_collection(Domain::Spots, "tok")
            .await
            .unwrap();
        let ids: Vec<&str> = spots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S4"]);
    }

    #[tokio::test]
    async fn test_fetch_collection_rejects_non_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Tourism/Restaurant"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "quota"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_collection::<SpotRecord>(Domain::Foods, "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_collection_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Tourism/Activity"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_collection::<SpotRecord>(Domain::Events, "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref body) if body == "maintenance"));
    }
}

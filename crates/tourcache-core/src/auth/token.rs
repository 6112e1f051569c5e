use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::ClientCredentials;
use crate::api::{ApiClient, ApiError};
use crate::clock::Clock;

/// Refresh this many seconds before the provider-declared expiry,
/// so a token never expires in flight.
const TOKEN_SAFETY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub obtained_at: DateTime<Utc>,
    /// Provider-declared lifetime in seconds
    pub expires_in: i64,
}

impl AccessToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.obtained_at + Duration::seconds(self.expires_in)
    }

    /// Usable while `now < expiry - safety margin`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at() - Duration::seconds(TOKEN_SAFETY_MARGIN_SECS)
    }
}

/// Holds one cached bearer token for the upstream provider.
pub struct TokenProvider {
    client: ApiClient,
    credentials: ClientCredentials,
    clock: Arc<dyn Clock>,
    // Held across the exchange, so concurrent callers wait for one refresh
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(client: ApiClient, credentials: ClientCredentials, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            credentials,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached token or exchange credentials for a new one.
    /// Failures propagate to the caller; there is no retry.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_usable(now)) {
            debug!("Using cached access token");
            return Ok(token.token.clone());
        }

        let response = self
            .client
            .request_token(&self.credentials)
            .await
            .inspect_err(|e| error!(error = %e, "Access token exchange failed"))?;

        info!(expires_in = response.expires_in, "Obtained upstream access token");
        let token = AccessToken {
            token: response.access_token,
            obtained_at: now,
            expires_in: response.expires_in,
        };
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoints;
    use crate::clock::ManualClock;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn token_server(expires_in: i64, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_in": expires_in,
                "token_type": "Bearer"
            })))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    fn provider(server: &MockServer, clock: Arc<ManualClock>) -> TokenProvider {
        let client = ApiClient::new(Endpoints {
            auth_url: format!("{}/token", server.uri()),
            api_base_url: server.uri(),
            overlay_base_url: server.uri(),
        })
        .unwrap();
        TokenProvider::new(client, ClientCredentials::new("id", "secret"), clock)
    }

    #[test]
    fn test_access_token_safety_margin() {
        let now = Utc::now();
        let token = AccessToken {
            token: "t".into(),
            obtained_at: now,
            expires_in: 3600,
        };
        assert!(token.is_usable(now + Duration::seconds(3539)));
        assert!(!token.is_usable(now + Duration::seconds(3540)));
    }

    #[tokio::test]
    async fn test_token_reused_until_margin() {
        let server = token_server(3600, 2).await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let provider = provider(&server, clock.clone());

        assert_eq!(provider.access_token().await.unwrap(), "tok");
        clock.advance(Duration::minutes(30));
        assert_eq!(provider.access_token().await.unwrap(), "tok");

        // Inside the 60s margin: refresh
        clock.advance(Duration::seconds(30 * 60 - 30));
        assert_eq!(provider.access_token().await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let server = token_server(3600, 1).await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let provider = Arc::new(provider(&server, clock));

        let calls = (0..8).map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.access_token().await })
        });
        for result in futures::future::join_all(calls).await {
            assert_eq!(result.unwrap().unwrap(), "tok");
        }
    }

    #[tokio::test]
    async fn test_exchange_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider(&server, Arc::new(ManualClock::new(Utc::now())));
        assert!(matches!(provider.access_token().await, Err(ApiError::Unauthorized)));
    }
}

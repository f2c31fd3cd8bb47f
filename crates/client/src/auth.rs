//! Bearer-credential lifecycle.
//!
//! The client holds at most one application credential. Before each dispatch
//! the service checks the held credential's expiry; only an absent, expired,
//! or unreadable credential triggers a token exchange. The exchange presents
//! the application key and secret and reads the fresh credential from the
//! response's `authorization` header.

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use flyingevents_common::token;

use crate::error::ApiError;
use crate::transport::ApiTransport;

pub(crate) const APPLICATION_TOKEN_PATH: &str = "/api/application/request-token";

pub(crate) struct TokenService {
    application_key: String,
    application_secret: String,
    current: RwLock<Option<String>>,
}

impl TokenService {
    pub(crate) fn new(application_key: String, application_secret: String) -> Self {
        Self { application_key, application_secret, current: RwLock::new(None) }
    }

    /// Seed a previously issued credential.
    pub(crate) async fn set_token(&self, token: String) {
        *self.current.write().await = Some(token);
    }

    /// Return a usable credential, exchanging application identity for a
    /// fresh one when the held credential is absent, expired, or unreadable.
    ///
    /// Holding a valid credential issues no network call. Concurrent callers
    /// may both observe an expired credential and both exchange; the last
    /// successful exchange wins.
    pub(crate) async fn ensure_valid(&self, transport: &ApiTransport) -> Result<String, ApiError> {
        if let Some(token) = self.usable_token().await {
            return Ok(token);
        }

        debug!("requesting a new application credential");
        let body = json!({
            "applicationKey": self.application_key,
            "applicationSecret": self.application_secret,
        });
        let response =
            transport.send(Method::POST, APPLICATION_TOKEN_PATH, Some(&body), None).await?;

        let token = response.authorization_header().ok_or_else(|| {
            ApiError::Transport(
                "token exchange response carried no authorization header".to_string(),
            )
        })?;

        *self.current.write().await = Some(token.clone());
        info!("application credential refreshed");
        Ok(token)
    }

    async fn usable_token(&self) -> Option<String> {
        let guard = self.current.read().await;
        let token = guard.as_deref()?;
        match token::expires_at(token) {
            Ok(expiry) if expiry > Utc::now() => Some(token.to_string()),
            Ok(_) => {
                debug!("held credential is expired");
                None
            }
            Err(err) => {
                debug!(error = %err, "held credential is unreadable, treating as expired");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn jwt_expiring_at(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"HS512"}"#);
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#).as_bytes());
        format!("{header}.{claims}.signature")
    }

    fn future_jwt() -> String {
        jwt_expiring_at(Utc::now().timestamp() + 3600)
    }

    fn expired_jwt() -> String {
        jwt_expiring_at(Utc::now().timestamp() - 3600)
    }

    fn transport_for(server: &MockServer) -> ApiTransport {
        ApiTransport::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn valid_credential_issues_no_network_call() {
        let server = MockServer::start().await;
        let service = TokenService::new("key".into(), "secret".into());
        let token = future_jwt();
        service.set_token(token.clone()).await;

        let result = service.ensure_valid(&transport_for(&server)).await.unwrap();

        assert_eq!(result, token);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn absent_credential_triggers_one_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APPLICATION_TOKEN_PATH))
            .and(body_json(json!({"applicationKey": "key", "applicationSecret": "secret"})))
            .respond_with(ResponseTemplate::new(200).insert_header("authorization", "fresh-token"))
            .expect(1)
            .mount(&server)
            .await;

        let service = TokenService::new("key".into(), "secret".into());
        let result = service.ensure_valid(&transport_for(&server)).await.unwrap();

        assert_eq!(result, "fresh-token");
    }

    #[tokio::test]
    async fn expired_credential_is_replaced_from_response_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APPLICATION_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).insert_header("authorization", "fresh-token"))
            .expect(1)
            .mount(&server)
            .await;

        let service = TokenService::new("key".into(), "secret".into());
        service.set_token(expired_jwt()).await;

        let result = service.ensure_valid(&transport_for(&server)).await.unwrap();
        assert_eq!(result, "fresh-token");

        // The stored credential was updated; a second call would still go to
        // the network only because the mock token is not a decodable JWT.
        assert_eq!(service.current.read().await.as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn unreadable_credential_is_treated_as_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APPLICATION_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).insert_header("authorization", "fresh-token"))
            .expect(1)
            .mount(&server)
            .await;

        let service = TokenService::new("key".into(), "secret".into());
        service.set_token("garbage".into()).await;

        let result = service.ensure_valid(&transport_for(&server)).await.unwrap();
        assert_eq!(result, "fresh-token");
    }

    #[tokio::test]
    async fn exchange_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APPLICATION_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = TokenService::new("key".into(), "secret".into());
        let err = service.ensure_valid(&transport_for(&server)).await.unwrap_err();

        assert!(matches!(err, ApiError::Server { .. }));
    }

    #[tokio::test]
    async fn exchange_without_authorization_header_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APPLICATION_TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let service = TokenService::new("key".into(), "secret".into());
        let err = service.ensure_valid(&transport_for(&server)).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }
}

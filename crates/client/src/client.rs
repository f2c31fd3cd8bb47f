//! Client facade: validation, credential lifecycle, two-tier delivery, and
//! the retry loop that coordinates them.

use flyingevents_common::RetryPolicy;
use parking_lot::RwLock;
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::auth::TokenService;
use crate::config::{ClientConfig, Environment};
use crate::error::ApiError;
use crate::event::EventRequest;
use crate::transport::{ApiResponse, ApiTransport};

pub(crate) const WORKER_SEND_PATH: &str = "/api/worker/send-event";
pub(crate) const FAILSAFE_SEND_PATH: &str = "/api/failsafe/send-event";

/// Asynchronous client for the event-distribution API.
///
/// One full delivery attempt is: credential check (refreshing when needed),
/// a send to the worker endpoint, and - on a server-class failure - a send of
/// the identical envelope to the failsafe endpoint. When the failsafe also
/// fails with a server error, a transport fault, or HTTP 408, the whole
/// attempt is repeated after a backoff delay, up to the policy's attempt
/// budget. Client errors (4xx) are terminal everywhere.
///
/// Methods take `&self`; concurrent dispatches run independently and share
/// only the credential store and the replaceable retry policy.
pub struct FlyingEventsClient {
    transport: ApiTransport,
    tokens: TokenService,
    environment: Environment,
    retry: RwLock<RetryPolicy>,
}

impl FlyingEventsClient {
    /// Create a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty key or secret or an
    /// invalid retry policy, and [`ApiError::Transport`] if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let transport = ApiTransport::new(&config.base_url, config.timeout)?;
        let tokens = TokenService::new(config.application_key, config.application_secret);

        debug!(environment = %config.environment, base_url = %config.base_url, "client configured");

        Ok(Self {
            transport,
            tokens,
            environment: config.environment,
            retry: RwLock::new(config.retry),
        })
    }

    /// Environment this client injects into every dispatch.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Replace the retry policy for subsequent dispatches.
    ///
    /// The swap is atomic; dispatches already in flight keep the policy they
    /// started with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the policy is invalid.
    pub fn set_retry_policy(&self, policy: RetryPolicy) -> Result<(), ApiError> {
        policy.validate()?;
        *self.retry.write() = policy;
        Ok(())
    }

    /// Seed a previously issued application credential.
    ///
    /// The credential is used as-is until it expires, exactly as if the
    /// client had obtained it through a token exchange.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.tokens.set_token(token.into()).await;
    }

    /// Deliver an event to its subscribers.
    ///
    /// Validates the request before any network activity, then runs delivery
    /// attempts strictly sequentially until one succeeds, a terminal error
    /// occurs, or the attempt budget is exhausted - in which case the last
    /// observed failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a missing field before any I/O;
    /// otherwise the terminal or last observed delivery error.
    pub async fn send_event(&self, request: &EventRequest) -> Result<ApiResponse, ApiError> {
        request.validate()?;
        let policy = self.retry.read().clone();
        let envelope = request.envelope(self.environment);

        let mut attempt = 1u32;
        loop {
            debug!(attempt, event = %request.event_name, "sending event");

            let token = self.tokens.ensure_valid(&self.transport).await?;
            let failure = match self
                .transport
                .send(Method::POST, WORKER_SEND_PATH, Some(&envelope), Some(&token))
                .await
            {
                Ok(response) => {
                    info!(event = %request.event_name, "event delivered");
                    return Ok(response);
                }
                Err(err) if err.routes_to_failsafe() => {
                    warn!(event = %request.event_name, error = %err, "worker delivery failed, invoking failsafe");
                    match self
                        .transport
                        .send(Method::POST, FAILSAFE_SEND_PATH, Some(&envelope), Some(&token))
                        .await
                    {
                        Ok(response) => {
                            info!(event = %request.event_name, "event delivered through failsafe");
                            return Ok(response);
                        }
                        Err(failsafe_err) => failsafe_err,
                    }
                }
                // 4xx from the worker is terminal and never reaches the failsafe.
                Err(err) => return Err(err),
            };

            if failure.schedules_retry() && attempt < policy.max_attempts {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %failure,
                    "failsafe delivery failed, scheduling another attempt"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            } else {
                return Err(failure);
            }
        }
    }

    /// Request a token for a single subscriber.
    ///
    /// One non-retried call; the token is read from the response's
    /// `authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty subscriber id, or the
    /// error of the credential check or the token request itself.
    pub async fn request_subscriber_token(&self, subscriber_id: &str) -> Result<String, ApiError> {
        if subscriber_id.is_empty() {
            return Err(ApiError::missing_parameter("subscriberId"));
        }

        let token = self.tokens.ensure_valid(&self.transport).await?;
        let path = format!("/api/subscriber/{subscriber_id}/request-token");
        let body = serde_json::json!({ "environment": self.environment });

        let response = self.transport.send(Method::POST, &path, Some(&body), Some(&token)).await?;
        response.authorization_header().ok_or_else(|| {
            ApiError::Transport(
                "subscriber token response carried no authorization header".to_string(),
            )
        })
    }
}

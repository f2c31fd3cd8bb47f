//! Client configuration.
//!
//! Configuration is explicit and per-instance: constructed once, validated
//! before any I/O, and read thereafter. Only the retry policy can be swapped
//! later, through [`crate::FlyingEventsClient::set_retry_policy`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use flyingevents_common::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Default host for the event-distribution API.
pub const DEFAULT_BASE_URL: &str = "https://app.flying.events";

/// Fixed per-request network timeout.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery environment the client operates in.
///
/// Injected into every event envelope and subscriber-token request; callers
/// never supply it per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    /// Production traffic
    Live,
    /// Test traffic
    Test,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "LIVE"),
            Self::Test => write!(f, "TEST"),
        }
    }
}

impl FromStr for Environment {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIVE" => Ok(Self::Live),
            "TEST" => Ok(Self::Test),
            other => Err(ApiError::Validation(format!(
                "unknown environment \"{other}\" - use available environment types (LIVE, TEST)"
            ))),
        }
    }
}

/// Configuration for [`crate::FlyingEventsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application identity presented during token exchange
    pub application_key: String,
    /// Application secret presented during token exchange
    pub application_secret: String,
    /// Environment injected into every dispatch
    pub environment: Environment,
    /// Base URL of the remote API
    pub base_url: String,
    /// Per-request network timeout
    pub timeout: Duration,
    /// Initial retry policy
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Configuration with default endpoint, timeout, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the key or secret is empty.
    pub fn new(
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        environment: Environment,
    ) -> Result<Self, ApiError> {
        Self::builder()
            .application_key(application_key)
            .application_secret(application_secret)
            .environment(environment)
            .build()
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.application_key.is_empty() {
            return Err(ApiError::missing_parameter("applicationKey"));
        }
        if self.application_secret.is_empty() {
            return Err(ApiError::missing_parameter("applicationSecret"));
        }
        self.retry.validate()?;
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    application_key: Option<String>,
    application_secret: Option<String>,
    environment: Option<Environment>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl ClientConfigBuilder {
    /// Set the application key.
    pub fn application_key(mut self, key: impl Into<String>) -> Self {
        self.application_key = Some(key.into());
        self
    }

    /// Set the application secret.
    pub fn application_secret(mut self, secret: impl Into<String>) -> Self {
        self.application_secret = Some(secret.into());
        self
    }

    /// Set the delivery environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the initial retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the key, secret, or environment is
    /// absent, the key or secret is empty, or the retry policy is invalid.
    pub fn build(self) -> Result<ClientConfig, ApiError> {
        let config = ClientConfig {
            application_key: self
                .application_key
                .ok_or_else(|| ApiError::missing_parameter("applicationKey"))?,
            application_secret: self
                .application_secret
                .ok_or_else(|| ApiError::missing_parameter("applicationSecret"))?,
            environment: self
                .environment
                .ok_or_else(|| ApiError::missing_parameter("environment"))?,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: self.retry.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

//! Async client for the flying.events event-distribution service.
//!
//! The client delivers application events to subscribers with resilience
//! against partial outages of the platform: it manages the application
//! bearer credential (acquired and refreshed through token exchange), sends
//! each event to the worker endpoint, falls back to the failsafe endpoint on
//! server-side failures, and repeats the whole cycle under a bounded,
//! jittered exponential backoff.
//!
//! ```no_run
//! use flyingevents_client::{ClientConfig, Environment, EventRequest, FlyingEventsClient};
//!
//! # async fn example() -> Result<(), flyingevents_client::ApiError> {
//! let config = ClientConfig::new("app-key", "app-secret", Environment::Live)?;
//! let client = FlyingEventsClient::new(config)?;
//!
//! let request = EventRequest::new(
//!     "order-shipped",
//!     serde_json::json!({ "orderId": 4221 }),
//!     vec!["subscriber-1".to_string()],
//! );
//! let response = client.send_event(&request).await?;
//! println!("delivered: {}", response.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

mod auth;
mod client;
mod config;
mod error;
mod event;
mod transport;

pub use client::FlyingEventsClient;
pub use config::{ClientConfig, ClientConfigBuilder, Environment, DEFAULT_BASE_URL};
pub use error::{ApiError, TRANSPORT_ERROR_CODE};
pub use event::EventRequest;
pub use flyingevents_common::{RetryPolicy, RetryPolicyBuilder, RetryPolicyError};
pub use transport::ApiResponse;

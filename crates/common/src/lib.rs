//! Shared building blocks for the FlyingEvents client crates.
//!
//! This crate has no knowledge of the delivery API itself. It provides:
//! - `retry`: the delivery retry policy and its backoff computation
//! - `token`: pure inspection of bearer-credential claims (expiry only)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod retry;
pub mod token;

pub use retry::{RetryPolicy, RetryPolicyBuilder, RetryPolicyError};
pub use token::{expires_at, ClaimsError};

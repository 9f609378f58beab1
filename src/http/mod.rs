//! HTTP transport module
//!
//! Provides the GET-only source API client and the minimum-interval rate
//! limiter.
//!
//! # Features
//!
//! - **Rate Limiting**: minimum inter-call spacing using governor
//! - **Status Classification**: non-2xx responses become typed errors
//! - **No Retries**: failed calls fall through to the next candidate
//!   endpoint instead of being retried

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig};
pub use rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};

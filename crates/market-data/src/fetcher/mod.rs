//! Rate-limited fetching.
//!
//! - [`RateLimiter`] keeps a fixed spacing per marketplace account
//! - [`HttpFetcher`] issues authenticated JSON requests and classifies failures
//! - [`run_staggered`] drives a batch with bounded concurrency and staggered starts
//! - [`CredentialProvider`] supplies bearer tokens

mod batch;
mod credentials;
mod http;
mod rate_limiter;

pub use batch::run_staggered;
pub use credentials::{CredentialProvider, StaticCredentials};
pub use http::{classify_failure, decode_body, BodyClassifier, HttpFetcher};
pub use rate_limiter::RateLimiter;

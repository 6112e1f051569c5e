//! Upstream authentication.
//!
//! This module provides:
//! - `ClientCredentials`: the OAuth2 client id/secret pair
//! - `TokenProvider`: a cached bearer token, refreshed 60 seconds before it expires
//!
//! Refreshes are single-flight: concurrent callers share one token exchange.

pub mod credentials;
pub mod token;

pub use credentials::ClientCredentials;
pub use token::{AccessToken, TokenProvider};

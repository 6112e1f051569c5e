//! REST client for the TDX tourism API and the static overlay host.
//!
//! The upstream uses OAuth2 client-credentials bearer tokens obtained from
//! the TDX auth realm. Overlay files are plain JSON served over HTTP.

pub mod client;
pub mod error;

pub use client::{ApiClient, Endpoints, TokenResponse};
pub use error::ApiError;

use thiserror::Error;

use crate::api::ApiError;
use crate::models::Domain;

/// Errors surfaced by the aggregation layer to request handlers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("No {domain} record with id {id}")]
    NotFound { domain: Domain, id: String },

    #[error("Failed to obtain upstream access token")]
    UpstreamAuth(#[source] ApiError),

    #[error("Failed to fetch {domain} from upstream")]
    UpstreamFetch {
        domain: Domain,
        #[source]
        source: ApiError,
    },

    #[error("Failed to build upstream client")]
    Client(#[source] ApiError),
}

impl Error {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Caller-side problems map to 4xx; everything else is an upstream/internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingParameter(_) | Error::InvalidArgument { .. } | Error::NotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

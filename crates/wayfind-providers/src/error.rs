use thiserror::Error;

/// Errors returned by a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, DNS, or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The provider answered with a structured error (quota, auth, bad request).
    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{0} requires a credential but none was supplied")]
    MissingCredential(&'static str),
}

impl ProviderError {
    /// `true` for network-level failures, `false` for errors the provider
    /// reported itself.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Api { .. }
            | Self::Deserialize { .. }
            | Self::InvalidBaseUrl { .. }
            | Self::MissingCredential(_) => false,
        }
    }
}

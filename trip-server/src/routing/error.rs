//! Routing client error types.

use std::fmt;

/// Errors from the routing HTTP client.
#[derive(Debug)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    Api { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,

    /// Response carried no usable route
    EmptyRoute,

    /// Response shape did not line up with the requested waypoints
    Malformed(String),

    /// No API key is configured
    NotConfigured,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Http(e) => write!(f, "HTTP error: {e}"),
            RoutingError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            RoutingError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            RoutingError::RateLimited => write!(f, "rate limited by routing API"),
            RoutingError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            RoutingError::EmptyRoute => write!(f, "routing API returned no route"),
            RoutingError::Malformed(msg) => write!(f, "malformed routing response: {msg}"),
            RoutingError::NotConfigured => write!(f, "routing API key not configured"),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Http(err)
    }
}

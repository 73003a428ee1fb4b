use std::time::Duration;
use thiserror::Error;

/// Errors from an invocation.
///
/// Every failure of [`Client::invoke`](crate::Client::invoke) is returned as
/// one of these variants; nothing panics across the public boundary.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The model config cannot be used. Detected before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No response arrived before the deadline. The request was aborted.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Transport failure other than a timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not JSON.
    #[error("invalid provider response: {0}")]
    Parse(String),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the error was raised before any request was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<registry::Error> for Error {
    fn from(err: registry::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use registry::ProviderId;

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let err: Error = "mistral"
            .parse::<ProviderId>()
            .map_err(Error::from)
            .unwrap_err();
        assert_eq!(err, Error::Configuration("unknown provider: mistral".into()));
    }

    #[test]
    fn display() {
        assert_eq!(
            Error::Timeout(Duration::from_millis(1500)).to_string(),
            "request timed out after 1500ms"
        );
        assert_eq!(
            Error::Api {
                status: 401,
                message: "bad key".into()
            }
            .to_string(),
            "API error (401): bad key"
        );
    }
}

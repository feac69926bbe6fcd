//! Client-side error taxonomy shared by the browser and terminal clients.

use thiserror::Error;

/// Unified error type for calls against the Pigeon API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The request never produced a response (network down, CORS, DNS...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status outside of the envelope
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Access token rejected and refreshing it did not help
    #[error("Unauthorized: please sign in again")]
    Unauthorized,

    /// Envelope reported `status: "error"`
    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
    },

    /// Body could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Envelope said success but carried no data
    #[error("Response did not contain any data")]
    MissingData,

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ClientError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ClientError::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        ClientError::Decode(err.to_string())
    }

    /// Map a non-2xx status that carried no usable envelope.
    pub fn from_status(status: u16) -> Self {
        if status == 401 {
            ClientError::Unauthorized
        } else {
            ClientError::Http { status }
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Invalid(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ClientError::from_status(401), ClientError::Unauthorized);
        assert_eq!(
            ClientError::from_status(503),
            ClientError::Http { status: 503 }
        );
    }

    #[test]
    fn test_api_error_displays_message() {
        let err = ClientError::Api {
            code: Some("sync_running".to_string()),
            message: "A sync is already running".to_string(),
        };
        assert_eq!(err.to_string(), "A sync is already running");
    }
}

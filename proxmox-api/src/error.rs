//! The client error taxonomy.

use pve_types::SlotsExhausted;

/// Errors surfaced by the client.
///
/// Authentication, lookup and server side failures are distinguished
/// so callers can react differently; slot exhaustion from disk
/// allocation stays its own variant since it is not a request failure
/// at all and retrying it cannot help.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server rejected our credentials or ticket (HTTP 401).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The server rejected the request parameters (other HTTP 4xx),
    /// or a parameter failed validation before sending.
    #[error("{0}")]
    Validation(String),

    /// The server failed to process the request (HTTP 5xx).
    #[error("{0}")]
    Api(String),

    /// A status code outside the mapped ranges.
    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),

    /// The request could not be delivered.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The request failed for another transport level reason.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body was not valid JSON, or did not match the
    /// expected shape.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was well-formed but semantically unexpected, e.g.
    /// a missing `data` member.
    #[error("api returned unexpected data: {0}")]
    BadApi(String),

    /// All disk slots of the requested bus are occupied.
    #[error(transparent)]
    SlotsExhausted(#[from] SlotsExhausted),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_connect() {
            Error::Connection(err.to_string())
        } else {
            Error::Request(err.to_string())
        }
    }
}

//! Error types and classification of failed API responses.
//!
//! Every operation of the crate returns [`Error`]. Failed exchanges are turned
//! into exactly one of [`Error::Api`], [`Error::Message`], [`Error::Status`]
//! or [`Error::Unhandled`] by [`classify`], checked in that order of
//! precedence.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the [`Client`](crate::Client) and every service.
#[derive(Debug, Error)]
pub enum Error {
    /// The network exchange itself failed (connection, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response carried a body that is not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// Failure response without a JSON body.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Structured `{"errors": [...]}` failure response.
    #[error(transparent)]
    Api(#[from] ErrorsResponse),

    /// Failure response whose body is a bare JSON string, as returned by
    /// some undocumented endpoints.
    #[error("{0}")]
    Message(String),

    /// JSON failure response matching none of the known shapes.
    #[error("unhandled error response ({status}): {body}")]
    Unhandled { status: StatusCode, body: String },

    /// The call was rejected locally, before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server did not issue a CSRF token when one was required.
    #[error("no csrf token was issued by the server")]
    MissingToken,
}

impl Error {
    /// First structured API error, if this error carries any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(errors) => errors.first(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when known.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status(err) => Some(err.status),
            Error::Unhandled { status, .. } => Some(*status),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// Unexpected HTTP failure for which no error body could be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad response: {}", .status.canonical_reason().unwrap_or("unknown status"))]
pub struct StatusError {
    pub status: StatusCode,
}

/// A single entry of the API's error response model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("response code {code}: {message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// The API's errors response model: one or more [ApiError] entries.
///
/// Displays every entry joined by `"; "`. The first entry is exposed as the
/// error source, without implying it is the most severe one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<ApiError>,
}

impl ErrorsResponse {
    pub fn first(&self) -> Option<&ApiError> {
        self.errors.first()
    }
}

impl fmt::Display for ErrorsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorsResponse {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.first().map(|error| error as &(dyn std::error::Error + 'static))
    }
}

/// Classify a failed response.
///
/// 1. A content type other than `application/json` gives [`Error::Status`].
/// 2. An `{"errors": [...]}` body gives [`Error::Api`].
/// 3. A bare JSON string body gives [`Error::Message`].
/// 4. Anything else gives [`Error::Unhandled`] with the raw body.
///
/// # Arguments
///
/// * `status` - Status code of the failed response.
/// * `content_type` - Value of the `Content-Type` response header, empty if missing.
/// * `body` - The complete response body.
pub fn classify(status: StatusCode, content_type: &str, body: &[u8]) -> Error {
    if !content_type.starts_with(mime::APPLICATION_JSON.essence_str()) {
        return StatusError { status }.into();
    }

    if let Ok(errors) = serde_json::from_slice::<ErrorsResponse>(body) {
        return Error::Api(errors);
    }

    if let Ok(message) = serde_json::from_slice::<String>(body) {
        return Error::Message(message);
    }

    Error::Unhandled {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

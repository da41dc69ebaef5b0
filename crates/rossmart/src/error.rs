use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Boxed error, used at the transport seam
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias over this crate's error type
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Client error type
#[derive(Debug, Error)]
pub enum Error {
    /// The credential input was unusable
    #[error(transparent)]
    Credential(#[from] crate::credential::Error),

    /// A key file was missing or malformed
    #[error(transparent)]
    KeyLoad(#[from] crate::keys::Error),

    /// The private key could not be unlocked with the derived passphrase, or
    /// its format was not understood
    #[error("failed to unlock or parse the private signing key")]
    Signing(#[source] cavage::crypto::parse::Error),

    /// Request signing failed
    #[error(transparent)]
    Signature(#[from] cavage::easy::Error),

    /// The server rejected the signature (401/403)
    #[error("authentication rejected: {0}")]
    Authentication(ApiError),

    /// The server answered with a non-success status
    #[error("{0}")]
    Api(ApiError),

    /// A required client parameter was not provided at construction
    #[error("missing required client parameter: {0}")]
    MissingParameter(&'static str),

    /// The request could not be constructed
    #[error(transparent)]
    Request(#[from] http::Error),

    /// Query string serialisation failed
    #[error(transparent)]
    Query(#[from] serde_urlencoded::ser::Error),

    /// JSON (de)serialisation failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The HTTP exchange itself failed
    #[error("transport error")]
    Transport(#[source] BoxError),
}

/// A single business-rule rejection from the server
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    /// Server-assigned error code
    pub code: String,

    /// Human-readable description
    pub message: String,
}

#[derive(Deserialize)]
struct ValidationErrorEnvelope {
    #[serde(default, rename = "validationErrors")]
    validation_errors: Vec<ValidationError>,
}

/// A non-success response from the server
///
/// Carries everything needed to diagnose the failure after the call returned:
/// the status, the raw body, the structured validation errors parsed out of it,
/// and (for writes) the payload that was sent.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status the server answered with
    pub status: StatusCode,

    /// URL the failed request was sent to
    pub url: String,

    /// Raw response body
    pub body: String,

    /// Validation errors parsed from the body, empty if there were none
    pub validation_errors: Vec<ValidationError>,

    /// Payload of the originating request, for writes
    pub payload: Option<Value>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, url: String, body: String, payload: Option<Value>) -> Self {
        let validation_errors = serde_json::from_str::<ValidationErrorEnvelope>(&body)
            .map(|envelope| envelope.validation_errors)
            .unwrap_or_default();

        Self {
            status,
            url,
            body,
            validation_errors,
            payload,
        }
    }

    /// All validation errors carrying the given code
    #[must_use]
    pub fn validation_errors(&self, code: &str) -> Vec<&ValidationError> {
        self.validation_errors
            .iter()
            .filter(|error| error.code == code)
            .collect()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] failed, status code [{}]", self.url, self.status)
    }
}

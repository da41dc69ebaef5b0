//!
//! Fool-proof request signing
//!
//! Stamps the `Date` header, picks the covered headers for the request method,
//! and attaches the finished `Signature` header in one call
//!

use crate::{
    crypto::SigningKey, header, signature_string, SignatureHeader, ALGORITHM, SIGNATURE_HEADER,
};
use http::{
    header::{DATE, HOST},
    HeaderValue, Method,
};
use std::time::SystemTime;
use thiserror::Error;
use tracing::instrument;

const GET_HEADERS: &[&str] = &["(request-target)", "host", "date"];
const POST_HEADERS: &[&str] = &["(request-target)", "host", "date", "digest"];

/// Easy module error
#[derive(Debug, Error)]
pub enum Error {
    /// Blocking task communication failure
    #[error(transparent)]
    Blocking(#[from] tokio::task::JoinError),

    /// Header value contained invalid characters
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request URI has no authority to derive the `Host` header from
    #[error("Missing authority")]
    MissingAuthority,

    /// Signature string construction failure
    #[error(transparent)]
    SignatureStringConstruction(#[from] signature_string::Error),

    /// HTTP method is unsupported
    #[error("Unsupported HTTP method")]
    UnsupportedHttpMethod,
}

/// Sign an HTTP request using the provided signing key
///
/// The `Date` header is set (and overwritten) to the moment of signing, and the
/// `Host` header is derived from the request URI if absent; both are covered by
/// the signature. POST requests additionally cover the `digest` header, which
/// the caller must have set beforehand.
#[inline]
#[instrument(skip_all)]
pub async fn sign<B, SK>(
    mut req: http::Request<B>,
    key_id: &str,
    key: SK,
) -> Result<http::Request<B>, Error>
where
    SK: SigningKey + Send + 'static,
{
    // The `Date` value in the canonical string and on the wire have to be the
    // exact same bytes, so set the header first and sign what was set.
    let date_header_value = HeaderValue::from_str(&httpdate::fmt_http_date(SystemTime::now()))
        .expect("HTTP date is always a valid header value");
    req.headers_mut().insert(DATE, date_header_value);

    if !req.headers().contains_key(HOST) {
        let authority = req.uri().authority().ok_or(Error::MissingAuthority)?;
        let host_header_value = HeaderValue::from_str(authority.as_str())?;
        req.headers_mut().insert(HOST, host_header_value);
    }

    let headers = match *req.method() {
        Method::GET => GET_HEADERS.iter().copied(),
        Method::POST => POST_HEADERS.iter().copied(),
        _ => return Err(Error::UnsupportedHttpMethod),
    };

    let signature_header = SignatureHeader {
        key_id,
        algorithm: Some(ALGORITHM),
        headers,
        signature: (),
    };

    let signature_string = signature_string::construct(&req, &signature_header)?;
    let signature =
        tokio::task::spawn_blocking(move || crate::crypto::sign(signature_string.as_bytes(), &key))
            .await?;

    let signature_header = SignatureHeader {
        key_id: signature_header.key_id,
        algorithm: signature_header.algorithm,
        headers: signature_header.headers,
        signature: signature.as_str(),
    };

    let signature_header_value = HeaderValue::from_str(&header::serialise(signature_header))?;
    req.headers_mut()
        .insert(&SIGNATURE_HEADER, signature_header_value);

    Ok(req)
}

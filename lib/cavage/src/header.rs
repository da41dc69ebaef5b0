//!
//! `Signature` header value type, serialisation and parsing
//!

use miette::Diagnostic;
use std::fmt::Write;
use std::str::SplitWhitespace;
use thiserror::Error;

/// Parsed or to-be-serialised contents of a `Signature` header
///
/// `I` is an iterator over the covered header names, `S` the signature
/// representation. Signing starts out with `S = ()` and fills the signature in
/// once the signature string has been signed.
#[derive(Clone)]
pub struct SignatureHeader<'a, I, S> {
    /// Identifier of the key the signature was created with
    pub key_id: &'a str,

    /// Signature algorithm identifier (for example `rsa-sha512`)
    pub algorithm: Option<&'a str>,

    /// Names of the headers covered by the signature, in signing order
    pub headers: I,

    /// Base64-encoded signature
    pub signature: S,
}

/// Signature header parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum ParseError {
    /// A mandatory field was missing from the header
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Serialise a signature header into its wire representation
///
/// Field order is `keyId`, `algorithm`, `headers`, `signature`, without spaces
/// after the separating commas.
#[inline]
pub fn serialise<'a, I>(header: SignatureHeader<'_, I, &str>) -> String
where
    I: Iterator<Item = &'a str>,
{
    let mut buffer = String::new();

    let _ = write!(buffer, "keyId=\"{}\"", header.key_id);

    if let Some(algorithm) = header.algorithm {
        let _ = write!(buffer, ",algorithm=\"{algorithm}\"");
    }

    buffer.push_str(",headers=\"");
    for item in itertools::intersperse(header.headers, " ") {
        buffer.push_str(item);
    }
    buffer.push('"');

    let _ = write!(buffer, ",signature=\"{}\"", header.signature);

    buffer
}

/// Parse a `Signature` header value
///
/// Unknown fields are skipped. `keyId`, `headers`, and `signature` are
/// mandatory, `algorithm` is not.
pub fn parse(raw: &str) -> Result<SignatureHeader<'_, SplitWhitespace<'_>, &str>, ParseError> {
    let mut key_id = None;
    let mut algorithm = None;
    let mut headers = None;
    let mut signature = None;

    for pair in raw.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');

        match key.trim() {
            "keyId" => key_id = Some(value),
            "algorithm" => algorithm = Some(value),
            "headers" => headers = Some(value.split_whitespace()),
            "signature" => signature = Some(value),
            _ => (),
        }
    }

    Ok(SignatureHeader {
        key_id: key_id.ok_or(ParseError::MissingField("keyId"))?,
        algorithm,
        headers: headers.ok_or(ParseError::MissingField("headers"))?,
        signature: signature.ok_or(ParseError::MissingField("signature"))?,
    })
}

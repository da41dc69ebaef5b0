//!
//! Request body digest
//!
//! Writes carry a `Digest` header so the server can tie the signature to the
//! body: the SHA-512 of the exact serialized body bytes, Base64-encoded. This
//! API expects the bare encoded hash, with no `sha-512=` algorithm prefix. A
//! mismatch between the hashed bytes and the transmitted bytes surfaces as a
//! signature rejection on the server, not as a payload error.
//!

use http::HeaderName;
use sha2::{Digest, Sha512};

/// Name of the digest header
pub static DIGEST_HEADER_NAME: HeaderName = HeaderName::from_static("digest");

/// Compute the `Digest` header value for a request body
#[must_use]
pub fn compute(body: &[u8]) -> String {
    base64_simd::STANDARD.encode_to_string(Sha512::digest(body))
}

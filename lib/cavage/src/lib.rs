//!
//! Sign-only implementation of the "Signing HTTP Messages" (draft-cavage) scheme
//!
//! Builds the signature string from selected request components, signs it with
//! an RSA key, and attaches the result as a `Signature` header. Verification is
//! the server's job; this crate never checks signatures itself.
//!

#![forbid(rust_2018_idioms, unsafe_code)]
#![deny(missing_docs)]

use http::HeaderName;

pub mod crypto;
pub mod easy;
pub mod header;
pub mod signature_string;

pub use self::header::SignatureHeader;
pub use ring;

/// Algorithm identifier advertised in the signature header
///
/// The only scheme this crate signs with: RSA PKCS#1 v1.5 over a SHA-512
/// digest of the signature string.
pub const ALGORITHM: &str = "rsa-sha512";

static SIGNATURE_HEADER: HeaderName = HeaderName::from_static("signature");

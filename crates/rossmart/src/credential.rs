//!
//! Legacy credential transform
//!
//! The credential-issuance process protects the private key with the MD5 hash
//! of the account password rather than the password itself: the password's
//! Latin-1 bytes are hashed and the 16 raw hash bytes are Base64-encoded. The
//! output is the key passphrase and is a secret in its own right. Compatibility
//! is defined by byte-exact agreement with that process, so the algorithm is
//! not negotiable.
//!

use md5::{Digest, Md5};
use thiserror::Error;

/// Credential transform error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The password was empty
    #[error("password is empty")]
    Empty,

    /// The password contains a character outside the Latin-1 range
    #[error("password is not representable in Latin-1")]
    NotLatin1,

    /// No password was provided
    #[error("either a password or a pre-hashed password is required")]
    Missing,

    /// Both a plaintext and a pre-hashed password were provided
    #[error("password and pre-hashed password are mutually exclusive")]
    Conflicting,
}

/// Derive the key passphrase from the plaintext account password
pub fn derive(password: &str) -> Result<String, Error> {
    if password.is_empty() {
        return Err(Error::Empty);
    }

    let bytes = password
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| Error::NotLatin1))
        .collect::<Result<Vec<u8>, Error>>()?;

    Ok(base64_simd::STANDARD.encode_to_string(Md5::digest(bytes)))
}

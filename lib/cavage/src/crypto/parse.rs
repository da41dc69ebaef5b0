//!
//! Parse private signing keys from their armored (PEM) form
//!

use const_oid::db::rfc5912::RSA_ENCRYPTION;
use miette::Diagnostic;
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo, SecretDocument};
use ring::signature::RsaKeyPair;
use thiserror::Error;

/// Key parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Malformed DER structure
    #[error(transparent)]
    Der(#[from] pkcs8::der::Error),

    /// Key rejected
    #[error(transparent)]
    KeyRejected(#[from] ring::error::KeyRejected),

    /// Malformed PKCS#8 document, or the passphrase failed to decrypt it
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),

    /// Unknown key type
    #[error("Unknown key type")]
    UnknownKeyType,
}

/// Parse an RSA private key from its PEM form, unlocking it with the given passphrase
///
/// Accepted armors:
///
/// - `ENCRYPTED PRIVATE KEY` (PKCS#8, PBES2-encrypted with the passphrase)
/// - `PRIVATE KEY` (PKCS#8, the passphrase is ignored)
/// - `RSA PRIVATE KEY` (PKCS#1, the passphrase is ignored)
#[inline]
pub fn private_key(pem: &str, passphrase: &str) -> Result<RsaKeyPair, Error> {
    let (label, document) = SecretDocument::from_pem(pem)?;

    let document = match label {
        "ENCRYPTED PRIVATE KEY" => {
            EncryptedPrivateKeyInfo::try_from(document.as_bytes())?.decrypt(passphrase)?
        }
        "RSA PRIVATE KEY" => return Ok(RsaKeyPair::from_der(document.as_bytes())?),
        _ => document,
    };

    let private_key_raw: PrivateKeyInfo<'_> = document.decode_msg()?;
    if private_key_raw.algorithm.oid != RSA_ENCRYPTION {
        return Err(Error::UnknownKeyType);
    }

    Ok(RsaKeyPair::from_der(private_key_raw.private_key)?)
}

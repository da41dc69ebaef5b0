//!
//! Key material loading
//!
//! The public key is never used for verification on this side; its armor-less
//! content is the `keyId` the server uses to look up the caller. The private
//! key is kept as opaque PEM text, parsing is the signing layer's business.
//!

use std::{fs, io, path::Path};
use thiserror::Error;

/// Key loading error
#[derive(Debug, Error)]
pub enum Error {
    /// The key file could not be read
    #[error("failed to read key file {path}")]
    Io {
        /// Path of the offending file
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The public key file contained nothing but armor lines
    #[error("public key file {path} contains no key material")]
    EmptyPublicKey {
        /// Path of the offending file
        path: String,
    },
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load the key identifier from an armored public key file
///
/// All armor delimiter lines (four or more leading dashes) are skipped; the
/// remaining lines are trimmed and concatenated without separators. The result
/// is used verbatim as the signature's `keyId`.
pub fn public_key_identifier<P>(path: P) -> Result<String, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let identifier: String = read_file(path)?
        .lines()
        .filter(|line| !line.starts_with("----"))
        .map(str::trim)
        .collect();

    if identifier.is_empty() {
        return Err(Error::EmptyPublicKey {
            path: path.display().to_string(),
        });
    }

    Ok(identifier)
}

/// Load the private key file as opaque PEM text
pub fn private_key_material<P>(path: P) -> Result<String, Error>
where
    P: AsRef<Path>,
{
    read_file(path.as_ref())
}

//!
//! Cryptographic primitives behind the signature scheme
//!

pub mod parse;

mod sign;

pub use self::sign::{sign, SigningKey};

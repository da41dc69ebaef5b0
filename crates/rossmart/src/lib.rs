//!
//! Client for the ROS PAYE Employers REST API
//!
//! Every request is authenticated with a draft-cavage HTTP signature: the
//! canonical string over `(request-target)`, `host`, `date` (and `digest` for
//! writes) is signed with RSA-SHA512 using a private key whose passphrase is
//! the legacy hash of the account password. This crate owns the credential
//! transform, key loading, request signing and dispatch; payload shapes are
//! passed through untouched.
//!

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod credential;
pub mod digest;
pub mod keys;

mod api;
mod client;
mod config;
mod error;

pub use self::client::{Client, ClientBuilder, Endpoint, LIVE_ROOT, TEST_ROOT};
pub use self::config::Configuration;
pub use self::error::{ApiError, Error, Result, ValidationError};

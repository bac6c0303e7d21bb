//! Shared types used across the trust-chain core: the `Role` enumeration,
//! RFC 3339 timestamp handling, and certificate/signature verification.
//!
//! Mirrors the teacher's `common` crate: a small, dependency-light crate
//! that the domain crate (`core`) builds on, rather than duplicating these
//! concerns in every component module.

pub mod crypto;
pub mod role;
pub mod timestamp;

pub use crypto::{decode_certificate, verify_detached, CertificateVerifyingKey};
pub use role::Role;
pub use timestamp::parse_rfc3339;

use thiserror::Error;

/// Low-level failures that can occur while parsing caller-supplied values
/// or decoding cryptographic material. `core::error::CoreError` wraps these
/// into its own taxonomy rather than exposing them directly to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("unrecognized role: {0}")]
    InvalidRole(String),
    #[error("unparseable RFC 3339 timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("malformed certificate: {0}")]
    CertDecode(String),
}

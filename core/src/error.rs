//! The error taxonomy of `spec.md` §7, as a single `thiserror` enum.
//!
//! Generalizes the teacher's per-module `contracterror` enums
//! (`RecoveryError`, `CredentialError`, `vision_records::ContractError`)
//! into one crate-wide type, the way a host-ledger chaincode core — which
//! has no per-contract ABI boundary to keep separate error codes behind —
//! naturally would. The `category()` method mirrors
//! `vision_records::errors::ContractError::category`.

use agrifood_common::CommonError;
use thiserror::Error;

/// Coarse classification used for monitoring/retry decisions, mirroring
/// the teacher's `ErrorCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    NotFound,
    StateConflict,
    Storage,
    Transient,
    System,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("bad argument: {0}")]
    BadArg(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("unknown caller")]
    UnknownCaller,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("expired: {0}")]
    Expired(String),
    #[error("revoked: {0}")]
    Revoked(String),
    #[error("bad state: {0}")]
    BadState(String),
    #[error("store read failed: {0}")]
    StoreRead(String),
    #[error("store write failed: {0}")]
    StoreWrite(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("crypto failure: {0}")]
    CryptoFail(String),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::UnknownFunction(_) | CoreError::BadArg(_) => ErrorCategory::Validation,
            CoreError::Unauthorized(_) | CoreError::UnknownCaller => ErrorCategory::Authorization,
            CoreError::NotFound(_) => ErrorCategory::NotFound,
            CoreError::Duplicate(_)
            | CoreError::Expired(_)
            | CoreError::Revoked(_)
            | CoreError::BadState(_) => ErrorCategory::StateConflict,
            CoreError::Encode(_) | CoreError::Decode(_) => ErrorCategory::Storage,
            CoreError::StoreRead(_) | CoreError::StoreWrite(_) => ErrorCategory::Transient,
            CoreError::CryptoFail(_) => ErrorCategory::System,
        }
    }
}

impl From<CommonError> for CoreError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::InvalidRole(s) => CoreError::BadArg(format!("invalid role: {s}")),
            CommonError::InvalidTimestamp(s) => {
                CoreError::BadArg(format!("invalid timestamp: {s}"))
            }
            CommonError::CertDecode(s) => CoreError::CryptoFail(format!("cert decode: {s}")),
        }
    }
}

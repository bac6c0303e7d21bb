//! The host ledger interface this core consumes (`spec.md` §6).
//!
//! Generalizes the teacher's implicit host — every Soroban contract method
//! takes an `Env` that threads through to `env.storage()` and
//! `env.crypto()` — into two small traits this crate is generic over,
//! since here the host is an out-of-scope replicated KV store rather than
//! an in-process VM environment.

use crate::error::CoreError;

/// Atomic per-key get/put over the host's replicated key-value store.
/// `spec.md` §5: "every mutation follows the pattern *load whole
/// collection → validate → mutate in place → save whole collection*"; this
/// trait only needs to offer whole-value get/put for that to work.
pub trait Ledger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), CoreError>;
}

/// Host-provided signature verification (`spec.md` §6:
/// `VerifySignature(cert, σ, payload∥binding) -> bool`).
pub trait SignatureHost {
    fn verify_signature(&self, cert_b64: &str, signature: &[u8], message: &[u8]) -> bool;
}

/// The raw per-transaction credentials the host hands the core
/// (`spec.md` §6: `GetCallerMetadata`, `GetPayload`, `GetBinding`).
#[derive(Debug, Clone)]
pub struct CallerEnvelope {
    pub caller_metadata: Vec<u8>,
    pub payload: Vec<u8>,
    pub binding: Vec<u8>,
}

impl CallerEnvelope {
    /// The exact byte string a signature is checked against: `payload ||
    /// binding` (`spec.md` §4.2), concatenated the same way the teacher's
    /// `common::meta_tx::build_grant_message` concatenates an operation's
    /// fields into one canonical message before signing.
    pub fn signed_message(&self) -> Vec<u8> {
        let mut msg = Vec::with_capacity(self.payload.len() + self.binding.len());
        msg.extend_from_slice(&self.payload);
        msg.extend_from_slice(&self.binding);
        msg
    }
}

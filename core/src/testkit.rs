//! An in-memory `Ledger` + `SignatureHost`, gated the same way the teacher
//! gates `vision_records`'s `testutils` Cargo feature — exposed so other
//! crates embedding this core can exercise it without standing up a real
//! host ledger, and used directly by this crate's own tests.

use std::collections::BTreeMap;

use agrifood_common::crypto::{decode_certificate, verify_detached};

use crate::error::CoreError;
use crate::ledger::{Ledger, SignatureHost};

/// A `Ledger` backed by an in-process `BTreeMap`, standing in for the host
/// replicated KV store in tests (mirrors the teacher's `Env::default()`
/// in-memory Soroban host used by every `#[test]`).
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    data: BTreeMap<String, Vec<u8>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for InMemoryLedger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), CoreError> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }
}

/// A `SignatureHost` that does real ed25519 verification, so tests exercise
/// genuine signature checks (`spec.md` P1) instead of a stub that always
/// returns `true`.
#[derive(Debug, Default)]
pub struct Ed25519SignatureHost;

impl SignatureHost for Ed25519SignatureHost {
    fn verify_signature(&self, cert_b64: &str, signature: &[u8], message: &[u8]) -> bool {
        match decode_certificate(cert_b64) {
            Ok(key) => verify_detached(&key, signature, message),
            Err(_) => false,
        }
    }
}

/// A ready-made ed25519 keypair plus its base64 certificate, for tests that
/// need to sign things as a specific party.
pub struct TestIdentity {
    pub signing_key: ed25519_dalek::SigningKey,
    pub cert_b64: String,
}

impl TestIdentity {
    pub fn generate() -> Self {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine;
        use rand::rngs::OsRng;

        let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
        let cert_b64 = BASE64.encode(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            cert_b64,
        }
    }

    /// Signs `message` and returns the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        use ed25519_dalek::Signer;
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

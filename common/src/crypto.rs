//! Certificate decoding and signature verification.
//!
//! `spec.md` §3 calls certificates "base64-encoded X.509-style
//! certificates"; this core treats that loosely, the same way the
//! teacher's `common::meta_tx::verify_meta_signature` stands in for a full
//! PKI with a bare ed25519 key and `env.crypto().ed25519_verify`. Here a
//! certificate is a base64 blob wrapping a 32-byte ed25519 verifying key;
//! "X.509-style" is honored in spirit (an opaque encoded credential handed
//! around by value) without pulling in a full ASN.1/X.509 parser for a
//! deterministic toy ledger core.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey};

use crate::CommonError;

/// A decoded certificate: just the verifying key it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateVerifyingKey(pub VerifyingKey);

/// Decodes a base64-encoded certificate into its verifying key.
///
/// Fails with `CommonError::CertDecode` on bad base64 or a key that isn't
/// a valid compressed ed25519 point — both map to `CoreError::CryptoFail`
/// at the `core` layer (`spec.md` §7: "CertDecode errors on individual
/// certs abort with `CertDecode`" — folded into `CryptoFail` here since
/// this crate does not need a dedicated variant for it).
pub fn decode_certificate(cert_b64: &str) -> Result<CertificateVerifyingKey, CommonError> {
    let bytes = BASE64
        .decode(cert_b64.trim())
        .map_err(|e| CommonError::CertDecode(e.to_string()))?;
    let key_bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CommonError::CertDecode(format!("expected 32 bytes, got {}", bytes.len())))?;
    let key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| CommonError::CertDecode(e.to_string()))?;
    Ok(CertificateVerifyingKey(key))
}

/// Verifies a detached ed25519 signature over `message`, encoded the way
/// the host ledger hands it to the core: a 64-byte signature and the
/// message it was computed over (`payload || binding`, per `spec.md`
/// §4.2). Returns `false` rather than erroring on a malformed signature —
/// an invalid signature and an unparseable one are the same "this caller
/// did not prove their identity" outcome from the caller's point of view.
pub fn verify_detached(cert: &CertificateVerifyingKey, signature: &[u8], message: &[u8]) -> bool {
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    cert.0.verify_strict(message, &signature).is_ok()
}

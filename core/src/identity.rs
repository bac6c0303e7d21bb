//! C2 — Identity Verifier (`spec.md` §4.2): authenticate the caller by
//! matching their transaction signature against a list of candidate
//! certificates.
//!
//! Grounded in the teacher's `common::meta_tx::verify_meta_signature`
//! (ed25519 verification over a canonically-built message) and
//! `identity::recovery::is_owner_active`-style "does this address satisfy
//! the role I need" checks, generalized from a single Soroban `Address`
//! check into a scan over every candidate certificate, since here identity
//! is proven by signature rather than by the host's native
//! `Address::require_auth()`.

use crate::error::CoreError;
use crate::ledger::{CallerEnvelope, SignatureHost};
use crate::model::Party;

/// Low-level check: does `cert_b64` verify the caller's signature over
/// this transaction's `payload || binding`?
pub fn is_caller(host: &dyn SignatureHost, cert_b64: &str, envelope: &CallerEnvelope) -> bool {
    host.verify_signature(cert_b64, &envelope.caller_metadata, &envelope.signed_message())
}

/// Does *any* certificate in `certs` verify the caller's signature? By the
/// time a cert reaches this set it was already decoded once, at
/// registration (`party_registry::add_admin`/`add_party`/`add_cert` all
/// reject an undecodable cert with `CryptoFail` before it is ever stored —
/// `spec.md` §4.2's "decoding errors on individual certs abort with
/// `CertDecode`"). A decode failure here would mean stored state has
/// already been corrupted; this function still treats it as "doesn't
/// match" rather than panicking, since verification is not the layer that
/// should detect that.
pub fn verify_against(host: &dyn SignatureHost, certs: &[String], envelope: &CallerEnvelope) -> bool {
    certs.iter().any(|cert| is_caller(host, cert, envelope))
}

/// `verify_admin` (`spec.md` §4.2): wraps `verify_against(AdminCerts)`.
pub fn verify_admin(host: &dyn SignatureHost, admin_certs: &[String], envelope: &CallerEnvelope) -> bool {
    verify_against(host, admin_certs, envelope)
}

/// `caller_party` (`spec.md` §4.2): the first party (in insertion order)
/// whose cert set matches. `None` if no party matches — callers turn that
/// into `CoreError::UnknownCaller`.
pub fn caller_party<'a>(
    host: &dyn SignatureHost,
    parties: &'a [Party],
    envelope: &CallerEnvelope,
) -> Option<&'a Party> {
    parties
        .iter()
        .find(|party| verify_against(host, &party.certs, envelope))
}

/// `require_admin`: `verify_admin`, turned into a `CoreError::Unauthorized`
/// on failure so registry operations can use `?`.
pub fn require_admin(
    host: &dyn SignatureHost,
    admin_certs: &[String],
    envelope: &CallerEnvelope,
) -> Result<(), CoreError> {
    if verify_admin(host, admin_certs, envelope) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized("caller is not an admin".into()))
    }
}

/// `require_caller_party`: `caller_party`, turned into
/// `CoreError::UnknownCaller` on failure (`spec.md` §4.2).
pub fn require_caller_party<'a>(
    host: &dyn SignatureHost,
    parties: &'a [Party],
    envelope: &CallerEnvelope,
) -> Result<&'a Party, CoreError> {
    caller_party(host, parties, envelope).ok_or(CoreError::UnknownCaller)
}
